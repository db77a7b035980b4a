use thiserror::Error;

/// Errors that can occur during statistical computations
///
/// Every variant names the operation that rejected its input so callers can
/// tell which step of a longer analysis failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    // Input validation errors
    #[error("{op}: insufficient data ({got} observations, need at least {needed})")]
    InsufficientData {
        op: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("{op}: insufficient groups: {reason}")]
    InsufficientGroups { op: &'static str, reason: String },

    #[error("{op}: length mismatch ({left} vs {right})")]
    LengthMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },

    #[error("{op}: missing values in {field} (use MissingPolicy::ExcludeListwise to drop them)")]
    MissingValue { op: &'static str, field: String },

    #[error("{op}: data are essentially constant")]
    ConstantData { op: &'static str },

    #[error("{op}: invalid parameter: {reason}")]
    InvalidParameter { op: &'static str, reason: String },

    // Numerical errors
    #[error("{op}: design matrix is rank deficient (column '{column}' is linearly dependent)")]
    RankDeficiency { op: &'static str, column: String },

    // Table errors
    #[error("Unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("Column '{name}' is not {expected}")]
    ColumnType {
        name: String,
        expected: &'static str,
    },

    #[error("Duplicate column: {name}")]
    DuplicateColumn { name: String },
}

impl StatsError {
    /// Name of the operation that produced the error, if it carries one
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            StatsError::InsufficientData { op, .. }
            | StatsError::InsufficientGroups { op, .. }
            | StatsError::LengthMismatch { op, .. }
            | StatsError::MissingValue { op, .. }
            | StatsError::ConstantData { op }
            | StatsError::InvalidParameter { op, .. }
            | StatsError::RankDeficiency { op, .. } => Some(*op),
            StatsError::UnknownColumn { .. }
            | StatsError::ColumnType { .. }
            | StatsError::DuplicateColumn { .. } => None,
        }
    }
}

/// Result type for statistical operations
pub type StatsResult<T> = Result<T, StatsError>;
