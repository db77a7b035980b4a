//! Predictor sets and design-matrix construction
//!
//! Numeric predictors enter as a single column. Categorical predictors are
//! dummy-coded against their reference level: one 0/1 column per
//! non-reference level, named `factor[level]`. An interaction between two
//! predictors is the elementwise product of every pair of their columns,
//! named `left:right`.

use std::ops::Range;

use faer::Mat;

use crate::data::Factor;
use crate::errors::{StatsError, StatsResult};
use crate::types::MissingPolicy;

/// Name of the intercept column
pub const INTERCEPT: &str = "intercept";

/// Values of one predictor
#[derive(Debug, Clone)]
enum PredictorValues {
    Numeric(Vec<f64>),
    Categorical {
        labels: Vec<String>,
        reference: Option<String>,
    },
}

impl PredictorValues {
    fn len(&self) -> usize {
        match self {
            PredictorValues::Numeric(v) => v.len(),
            PredictorValues::Categorical { labels, .. } => labels.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Main(usize),
    Interaction(String, String),
}

/// Ordered set of named predictors and the model terms built from them
///
/// Terms enter the model in the order they were added, which is the order
/// used for sequential (Type I) sums of squares.
///
/// ```
/// use hypotest_core::models::Predictors;
///
/// let predictors = Predictors::new()
///     .numeric("wt", &[2.62, 2.875, 2.32, 3.215])
///     .categorical("am", &["manual", "manual", "manual", "automatic"])
///     .interaction("wt", "am");
/// assert_eq!(predictors.term_labels(), vec!["wt", "am", "wt:am"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Predictors {
    names: Vec<String>,
    values: Vec<PredictorValues>,
    terms: Vec<Term>,
}

impl Predictors {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, name: impl Into<String>, values: PredictorValues) -> Self {
        self.terms.push(Term::Main(self.values.len()));
        self.names.push(name.into());
        self.values.push(values);
        self
    }

    /// Add a numeric predictor (NaN = missing)
    pub fn numeric(self, name: impl Into<String>, values: &[f64]) -> Self {
        self.push(name, PredictorValues::Numeric(values.to_vec()))
    }

    /// Add a categorical predictor using the first sorted level as reference
    pub fn categorical<S: AsRef<str>>(self, name: impl Into<String>, values: &[S]) -> Self {
        let labels = values.iter().map(|v| v.as_ref().to_string()).collect();
        self.push(
            name,
            PredictorValues::Categorical {
                labels,
                reference: None,
            },
        )
    }

    /// Add a categorical predictor with an explicit reference level
    pub fn categorical_with_reference<S: AsRef<str>>(
        self,
        name: impl Into<String>,
        values: &[S],
        reference: &str,
    ) -> Self {
        let labels = values.iter().map(|v| v.as_ref().to_string()).collect();
        self.push(
            name,
            PredictorValues::Categorical {
                labels,
                reference: Some(reference.to_string()),
            },
        )
    }

    /// Add the interaction between two previously added predictors
    pub fn interaction(mut self, left: &str, right: &str) -> Self {
        self.terms
            .push(Term::Interaction(left.to_string(), right.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Predictor names in entry order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Term labels in entry order
    pub fn term_labels(&self) -> Vec<String> {
        self.terms
            .iter()
            .map(|t| match t {
                Term::Main(i) => self.names[*i].clone(),
                Term::Interaction(a, b) => format!("{}:{}", a, b),
            })
            .collect()
    }
}

/// A model term and the design-matrix columns it owns
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TermColumns {
    pub label: String,
    pub columns: Range<usize>,
}

/// Design matrix for least squares
///
/// The intercept is fitted by the solver and has no column in `x`; term
/// column ranges index into `x` directly.
#[derive(Debug)]
pub(crate) struct Design {
    pub x: Mat<f64>,
    pub y: Vec<f64>,
    pub column_names: Vec<String>,
    pub terms: Vec<TermColumns>,
}

/// Named columns contributed by one predictor
type ColumnSet = Vec<(String, Vec<f64>)>;

fn predictor_columns(
    name: &str,
    values: &PredictorValues,
    rows: &[usize],
) -> StatsResult<ColumnSet> {
    match values {
        PredictorValues::Numeric(v) => Ok(vec![(
            name.to_string(),
            rows.iter().map(|&r| v[r]).collect(),
        )]),
        PredictorValues::Categorical { labels, reference } => {
            let kept: Vec<&str> = rows.iter().map(|&r| labels[r].as_str()).collect();
            let mut factor = Factor::new(&kept);
            if let Some(level) = reference {
                factor = factor.with_reference(level)?;
            }
            Ok(factor
                .contrast_levels()
                .map(|level| {
                    let indicator = factor
                        .codes()
                        .iter()
                        .map(|&c| if c == level { 1.0 } else { 0.0 })
                        .collect();
                    (format!("{}[{}]", name, factor.levels()[level]), indicator)
                })
                .collect())
        }
    }
}

impl Design {
    /// Build the design matrix for `y ~ predictors`, applying the missing
    /// value policy to `y` and the numeric predictors
    pub fn build(
        op: &'static str,
        y: &[f64],
        predictors: &Predictors,
        missing: MissingPolicy,
    ) -> StatsResult<Self> {
        let n = y.len();
        for (name, values) in predictors.names.iter().zip(&predictors.values) {
            if values.len() != n {
                tracing::debug!(op, predictor = %name, "predictor length differs from response");
                return Err(StatsError::LengthMismatch {
                    op,
                    left: n,
                    right: values.len(),
                });
            }
        }
        for (i, name) in predictors.names.iter().enumerate() {
            if predictors.names[..i].contains(name) {
                return Err(StatsError::InvalidParameter {
                    op,
                    reason: format!("predictor '{}' added twice", name),
                });
            }
        }

        let rows = complete_rows(op, y, predictors, missing)?;

        let sets = predictors
            .names
            .iter()
            .zip(&predictors.values)
            .map(|(name, values)| predictor_columns(name, values, &rows))
            .collect::<StatsResult<Vec<_>>>()?;

        let lookup = |name: &str| -> StatsResult<usize> {
            predictors
                .names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| StatsError::InvalidParameter {
                    op,
                    reason: format!("interaction references unknown predictor '{}'", name),
                })
        };

        let mut column_names = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();
        let mut terms = Vec::with_capacity(predictors.terms.len());

        for (term, label) in predictors.terms.iter().zip(predictors.term_labels()) {
            let start = columns.len();
            match term {
                Term::Main(i) => {
                    for (name, col) in &sets[*i] {
                        column_names.push(name.clone());
                        columns.push(col.clone());
                    }
                }
                Term::Interaction(a, b) => {
                    let (ia, ib) = (lookup(a)?, lookup(b)?);
                    for (name_a, col_a) in &sets[ia] {
                        for (name_b, col_b) in &sets[ib] {
                            column_names.push(format!("{}:{}", name_a, name_b));
                            columns.push(col_a.iter().zip(col_b).map(|(p, q)| p * q).collect());
                        }
                    }
                }
            }
            terms.push(TermColumns {
                label,
                columns: start..columns.len(),
            });
        }

        let x = Mat::from_fn(rows.len(), columns.len(), |i, j| columns[j][i]);
        let y = rows.iter().map(|&r| y[r]).collect();

        Ok(Self {
            x,
            y,
            column_names,
            terms,
        })
    }
}

/// Rows where the response and every numeric predictor are present
fn complete_rows(
    op: &'static str,
    y: &[f64],
    predictors: &Predictors,
    missing: MissingPolicy,
) -> StatsResult<Vec<usize>> {
    let mut rows = Vec::with_capacity(y.len());
    for r in 0..y.len() {
        let missing_field = if y[r].is_nan() {
            Some("y")
        } else {
            predictors
                .names
                .iter()
                .zip(&predictors.values)
                .find(|(_, v)| matches!(v, PredictorValues::Numeric(x) if x[r].is_nan()))
                .map(|(name, _)| name.as_str())
        };
        match (missing_field, missing) {
            (None, _) => rows.push(r),
            (Some(field), MissingPolicy::Error) => {
                return Err(StatsError::MissingValue {
                    op,
                    field: field.to_string(),
                })
            }
            (Some(_), MissingPolicy::ExcludeListwise) => {}
        }
    }
    if rows.len() < y.len() {
        tracing::debug!(op, dropped = y.len() - rows.len(), "excluded incomplete rows");
    }
    Ok(rows)
}
