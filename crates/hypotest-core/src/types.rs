//! Shared option structs and small value types

use crate::errors::{StatsError, StatsResult};

// Re-export the alternative hypothesis from anofox-tests
pub use anofox_tests::Alternative;

/// Policy for handling missing values (NaN in slices, `None` in tables)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Fail with `StatsError::MissingValue` (default)
    #[default]
    Error,
    /// Drop every observation (row or pair) with a missing value
    ExcludeListwise,
}

/// Confidence interval for an estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    /// Lower bound (may be `-inf` for one-sided intervals)
    pub lower: f64,
    /// Upper bound (may be `+inf` for one-sided intervals)
    pub upper: f64,
    /// Confidence level, e.g. 0.95
    pub level: f64,
}

impl ConfidenceInterval {
    /// Whether `value` lies inside the closed interval
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Options for t-tests
#[derive(Debug, Clone)]
pub struct TTestOptions {
    /// Alternative hypothesis
    pub alternative: Alternative,
    /// Confidence level for CI (default: 0.95)
    pub confidence_level: f64,
    /// Hypothesized mean difference for two-sample tests (default: 0.0)
    pub mu: f64,
    /// Missing value handling
    pub missing: MissingPolicy,
}

impl Default for TTestOptions {
    fn default() -> Self {
        Self {
            alternative: Alternative::TwoSided,
            confidence_level: 0.95,
            mu: 0.0,
            missing: MissingPolicy::Error,
        }
    }
}

/// Options for one-way and two-way ANOVA
#[derive(Debug, Clone, Default)]
pub struct AnovaOptions {
    /// Missing value handling
    pub missing: MissingPolicy,
}

/// Options for Tukey's honestly significant difference
#[derive(Debug, Clone)]
pub struct TukeyOptions {
    /// Family-wise significance level (default: 0.05)
    pub alpha: f64,
    /// Missing value handling
    pub missing: MissingPolicy,
}

impl Default for TukeyOptions {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            missing: MissingPolicy::Error,
        }
    }
}

/// Correlation coefficient to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationMethod {
    /// Pearson product-moment correlation
    #[default]
    Pearson,
    /// Spearman rank correlation
    Spearman,
    /// Kendall's tau-b
    Kendall,
}

/// Options for correlation tests
#[derive(Debug, Clone)]
pub struct CorrelationOptions {
    /// Coefficient to compute (default: Pearson)
    pub method: CorrelationMethod,
    /// Alternative hypothesis
    pub alternative: Alternative,
    /// Confidence level for CI (default: 0.95)
    pub confidence_level: f64,
    /// Missing value handling
    pub missing: MissingPolicy,
}

impl Default for CorrelationOptions {
    fn default() -> Self {
        Self {
            method: CorrelationMethod::Pearson,
            alternative: Alternative::TwoSided,
            confidence_level: 0.95,
            missing: MissingPolicy::Error,
        }
    }
}

/// Options for OLS fitting
#[derive(Debug, Clone)]
pub struct RegressionOptions {
    /// Confidence level for coefficient intervals (default: 0.95)
    pub confidence_level: f64,
    /// Relative tolerance below which a column counts as a linear
    /// combination of the columns before it (default: 1e-7, as R's `lm`)
    pub rank_tolerance: f64,
    /// Missing value handling
    pub missing: MissingPolicy,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            rank_tolerance: 1e-7,
            missing: MissingPolicy::Error,
        }
    }
}

/// Reject probabilities outside the open unit interval
pub(crate) fn check_probability(op: &'static str, name: &str, value: f64) -> StatsResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(StatsError::InvalidParameter {
            op,
            reason: format!("{} must be in (0, 1), got {}", name, value),
        })
    }
}
