//! Statistical hypothesis testing
//!
//! Classical parametric tests over plain slices: t-tests, one- and two-way
//! ANOVA, Tukey's HSD and correlation tests. The test statistics come from
//! the anofox-tests crate (anofox-statistics); this layer applies the
//! missing-value policy, validates group structure and tags errors with the
//! operation name.


pub use crate::types::Alternative;

use crate::data::Factor;
use crate::types::{ConfidenceInterval, MissingPolicy};
use crate::{StatsError, StatsResult};

/// A labelled point estimate (group mean, mean difference, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub label: String,
    pub value: f64,
}

impl Estimate {
    pub(crate) fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Generic test result structure for t-tests
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Point estimates (e.g. sample means)
    pub estimates: Vec<Estimate>,
    /// Test statistic
    pub statistic: f64,
    /// p-value
    pub p_value: f64,
    /// Degrees of freedom (fractional for Welch's test)
    pub df: f64,
    /// Confidence interval for the mean or mean difference
    pub ci: Option<ConfidenceInterval>,
    /// Cohen's d (f64::NAN if not applicable)
    pub effect_size: f64,
    /// Total sample size
    pub n: usize,
    /// Group 1 sample size (for two-sample tests)
    pub n1: usize,
    /// Group 2 sample size (for two-sample tests)
    pub n2: usize,
    /// Alternative hypothesis
    pub alternative: Alternative,
    /// Test method/name
    pub method: String,
}

impl TestResult {
    /// Look up an estimate by label
    pub fn estimate(&self, label: &str) -> Option<f64> {
        self.estimates
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.value)
    }
}

/// One line of an ANOVA table
#[derive(Debug, Clone, PartialEq)]
pub struct AnovaRow {
    /// Source of variation (term name or "Residuals")
    pub source: String,
    pub df: usize,
    pub sum_sq: f64,
    pub mean_sq: f64,
    /// F statistic (f64::NAN on the residual row)
    pub f_statistic: f64,
    /// p-value (f64::NAN on the residual row)
    pub p_value: f64,
}

/// ANOVA table with one row per term plus the residual row
#[derive(Debug, Clone)]
pub struct AnovaTable {
    pub rows: Vec<AnovaRow>,
    pub residual: AnovaRow,
    /// Number of observations
    pub n: usize,
    pub method: String,
}

impl AnovaTable {
    /// Row for a given source
    pub fn row(&self, source: &str) -> Option<&AnovaRow> {
        self.rows.iter().find(|r| r.source == source)
    }

    /// Build a table from per-term (source, df, SS) triples and the residual SS
    pub(crate) fn from_sums(
        terms: Vec<(String, usize, f64)>,
        df_residual: usize,
        ss_residual: f64,
        n: usize,
        method: impl Into<String>,
    ) -> Self {
        let ms_residual = ss_residual / df_residual as f64;
        let rows = terms
            .into_iter()
            .map(|(source, df, sum_sq)| {
                let mean_sq = sum_sq / df as f64;
                let f_statistic = mean_sq / ms_residual;
                AnovaRow {
                    source,
                    df,
                    sum_sq,
                    mean_sq,
                    f_statistic,
                    p_value: crate::distributions::f_sf(
                        f_statistic,
                        df as f64,
                        df_residual as f64,
                    ),
                }
            })
            .collect();

        Self {
            rows,
            residual: AnovaRow {
                source: "Residuals".into(),
                df: df_residual,
                sum_sq: ss_residual,
                mean_sq: ms_residual,
                f_statistic: f64::NAN,
                p_value: f64::NAN,
            },
            n,
            method: method.into(),
        }
    }
}

/// Extended test result for one-way ANOVA
#[derive(Debug, Clone)]
pub struct AnovaResult {
    /// F statistic
    pub f_statistic: f64,
    /// p-value
    pub p_value: f64,
    /// Between-groups degrees of freedom
    pub df_between: usize,
    /// Within-groups degrees of freedom
    pub df_within: usize,
    /// Between-groups sum of squares
    pub ss_between: f64,
    /// Within-groups sum of squares
    pub ss_within: f64,
    /// Group means in level order
    pub group_means: Vec<Estimate>,
    /// Group sizes in level order
    pub group_sizes: Vec<usize>,
    /// Total sample size
    pub n: usize,
    /// Test method
    pub method: String,
}

impl AnovaResult {
    pub fn n_groups(&self) -> usize {
        self.group_means.len()
    }

    /// Within-groups mean square (pooled error variance)
    pub fn ms_within(&self) -> f64 {
        self.ss_within / self.df_within as f64
    }
}

/// Correlation test result
#[derive(Debug, Clone)]
pub struct CorrelationResult {
    /// Correlation coefficient
    pub r: f64,
    /// Test statistic (t for Pearson/Spearman, z for Kendall)
    pub statistic: f64,
    /// Degrees of freedom of the t statistic (f64::NAN for Kendall)
    pub df: f64,
    /// p-value
    pub p_value: f64,
    /// Confidence interval for the coefficient (Pearson only)
    pub ci: Option<ConfidenceInterval>,
    /// Sample size
    pub n: usize,
    /// Alternative hypothesis
    pub alternative: Alternative,
    /// Method name
    pub method: String,
}

/// Convert anofox_tests StatError to our StatsError
pub(crate) fn convert_error(op: &'static str, e: anofox_tests::StatError) -> StatsError {
    match e {
        anofox_tests::StatError::EmptyData => StatsError::InsufficientData {
            op,
            needed: 1,
            got: 0,
        },
        anofox_tests::StatError::InsufficientData { needed, got } => {
            StatsError::InsufficientData { op, needed, got }
        }
        anofox_tests::StatError::InvalidParameter(reason) => {
            StatsError::InvalidParameter { op, reason }
        }
    }
}

/// Apply the missing-value policy to a single numeric sequence
pub(crate) fn complete_values(
    op: &'static str,
    field: &str,
    data: &[f64],
    policy: MissingPolicy,
) -> StatsResult<Vec<f64>> {
    let has_missing = data.iter().any(|x| x.is_nan());
    match (has_missing, policy) {
        (false, _) => Ok(data.to_vec()),
        (true, MissingPolicy::Error) => Err(StatsError::MissingValue {
            op,
            field: field.into(),
        }),
        (true, MissingPolicy::ExcludeListwise) => {
            let kept: Vec<f64> = data.iter().copied().filter(|x| !x.is_nan()).collect();
            let dropped = data.len() - kept.len();
            tracing::debug!(op, field, dropped, "excluded missing values");
            Ok(kept)
        }
    }
}

/// Apply the missing-value policy to paired observations
pub(crate) fn complete_pairs(
    op: &'static str,
    x: &[f64],
    y: &[f64],
    policy: MissingPolicy,
) -> StatsResult<(Vec<f64>, Vec<f64>)> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            op,
            left: x.len(),
            right: y.len(),
        });
    }

    let mut xs = Vec::with_capacity(x.len());
    let mut ys = Vec::with_capacity(y.len());
    for (&a, &b) in x.iter().zip(y) {
        if a.is_nan() || b.is_nan() {
            if policy == MissingPolicy::Error {
                let field = if a.is_nan() { "x" } else { "y" };
                return Err(StatsError::MissingValue {
                    op,
                    field: field.into(),
                });
            }
            continue;
        }
        xs.push(a);
        ys.push(b);
    }
    if xs.len() < x.len() {
        tracing::debug!(op, dropped = x.len() - xs.len(), "excluded incomplete pairs");
    }
    Ok((xs, ys))
}

/// Apply the missing-value policy to values labelled by one or more factors
///
/// Returns the retained values and the retained labels of each factor.
pub(crate) fn complete_grouped<S: AsRef<str>>(
    op: &'static str,
    values: &[f64],
    factors: &[&[S]],
    policy: MissingPolicy,
) -> StatsResult<(Vec<f64>, Vec<Factor>)> {
    for f in factors {
        if f.len() != values.len() {
            return Err(StatsError::LengthMismatch {
                op,
                left: values.len(),
                right: f.len(),
            });
        }
    }
    if policy == MissingPolicy::Error && values.iter().any(|v| v.is_nan()) {
        return Err(StatsError::MissingValue {
            op,
            field: "values".into(),
        });
    }

    let keep: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_nan()).collect();
    let kept_values = keep.iter().map(|&i| values[i]).collect();
    let kept_factors = factors
        .iter()
        .map(|f| {
            let labels: Vec<&str> = keep.iter().map(|&i| f[i].as_ref()).collect();
            Factor::new(&labels)
        })
        .collect();
    Ok((kept_values, kept_factors))
}

/// Validate groups for a one-factor comparison: at least 2 groups with at
/// least 2 observations each
pub(crate) fn check_groups(op: &'static str, factor: &Factor) -> StatsResult<()> {
    if factor.n_levels() < 2 {
        return Err(StatsError::InsufficientGroups {
            op,
            reason: format!("need at least 2 groups, found {}", factor.n_levels()),
        });
    }
    for (level, count) in factor.levels().iter().zip(factor.counts()) {
        if count < 2 {
            return Err(StatsError::InsufficientGroups {
                op,
                reason: format!(
                    "group '{}' has {} observation(s), need at least 2",
                    level, count
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_error_keeps_operation() {
        let err = convert_error(
            "tukey_hsd",
            anofox_tests::StatError::InsufficientData { needed: 2, got: 1 },
        );
        assert_eq!(
            err,
            StatsError::InsufficientData {
                op: "tukey_hsd",
                needed: 2,
                got: 1
            }
        );
        let err = convert_error(
            "t_test",
            anofox_tests::StatError::InvalidParameter("bad".into()),
        );
        assert!(matches!(err, StatsError::InvalidParameter { op: "t_test", .. }));
    }

    #[test]
    fn test_complete_values_policy() {
        let x = [1.0, f64::NAN, 3.0];
        assert!(matches!(
            complete_values("op", "x", &x, MissingPolicy::Error),
            Err(StatsError::MissingValue { .. })
        ));
        let kept = complete_values("op", "x", &x, MissingPolicy::ExcludeListwise).unwrap();
        assert_eq!(kept, vec![1.0, 3.0]);
    }

    #[test]
    fn test_complete_pairs_drops_whole_pair() {
        let x = [1.0, 2.0, 3.0];
        let y = [4.0, f64::NAN, 6.0];
        let (a, b) = complete_pairs("op", &x, &y, MissingPolicy::ExcludeListwise).unwrap();
        assert_eq!(a, vec![1.0, 3.0]);
        assert_eq!(b, vec![4.0, 6.0]);

        assert!(matches!(
            complete_pairs("op", &x, &y[..2], MissingPolicy::Error),
            Err(StatsError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_check_groups() {
        let f = Factor::new(&["a", "a", "b"]);
        assert!(matches!(
            check_groups("op", &f),
            Err(StatsError::InsufficientGroups { .. })
        ));
        let f = Factor::new(&["a", "a"]);
        assert!(check_groups("op", &f).is_err());
        let f = Factor::new(&["a", "a", "b", "b"]);
        assert!(check_groups("op", &f).is_ok());
    }

    #[test]
    fn test_anova_table_from_sums() {
        let table = AnovaTable::from_sums(vec![("g".into(), 2, 10.0)], 10, 20.0, 13, "test");
        let row = table.row("g").unwrap();
        assert_eq!(row.mean_sq, 5.0);
        assert_eq!(row.f_statistic, 2.5);
        assert!(row.p_value > 0.0 && row.p_value < 1.0);
        assert_eq!(table.residual.mean_sq, 2.0);
        assert!(table.residual.f_statistic.is_nan());
    }
}
