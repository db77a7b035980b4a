//! Sequential (Type I) ANOVA tables from fitted linear models

use super::ols::RegressionResult;
use crate::tests::AnovaTable;

/// Decompose a fitted model's explained variance by term
///
/// Each term's sum of squares is the reduction in residual sum of squares
/// when it is added after all terms entered before it, so the table depends
/// on the order predictors were added. Each F statistic is tested against
/// the full model's residual mean square.
pub fn anova_from_model(model: &RegressionResult) -> AnovaTable {
    let terms = model
        .terms
        .iter()
        .map(|t| (t.label.clone(), t.df, t.sequential_ss))
        .collect();

    AnovaTable::from_sums(
        terms,
        model.df_residual,
        model.rss,
        model.n_observations,
        "Analysis of Variance (Type I sums of squares)",
    )
}
