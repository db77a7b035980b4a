//! Ordinary Least Squares (OLS) regression

use anofox_regression::solvers::{
    FittedOls, FittedRegressor, OlsRegressor, RegressionError, Regressor,
};
use faer::{Col, Mat};

use super::design::{Design, Predictors, INTERCEPT};
use crate::diagnostics::{compute_aic, compute_bic};
use crate::errors::{StatsError, StatsResult};
use crate::types::{check_probability, RegressionOptions};

/// Estimate and inference for one design-matrix column
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    /// Column name (`intercept`, `x`, `factor[level]`, `a:b`)
    pub name: String,
    /// Label of the model term owning this column
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// Sequential contribution of one model term
#[derive(Debug, Clone, PartialEq)]
pub struct TermSummary {
    pub label: String,
    /// Number of design-matrix columns owned by the term
    pub df: usize,
    /// Type I (sequential) sum of squares
    pub sequential_ss: f64,
}

/// Fitted linear model
#[derive(Debug, Clone)]
pub struct RegressionResult {
    /// Coefficients in design-matrix order, intercept first
    pub coefficients: Vec<Coefficient>,
    /// Model terms in entry order
    pub terms: Vec<TermSummary>,
    /// R-squared (coefficient of determination)
    pub r_squared: f64,
    /// Adjusted R-squared
    pub adj_r_squared: f64,
    /// F-statistic for overall model significance
    pub f_statistic: f64,
    /// p-value for F-statistic
    pub f_p_value: f64,
    /// Model degrees of freedom (parameters excluding intercept)
    pub df_model: usize,
    /// Residual degrees of freedom
    pub df_residual: usize,
    /// Residual standard error
    pub residual_std_error: f64,
    /// Residual sum of squares
    pub rss: f64,
    /// Total sum of squares around the mean
    pub tss: f64,
    /// Number of observations used
    pub n_observations: usize,
    pub fitted_values: Vec<f64>,
    pub residuals: Vec<f64>,
    /// AIC (n ln(RSS/n) + 2k)
    pub aic: f64,
    /// BIC (n ln(RSS/n) + k ln n)
    pub bic: f64,
    /// Confidence level of the coefficient intervals
    pub confidence_level: f64,
}

impl RegressionResult {
    /// Coefficient by column name
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// Point estimate by column name
    pub fn estimate(&self, name: &str) -> Option<f64> {
        self.coefficient(name).map(|c| c.estimate)
    }

    pub fn intercept(&self) -> f64 {
        self.coefficients[0].estimate
    }
}

const OP: &str = "linear_regression";

/// Convert anofox_regression errors to our StatsError
fn convert_error(e: RegressionError) -> StatsError {
    match e {
        RegressionError::InsufficientObservations { needed, got } => {
            StatsError::InsufficientData { op: OP, needed, got }
        }
        other => StatsError::InvalidParameter {
            op: OP,
            reason: other.to_string(),
        },
    }
}

/// Fit `y` on the first `ncols` design columns plus an intercept
fn fit_columns(
    x: &Mat<f64>,
    y: &Col<f64>,
    ncols: usize,
    options: &RegressionOptions,
) -> StatsResult<FittedOls> {
    let x = Mat::from_fn(x.nrows(), ncols, |i, j| x[(i, j)]);
    OlsRegressor::builder()
        .with_intercept(true)
        .confidence_level(options.confidence_level)
        .alias_tolerance(options.rank_tolerance)
        .build()
        .fit(&x, y)
        .map_err(convert_error)
}

fn residual_ss(fitted: &FittedOls) -> f64 {
    fitted.result().rss()
}

/// Fit a linear model by ordinary least squares
///
/// An intercept is always included. Categorical predictors are dummy-coded
/// against their reference level and interaction terms expand to products
/// of the columns of both predictors (see [`Predictors`]).
///
/// Type I sums of squares come from nested fits: each term's sum of
/// squares is the drop in RSS when its columns join the columns of the
/// terms before it.
///
/// # Arguments
/// * `y` - Response variable (n observations)
/// * `predictors` - Named predictors and terms, in entry order
/// * `options` - Fitting options
///
/// # Returns
/// * `RegressionResult` with per-coefficient inference, overall F-test,
///   R² and the sequential sums of squares used by `anova_from_model`
pub fn linear_regression(
    y: &[f64],
    predictors: &Predictors,
    options: &RegressionOptions,
) -> StatsResult<RegressionResult> {
    check_probability(OP, "confidence_level", options.confidence_level)?;
    if predictors.is_empty() {
        return Err(StatsError::InvalidParameter {
            op: OP,
            reason: "model has no predictors".into(),
        });
    }

    let design = Design::build(OP, y, predictors, options.missing)?;
    let n = design.y.len();
    let p = design.x.ncols() + 1;
    if n <= p {
        return Err(StatsError::InsufficientData {
            op: OP,
            needed: p + 1,
            got: n,
        });
    }

    let y_col = Col::from_fn(n, |i| design.y[i]);
    let fitted = fit_columns(&design.x, &y_col, design.x.ncols(), options)?;
    let result = fitted.result();

    if let Some(j) = result.aliased.iter().position(|&a| a) {
        let column = design.column_names[j].clone();
        tracing::debug!(op = OP, n, p, column = %column, "rank deficient design");
        return Err(StatsError::RankDeficiency { op: OP, column });
    }

    let y_mean = design.y.iter().sum::<f64>() / n as f64;
    let tss: f64 = design.y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let rss = residual_ss(&fitted);

    // Nested fits over term prefixes; the last prefix is the full model
    let mut terms = Vec::with_capacity(design.terms.len());
    let mut previous_rss = tss;
    for (k, term) in design.terms.iter().enumerate() {
        let current_rss = if k + 1 == design.terms.len() {
            rss
        } else {
            residual_ss(&fit_columns(&design.x, &y_col, term.columns.end, options)?)
        };
        terms.push(TermSummary {
            label: term.label.clone(),
            df: term.columns.len(),
            sequential_ss: previous_rss - current_rss,
        });
        previous_rss = current_rss;
    }

    let owner = |j: usize| -> String {
        design
            .terms
            .iter()
            .find(|t| t.columns.contains(&j))
            .map(|t| t.label.clone())
            .unwrap_or_default()
    };
    let at = |c: &Option<Col<f64>>, j: usize| c.as_ref().map_or(f64::NAN, |c| c[j]);

    let intercept = result.intercept.unwrap_or(f64::NAN);
    let (intercept_lower, intercept_upper) = result
        .intercept_conf_interval
        .unwrap_or((f64::NAN, f64::NAN));
    let mut coefficients = vec![Coefficient {
        name: INTERCEPT.to_string(),
        term: INTERCEPT.to_string(),
        estimate: intercept,
        std_error: result.intercept_std_error.unwrap_or(f64::NAN),
        t_value: result.intercept_t_statistic.unwrap_or(f64::NAN),
        p_value: result.intercept_p_value.unwrap_or(f64::NAN),
        ci_lower: intercept_lower,
        ci_upper: intercept_upper,
    }];
    coefficients.extend(design.column_names.iter().enumerate().map(|(j, name)| {
        Coefficient {
            name: name.clone(),
            term: owner(j),
            estimate: result.coefficients[j],
            std_error: at(&result.std_errors, j),
            t_value: at(&result.t_statistics, j),
            p_value: at(&result.p_values, j),
            ci_lower: at(&result.conf_interval_lower, j),
            ci_upper: at(&result.conf_interval_upper, j),
        }
    }));

    let df_residual = n - p;
    let df_model = p - 1;

    tracing::debug!(
        op = OP,
        n,
        p,
        r_squared = result.r_squared,
        f_statistic = result.f_statistic,
        "fitted linear model"
    );

    Ok(RegressionResult {
        coefficients,
        terms,
        r_squared: result.r_squared,
        adj_r_squared: result.adj_r_squared,
        f_statistic: result.f_statistic,
        f_p_value: result.f_pvalue,
        df_model,
        df_residual,
        residual_std_error: result.rmse,
        rss,
        tss,
        n_observations: n,
        fitted_values: result.fitted_values.iter().copied().collect(),
        residuals: result.residuals.iter().copied().collect(),
        aic: compute_aic(rss, n, p)?,
        bic: compute_bic(rss, n, p)?,
        confidence_level: options.confidence_level,
    })
}
