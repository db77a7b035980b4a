//! Linear models
//!
//! - Predictor sets with dummy coding and interactions
//! - OLS fitting through anofox-regression, with nested fits for sequential
//!   sums of squares
//! - Sequential ANOVA tables from fitted models

mod design;
mod ols;
mod sequential;

pub use design::{Predictors, INTERCEPT};
pub use ols::{linear_regression, Coefficient, RegressionResult, TermSummary};
pub use sequential::anova_from_model;
