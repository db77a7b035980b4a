//! hypotest-core: classical hypothesis testing over flat tables
//!
//! This crate provides t-tests, one- and two-way ANOVA, Tukey's HSD,
//! correlation tests and least-squares regression as pure functions over
//! slices, plus a [`runner`] that applies them to named columns of a
//! [`Table`].

pub mod data;
pub mod diagnostics;
pub mod distributions;
pub mod errors;
pub mod models;
pub mod runner;
pub mod tests;
pub mod types;

pub use data::{Column, Factor, Table};
pub use errors::{StatsError, StatsResult};
pub use models::{anova_from_model, linear_regression, Predictors, RegressionResult};
pub use runner::{run, ModelTerm, TestOutcome, TestRequest};
pub use tests::anova::{one_way_anova, two_way_anova};
pub use tests::correlation::correlation_test;
pub use tests::parametric::{one_sample_t_test, two_sample_t_test};
pub use tests::posthoc::{tukey_hsd, PairwiseComparison, TukeyHsdResult};
pub use tests::{AnovaResult, AnovaRow, AnovaTable, CorrelationResult, Estimate, TestResult};
pub use types::*;
