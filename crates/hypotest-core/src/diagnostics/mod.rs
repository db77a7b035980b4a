//! Model diagnostics for fitted regressions

mod information_criteria;

pub use information_criteria::{compute_aic, compute_aic_bic, compute_bic};
