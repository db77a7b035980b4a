//! Information criteria for comparing least-squares fits
//!
//! Both criteria use the Gaussian log-likelihood up to an additive
//! constant, so only differences between models fitted to the same
//! response are meaningful.

use crate::errors::{StatsError, StatsResult};

const OP: &str = "information_criteria";

/// n * ln(RSS / n), the part shared by AIC and BIC
fn fit_term(rss: f64, n: usize) -> StatsResult<f64> {
    if n == 0 {
        return Err(StatsError::InsufficientData {
            op: OP,
            needed: 1,
            got: 0,
        });
    }
    if rss.is_nan() || rss < 0.0 {
        return Err(StatsError::InvalidParameter {
            op: OP,
            reason: format!("residual sum of squares must be non-negative, got {}", rss),
        });
    }
    if rss == 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    let n = n as f64;
    Ok(n * (rss / n).ln())
}

/// Akaike information criterion, `n * ln(RSS / n) + 2k`
///
/// `k` counts every estimated coefficient including the intercept.
pub fn compute_aic(rss: f64, n: usize, k: usize) -> StatsResult<f64> {
    Ok(fit_term(rss, n)? + 2.0 * k as f64)
}

/// Bayesian information criterion, `n * ln(RSS / n) + k * ln(n)`
pub fn compute_bic(rss: f64, n: usize, k: usize) -> StatsResult<f64> {
    Ok(fit_term(rss, n)? + k as f64 * (n as f64).ln())
}

/// Both criteria at once, as `(aic, bic)`
pub fn compute_aic_bic(rss: f64, n: usize, k: usize) -> StatsResult<(f64, f64)> {
    Ok((compute_aic(rss, n, k)?, compute_bic(rss, n, k)?))
}
