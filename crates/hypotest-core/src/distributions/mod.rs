//! Reference distributions for test statistics
//!
//! Fisher's F comes from statrs; the studentized range used by Tukey's HSD
//! comes from anofox-tests.

use anofox_tests::{ptukey, qtukey};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Upper-tail probability P(F > f) of Fisher's F distribution
pub fn f_sf(f: f64, df1: f64, df2: f64) -> f64 {
    if f.is_nan() {
        return f64::NAN;
    }
    if f == f64::INFINITY {
        return 0.0;
    }
    if f <= 0.0 {
        return 1.0;
    }
    FisherSnedecor::new(df1, df2)
        .map(|d| d.sf(f))
        .unwrap_or(f64::NAN)
}

/// CDF of the studentized range for `n_means` groups and `df` error degrees
/// of freedom
pub fn studentized_range_cdf(q: f64, n_means: usize, df: f64) -> f64 {
    ptukey(q, n_means as f64, df, 1.0, true)
}

/// Quantile of the studentized range distribution
pub fn studentized_range_quantile(p: f64, n_means: usize, df: f64) -> f64 {
    qtukey(p, n_means as f64, df, 1.0, true)
}
