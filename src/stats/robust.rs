//! Order statistics over replicate values.
//!
//! Non-finite values (undetermined wells, masked outliers) are excluded
//! before any statistic is taken.

use statrs::statistics::{Data, Median};

/// Finite values, in order.
pub fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Median of the finite values, or NaN if there are none.
pub fn median(values: &[f64]) -> f64 {
    let finite = finite_values(values);
    if finite.is_empty() {
        return f64::NAN;
    }
    Data::new(finite).median()
}

/// Quantile of the finite values with linear interpolation between the
/// closest ranks, `x[floor(h)] + (h - floor(h)) * (x[ceil(h)] - x[floor(h)])`
/// where `h = (n - 1) * q`.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = finite_values(values);
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
