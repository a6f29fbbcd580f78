//! Statistical primitives shared by the analyzers
//!
//! Variance conventions are mixed: [`std_dev`] is the population
//! standard deviation (divide by N) while [`correlation`] divides its sum of
//! z-score products by n − 1. Significance scores and anomaly thresholds
//! downstream are calibrated against exactly this combination.

use serde::{Deserialize, Serialize};

/// Arithmetic mean. Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. Returns NaN for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    let avg = mean(values);
    let squared: Vec<f64> = values.iter().map(|v| (v - avg).powi(2)).collect();
    mean(&squared).sqrt()
}

/// Pearson correlation as Σ(zx·zy) / (n − 1)
///
/// `n` is the shorter of the two lengths; means and standard deviations are
/// taken over each full slice. Returns `None` when fewer than two pairs are
/// available or either series has zero (or undefined) variance.
pub fn correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }

    let (mean_x, mean_y) = (mean(x), mean(y));
    let (std_x, std_y) = (std_dev(x), std_dev(y));
    if !(std_x.is_finite() && std_y.is_finite()) || std_x == 0.0 || std_y == 0.0 {
        return None;
    }

    let sum: f64 = x
        .iter()
        .zip(y)
        .take(n)
        .map(|(xi, yi)| ((xi - mean_x) / std_x) * ((yi - mean_y) / std_y))
        .sum();

    Some(sum / (n as f64 - 1.0))
}

/// Result of an ordinary least squares fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl Regression {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Simple linear regression of `y` on `x`
///
/// Uses the first `min(len)` pairs. Returns `None` with fewer than two pairs
/// or when every `x` is identical. When every `y` is identical the fitted
/// line is exact and R² is reported as 1.0.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<Regression> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let nf = n as f64;

    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(xi, yi)| xi * yi).sum();
    let sum_xx: f64 = x.iter().map(|xi| xi * xi).sum();

    let denominator = nf * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }

    let slope = (nf * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / nf;

    let y_mean = mean(y);
    let total_ss: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    let residual_ss: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - (slope * xi + intercept)).powi(2))
        .sum();

    let r_squared = if total_ss == 0.0 {
        1.0
    } else {
        1.0 - residual_ss / total_ss
    };

    Some(Regression {
        slope,
        intercept,
        r_squared,
    })
}
