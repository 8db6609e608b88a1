//! Series transforms.
//!
//! Smoothing, differencing and standardization of daily series. Every
//! function returns a series of the same length as its input.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::composite::weighted_sum;

/// Trailing simple moving average.
///
/// Positions before the window fills average over the points available so
/// far. A window of 0 or 1 returns the input unchanged.
pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return series.to_vec();
    }

    let mut out = Vec::with_capacity(series.len());
    let mut sum = 0.0;

    for (i, value) in series.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= series[i - window];
        }
        let n = (i + 1).min(window);
        out.push(sum / n as f64);
    }

    out
}

/// Absolute first difference with a leading 0.
pub fn diff_abs(series: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(series.len());
    if series.is_empty() {
        return out;
    }
    out.push(0.0);
    out.extend(series.windows(2).map(|w| (w[1] - w[0]).abs()));
    out
}

/// Absolute second difference: `diff_abs(diff_abs(x))`.
pub fn second_diff_abs(series: &[f64]) -> Vec<f64> {
    diff_abs(&diff_abs(series))
}

/// `log10(x + 1)` elementwise.
pub fn log_transform(series: &[f64]) -> Vec<f64> {
    series.iter().map(|x| (x + 1.0).log10()).collect()
}

/// Population z-score over the whole series.
///
/// A series whose standard deviation is zero or undefined maps to all zeros.
pub fn z_score(series: &[f64]) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }

    let mean = series.iter().mean();
    let std = series.iter().population_std_dev();

    if !(std.is_finite() && std > 0.0) {
        return vec![0.0; series.len()];
    }

    series.iter().map(|x| (x - mean) / std).collect()
}

/// Level, volatility and acceleration of a primary metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolatilityComponents {
    /// Smoothed level
    pub s1: Vec<f64>,
    /// Smoothed absolute first difference
    pub s2: Vec<f64>,
    /// Smoothed absolute second difference
    pub s3: Vec<f64>,
}

impl VolatilityComponents {
    /// Weighted mix `w1*s1 + w2*s2 + w3*s3`.
    pub fn mix(&self, weights: (f64, f64, f64)) -> Vec<f64> {
        weighted_sum(&self.s1, &self.s2, &self.s3, weights)
    }

    pub fn len(&self) -> usize {
        self.s1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s1.is_empty()
    }
}

/// Build the volatility components of `series` with smoothing window `window`.
pub fn volatility(series: &[f64], window: usize) -> VolatilityComponents {
    let d1 = diff_abs(series);
    let d2 = diff_abs(&d1);

    VolatilityComponents {
        s1: moving_average(series, window),
        s2: moving_average(&d1, window),
        s3: moving_average(&d2, window),
    }
}

/// Standardized category series: optional log, z-score, then smoothing.
pub fn standardize(counts: &[f64], log: bool, window: usize) -> Vec<f64> {
    let base = if log {
        log_transform(counts)
    } else {
        counts.to_vec()
    };
    moving_average(&z_score(&base), window)
}
