//! Seasonal log-logistic fit by probability-weighted moments.
//!
//! Each calendar month is fitted on its own, since accumulated water balance
//! is strongly seasonal. The parameters follow from the first three
//! probability-weighted moments in closed form, so fitting is deterministic
//! and needs no iteration.

use crate::series::Series;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default minimum number of samples a month needs to be fitted.
pub const DEFAULT_MIN_SAMPLES: usize = 8;

/// The unbiased moment estimator divides by `(n - 1)(n - 2)`.
const MIN_PWM_SAMPLES: usize = 3;

/// Three-parameter log-logistic distribution.
///
/// `F(x) = 1 / (1 + (scale / (x - location))^shape)` for `x > location`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogLogistic {
    /// Shape `β`.
    pub shape: f64,
    /// Scale `α`.
    pub scale: f64,
    /// Location `γ`, the lower bound of the support.
    pub location: f64,
}

impl LogLogistic {
    /// Solve for the parameters given the moments `[w0, w1, w2]`.
    ///
    /// Returns `None` when the moments do not describe a log-logistic with a
    /// finite mean (`shape > 1`, `scale > 0`).
    pub fn from_moments([w0, w1, w2]: [f64; 3]) -> Option<Self> {
        let shape = (2.0 * w1 - w0) / (6.0 * w1 - w0 - 6.0 * w2);
        if !shape.is_finite() || shape <= 1.0 {
            return None;
        }

        let gamma_product = gamma_product(1.0 / shape);
        let scale = (w0 - 2.0 * w1) * shape / gamma_product;
        let location = w0 - scale * gamma_product;

        if !scale.is_finite() || scale <= 0.0 || !location.is_finite() {
            return None;
        }

        Some(Self {
            shape,
            scale,
            location,
        })
    }

    /// Cumulative probability of `x`; zero at or below the location.
    pub fn cdf(&self, x: f64) -> f64 {
        if x <= self.location {
            return 0.0;
        }
        1.0 / (1.0 + (self.scale / (x - self.location)).powf(self.shape))
    }

    /// Value whose cumulative probability is `prob`, for `prob` in `(0, 1)`.
    pub fn quantile(&self, prob: f64) -> f64 {
        self.location + self.scale * (prob / (1.0 - prob)).powf(1.0 / self.shape)
    }

    pub fn median(&self) -> f64 {
        self.location + self.scale
    }
}

/// `Γ(1 + z) Γ(1 - z)` via the reflection formula, `π z / sin(π z)`.
fn gamma_product(z: f64) -> f64 {
    PI * z / (PI * z).sin()
}

/// Unbiased estimates of `w_s = E[x (1 - F(x))^s]` for `s = 0, 1, 2`.
///
/// `sorted` must be in ascending order and hold at least three values.
pub fn probability_weighted_moments(sorted: &[f64]) -> [f64; 3] {
    let n = sorted.len() as f64;
    let mut sums = [0.0; 3];
    for (idx, &val) in sorted.iter().enumerate() {
        // Number of larger order statistics.
        let rem = n - (idx + 1) as f64;
        sums[0] += val;
        sums[1] += val * rem / (n - 1.0);
        sums[2] += val * rem * (rem - 1.0) / ((n - 1.0) * (n - 2.0));
    }
    sums.map(|sum| sum / n)
}

/// Fit result for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFit {
    /// Calendar month, in `1..=12`.
    pub month: u32,
    /// Number of non-missing values the month had.
    pub n_samples: usize,
    /// Fitted distribution, absent if the month could not be fitted.
    pub dist: Option<LogLogistic>,
}

/// Fits for all twelve calendar months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFit {
    months: Vec<MonthlyFit>,
}

impl SeasonalFit {
    /// Fit of the given calendar month (`1..=12`).
    pub fn month(&self, month: u32) -> &MonthlyFit {
        &self.months[month as usize - 1]
    }

    pub fn dist(&self, month: u32) -> Option<&LogLogistic> {
        self.month(month).dist.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonthlyFit> {
        self.months.iter()
    }

    pub fn n_fitted(&self) -> usize {
        self.months.iter().filter(|fit| fit.dist.is_some()).count()
    }
}

/// Fit a log-logistic distribution to the values of every calendar month.
///
/// Months with fewer than `min_samples` non-missing values (and never fewer
/// than three) are left absent. So are months whose moments solve to an
/// invalid distribution.
pub fn fit(series: &Series, min_samples: usize) -> SeasonalFit {
    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); 12];
    for point in series.iter() {
        if let Some(val) = point.value {
            buckets[point.month() as usize - 1].push(val);
        }
    }

    let min_samples = min_samples.max(MIN_PWM_SAMPLES);
    let months: Vec<_> = buckets
        .into_par_iter()
        .enumerate()
        .map(|(idx, bucket)| fit_month(idx as u32 + 1, bucket, min_samples))
        .collect();

    let fit = SeasonalFit { months };
    log::debug!("fitted {} of 12 months", fit.n_fitted());
    fit
}

fn fit_month(month: u32, mut bucket: Vec<f64>, min_samples: usize) -> MonthlyFit {
    let n_samples = bucket.len();
    if n_samples < min_samples {
        log::debug!("month {month} has {n_samples} samples, needs {min_samples}");
        return MonthlyFit {
            month,
            n_samples,
            dist: None,
        };
    }

    bucket.sort_by(f64::total_cmp);
    let moments = probability_weighted_moments(&bucket);
    let dist = LogLogistic::from_moments(moments);
    if dist.is_none() {
        log::warn!("month {month} moments {moments:?} do not define a log-logistic");
    }

    MonthlyFit {
        month,
        n_samples,
        dist,
    }
}
