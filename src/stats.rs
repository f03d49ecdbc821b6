use serde::{Deserialize, Serialize};

/// Streaming mean, variance and range (Welford's algorithm).
pub struct RunningStats {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
    min: f64,
    max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;

        self.min = self.min.min(val);
        self.max = self.max.max(val);
    }

    pub fn count(&self) -> usize {
        self.n_vals
    }

    /// Sample variance; NaN with fewer than two values.
    pub fn variance(&self) -> f64 {
        if self.n_vals > 1 {
            self.diff_2_sum / (self.n_vals as f64 - 1.0)
        } else {
            f64::NAN
        }
    }

    pub fn report(&self) -> StatsReport {
        StatsReport {
            count: self.n_vals,
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: self.variance().sqrt(),
            min: self.min,
            max: self.max,
        }
    }
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Median of `vals`, which get sorted in place; NaN if empty.
pub fn median(vals: &mut [f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.sort_by(f64::total_cmp);
    let mid = vals.len() / 2;
    if vals.len() % 2 == 0 {
        (vals[mid - 1] + vals[mid]) / 2.0
    } else {
        vals[mid]
    }
}

/// Ordinary least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub slope: f64,
    pub intercept: f64,
}

/// Fit a line through `(x, y)` pairs.
///
/// Returns `None` with fewer than two pairs or when all `x` coincide.
pub fn least_squares(pairs: &[(f64, f64)]) -> Option<Line> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|&(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|&(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for &(x, y) in pairs {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x).powi(2);
    }
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    Some(Line {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}
