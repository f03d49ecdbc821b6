//! Grouped and whole-history statistics of an index series.
//!
//! Missing values never contribute to any statistic. Every function accepts
//! an empty series and then returns an empty map or `None`.

use crate::category::{Category, categorize};
use crate::error::SpeiError;
use crate::series::{Series, TimePoint};
use crate::stats::{Line, RunningStats, StatsReport, least_squares, median};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Calendar grouping of index points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    Year,
    /// First year of the decade, e.g. 1990 for 1990..=1999.
    Decade,
    /// Month of the year, in `1..=12`.
    Month,
}

impl GroupBy {
    pub fn key(&self, date: NaiveDate) -> i32 {
        match self {
            GroupBy::Year => date.year(),
            GroupBy::Decade => date.year().div_euclid(10) * 10,
            GroupBy::Month => date.month() as i32,
        }
    }
}

/// Count, mean, sample standard deviation and range of each group.
///
/// Groups without any non-missing value are left out.
pub fn group_stats<K, F>(index: &Series, key_fn: F) -> BTreeMap<K, StatsReport>
where
    K: Ord,
    F: Fn(NaiveDate) -> K,
{
    let mut groups: BTreeMap<K, RunningStats> = BTreeMap::new();
    for point in index.iter() {
        if let Some(val) = point.value {
            groups.entry(key_fn(point.date)).or_default().add(val);
        }
    }
    groups
        .into_iter()
        .map(|(key, stats)| (key, stats.report()))
        .collect()
}

/// Percentage of each category within each group.
///
/// All seven categories appear in every group, with `0.0` for the absent
/// ones, so the percentages of a group always sum to 100.
pub fn category_distribution<K, F>(
    index: &Series,
    key_fn: F,
) -> BTreeMap<K, BTreeMap<Category, f64>>
where
    K: Ord,
    F: Fn(NaiveDate) -> K,
{
    let mut counts: BTreeMap<K, BTreeMap<Category, usize>> = BTreeMap::new();
    for point in index.iter() {
        if let Some(category) = categorize(point.value) {
            *counts
                .entry(key_fn(point.date))
                .or_default()
                .entry(category)
                .or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(key, group)| {
            let total: usize = group.values().sum();
            let shares = Category::ALL
                .iter()
                .map(|category| {
                    let count = group.get(category).copied().unwrap_or(0);
                    (*category, 100.0 * count as f64 / total as f64)
                })
                .collect();
            (key, shares)
        })
        .collect()
}

/// Trailing mean over `window` points.
///
/// The first `window - 1` points, and any point whose window holds a missing
/// value, are missing. The output has one point per input point.
pub fn moving_average(index: &Series, window: usize) -> Result<Series, SpeiError> {
    if window == 0 {
        return Err(SpeiError::InvalidWindow(window));
    }

    let points = &index.points;
    Ok(points
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            let value = (idx + 1 >= window)
                .then(|| {
                    points[idx + 1 - window..=idx]
                        .iter()
                        .map(|point| point.value)
                        .sum::<Option<f64>>()
                })
                .flatten()
                .map(|sum| sum / window as f64);
            TimePoint::new(point.date, value)
        })
        .collect())
}

/// Points whose year lies in `first..=last`.
pub fn filter_years(series: &Series, first: i32, last: i32) -> Series {
    series
        .iter()
        .filter(|point| (first..=last).contains(&point.year()))
        .copied()
        .collect()
}

/// Descriptive statistics of the whole series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

pub fn summary(index: &Series) -> Option<Summary> {
    let mut vals: Vec<f64> = index.present_values().collect();
    if vals.is_empty() {
        return None;
    }

    let mut stats = RunningStats::new();
    vals.iter().for_each(|&val| stats.add(val));
    let report = stats.report();

    Some(Summary {
        count: report.count,
        mean: report.mean,
        median: median(&mut vals),
        variance: stats.variance(),
        std_dev: report.std_dev,
        min: report.min,
        max: report.max,
    })
}

/// Linear trend of the index, with the slope in index units per year.
///
/// Time is the decimal year `year + (month - 1) / 12`.
pub fn trend(index: &Series) -> Option<Line> {
    let pairs: Vec<_> = index
        .iter()
        .filter_map(|point| point.value.map(|val| (decimal_year(point.date), val)))
        .collect();
    least_squares(&pairs)
}

fn decimal_year(date: NaiveDate) -> f64 {
    date.year() as f64 + date.month0() as f64 / 12.0
}
