//! Monthly time series and the alignment of the two climate inputs.

use crate::error::{SpeiError, Variable};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single monthly observation. `None` marks a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl TimePoint {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }

    /// Calendar month of the observation, in `1..=12`.
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Ordered sequence of monthly observations.
///
/// The same representation carries raw inputs, the water balance, the
/// accumulated balance and the index itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub points: Vec<TimePoint>,
}

impl Series {
    pub fn new(points: Vec<TimePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimePoint> {
        self.points.iter()
    }

    /// Non-missing values in series order.
    pub fn present_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().filter_map(|point| point.value)
    }
}

impl FromIterator<TimePoint> for Series {
    fn from_iter<I: IntoIterator<Item = TimePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Merge precipitation and evapotranspiration into the water balance
/// `precipitation - evapotranspiration`.
///
/// Only timestamps present in both inputs survive. The result is sorted by
/// date whatever the order of the inputs. A balance is missing when either
/// term is missing.
///
/// # Errors
/// Returns [`SpeiError::DuplicateTimestamp`] if an input repeats a date and
/// [`SpeiError::DataMisalignment`] if the inputs have no date in common.
pub fn align(precip: &Series, etp: &Series) -> Result<Series, SpeiError> {
    let precip = index_by_date(precip, Variable::Precipitation)?;
    let etp = index_by_date(etp, Variable::Evapotranspiration)?;

    let balance: Series = precip
        .iter()
        .filter_map(|(&date, &p)| {
            let &e = etp.get(&date)?;
            Some(TimePoint::new(date, p.zip(e).map(|(p, e)| p - e)))
        })
        .collect();

    if balance.is_empty() {
        return Err(SpeiError::DataMisalignment);
    }

    log::debug!("aligned {} common months", balance.len());

    Ok(balance)
}

fn index_by_date(
    series: &Series,
    variable: Variable,
) -> Result<BTreeMap<NaiveDate, Option<f64>>, SpeiError> {
    let mut map = BTreeMap::new();
    for point in series.iter() {
        if map.insert(point.date, point.value).is_some() {
            return Err(SpeiError::DuplicateTimestamp {
                variable,
                date: point.date,
            });
        }
    }
    Ok(map)
}
