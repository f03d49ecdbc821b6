//! Errors raised by the index engine.

use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Climate variable a raw series was measured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    Precipitation,
    Evapotranspiration,
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Precipitation => write!(f, "precipitation"),
            Variable::Evapotranspiration => write!(f, "evapotranspiration"),
        }
    }
}

/// Fatal failures of the engine.
///
/// Months without enough samples to fit are not errors: they show up as
/// missing index values instead.
#[derive(Debug, Error, PartialEq)]
pub enum SpeiError {
    /// The two raw series have no timestamp in common.
    #[error("precipitation and evapotranspiration series share no timestamps")]
    DataMisalignment,

    /// A raw series contains the same timestamp twice.
    #[error("{variable} series contains timestamp {date} more than once")]
    DuplicateTimestamp { variable: Variable, date: NaiveDate },

    /// A rolling window of zero points was requested.
    #[error("window must be at least 1, but is {0}")]
    InvalidWindow(usize),
}
