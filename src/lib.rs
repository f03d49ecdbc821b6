//! Standardized Precipitation-Evapotranspiration Index (SPEI).
//!
//! The engine turns monthly precipitation and potential evapotranspiration
//! into a drought index in five pure stages:
//!
//! 1. [`series::align`] joins the inputs into a water balance,
//! 2. [`accumulate::accumulate`] sums it over a trailing window,
//! 3. [`fit::fit`] fits a log-logistic distribution per calendar month,
//! 4. [`standardize::standardize`] maps values to standard-normal scores,
//! 5. [`category::categorize`] classifies the scores.
//!
//! [`pipeline::compute`] chains the stages and [`aggregate`] summarizes the
//! result. The remaining modules read and write run directories for the
//! command-line tool.

pub mod accumulate;
pub mod aggregate;
pub mod category;
pub mod config;
pub mod error;
pub mod fit;
pub mod ingest;
pub mod manager;
pub mod pipeline;
pub mod report;
pub mod series;
pub mod standardize;
pub mod stats;
pub mod synth;

pub use error::SpeiError;
pub use pipeline::{Outcome, compute};
pub use series::{Series, TimePoint};
