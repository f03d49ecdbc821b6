//! CSV reading and writing of monthly series.
//!
//! Series files have a `date,value` header, ISO dates (`%Y-%m-%d`) and an
//! empty `value` for missing observations.

use crate::pipeline::Outcome;
use crate::series::{Series, TimePoint};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct SeriesRow {
    date: NaiveDate,
    value: Option<f64>,
}

#[derive(Debug, Serialize)]
struct IndexRow<'a> {
    date: NaiveDate,
    accumulated: Option<f64>,
    spei: Option<f64>,
    category: Option<&'a str>,
}

/// Read a series, moving every date to the first day of its month.
pub fn read_series<P: AsRef<Path>>(file: P) -> Result<Series> {
    let file = file.as_ref();
    let mut reader =
        csv::Reader::from_path(file).with_context(|| format!("failed to open {file:?}"))?;

    let mut points = Vec::new();
    for (i_row, row) in reader.deserialize::<SeriesRow>().enumerate() {
        let row = row.with_context(|| format!("failed to parse row {i_row} of {file:?}"))?;
        let date = first_of_month(row.date)
            .with_context(|| format!("invalid date in row {i_row} of {file:?}"))?;
        points.push(TimePoint::new(date, row.value));
    }

    Ok(Series::new(points))
}

pub fn write_series<P: AsRef<Path>>(file: P, series: &Series) -> Result<()> {
    let file = file.as_ref();
    let mut writer =
        csv::Writer::from_path(file).with_context(|| format!("failed to create {file:?}"))?;

    for point in series.iter() {
        writer
            .serialize(SeriesRow {
                date: point.date,
                value: point.value,
            })
            .context("failed to serialize row")?;
    }

    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

/// Write the accumulated balance, index and category of every point, keeping
/// only the dates present in `index`.
pub fn write_index<P: AsRef<Path>>(file: P, outcome: &Outcome, index: &Series) -> Result<()> {
    let file = file.as_ref();
    let mut writer =
        csv::Writer::from_path(file).with_context(|| format!("failed to create {file:?}"))?;

    let rows = outcome
        .accumulated
        .iter()
        .zip(outcome.index.iter())
        .zip(outcome.categories.iter());
    let mut kept = index.iter().map(|point| point.date).peekable();
    for ((acc, spei), category) in rows {
        if kept.next_if_eq(&spei.date).is_none() {
            continue;
        }
        writer
            .serialize(IndexRow {
                date: spei.date,
                accumulated: acc.value,
                spei: spei.value,
                category: category.as_ref().map(|category| category.label()),
            })
            .context("failed to serialize row")?;
    }

    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}
