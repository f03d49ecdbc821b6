use crate::aggregate::{GroupBy, Summary, category_distribution, group_stats, summary, trend};
use crate::category::Category;
use crate::fit::MonthlyFit;
use crate::pipeline::Outcome;
use crate::series::Series;
use crate::stats::{Line, StatsReport};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Aggregated results of one run, as handed to presentation tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub window: usize,
    pub fits: Vec<MonthlyFit>,
    pub summary: Option<Summary>,
    pub trend: Option<Line>,
    pub by_year: BTreeMap<i32, StatsReport>,
    pub by_decade: BTreeMap<i32, StatsReport>,
    pub by_month: BTreeMap<i32, StatsReport>,
    pub categories_by_year: BTreeMap<i32, BTreeMap<Category, f64>>,
    pub categories_by_decade: BTreeMap<i32, BTreeMap<Category, f64>>,
}

impl Report {
    /// Aggregate `index`, a possibly filtered view of `outcome.index`.
    pub fn new(window: usize, outcome: &Outcome, index: &Series) -> Self {
        let by = |group: GroupBy| move |date: NaiveDate| group.key(date);
        Self {
            window,
            fits: outcome.fit.iter().cloned().collect(),
            summary: summary(index),
            trend: trend(index),
            by_year: group_stats(index, by(GroupBy::Year)),
            by_decade: group_stats(index, by(GroupBy::Decade)),
            by_month: group_stats(index, by(GroupBy::Month)),
            categories_by_year: category_distribution(index, by(GroupBy::Year)),
            categories_by_decade: category_distribution(index, by(GroupBy::Decade)),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write_named(&mut writer, self).context("failed to serialize report")?;
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);
        let report = decode::from_read(&mut reader).context("failed to deserialize report")?;
        Ok(report)
    }
}

