use crate::accumulate::accumulate;
use crate::category::{Category, categorize_series};
use crate::config::IndexConfig;
use crate::error::SpeiError;
use crate::fit::{SeasonalFit, fit};
use crate::series::{Series, align};
use crate::standardize::standardize;

/// Every intermediate and final product of one index computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Monthly water balance.
    pub balance: Series,
    /// Balance summed over the accumulation window.
    pub accumulated: Series,
    /// Per-month distributions of the accumulated balance.
    pub fit: SeasonalFit,
    /// Index value of every accumulated point.
    pub index: Series,
    /// Category of every index point.
    pub categories: Vec<Option<Category>>,
}

/// Compute the index from raw precipitation and evapotranspiration.
///
/// Runs alignment, accumulation, fitting, standardization and
/// categorization in turn. The computation is a pure function of its
/// arguments.
pub fn compute(precip: &Series, etp: &Series, cfg: &IndexConfig) -> Result<Outcome, SpeiError> {
    let balance = align(precip, etp)?;
    let accumulated = accumulate(&balance, cfg.window)?;
    let fit = fit(&accumulated, cfg.min_samples);
    let index = standardize(&accumulated, &fit);
    let categories = categorize_series(&index);

    let n_missing = index.iter().filter(|point| point.value.is_none()).count();
    log::info!(
        "computed {} index values ({n_missing} missing) over {} months with {} of 12 months fitted",
        index.len(),
        balance.len(),
        fit.n_fitted()
    );

    Ok(Outcome {
        balance,
        accumulated,
        fit,
        index,
        categories,
    })
}
