use crate::config::SynthesisConfig;
use crate::fit::LogLogistic;
use crate::series::{Series, TimePoint};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::distr::Open01;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Normal;
use std::f64::consts::TAU;

/// Synthetic precipitation and evapotranspiration.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthetic {
    pub precip: Series,
    pub etp: Series,
}

/// Water balance distribution of the given calendar month.
///
/// The location follows a cosine over the year, wettest in January.
pub fn balance_dist(cfg: &SynthesisConfig, month: u32) -> LogLogistic {
    let phase = TAU * (month - 1) as f64 / 12.0;
    LogLogistic {
        shape: cfg.shape,
        scale: cfg.scale,
        location: cfg.location + cfg.seasonality * phase.cos(),
    }
}

/// Generate `n_years` of monthly inputs whose balance is log-logistic.
///
/// The balance is drawn by inverse-CDF sampling from [`balance_dist`],
/// evapotranspiration is a seasonal sine plus Gaussian noise and
/// precipitation closes the balance.
pub fn synthesize(cfg: &SynthesisConfig) -> Result<Synthetic> {
    let mut rng = match cfg.seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::try_from_os_rng()?,
    };

    let noise_dist = Normal::new(0.0, cfg.etp_noise)?;

    let n_months = 12 * cfg.n_years;
    let mut precip = Vec::with_capacity(n_months);
    let mut etp = Vec::with_capacity(n_months);

    for i_year in 0..cfg.n_years {
        let year = cfg.first_year + i_year as i32;
        for month in 1..=12 {
            let date = NaiveDate::from_ymd_opt(year, month, 1)
                .with_context(|| format!("failed to build date {year}-{month}"))?;

            let prob: f64 = rng.sample(Open01);
            let balance = balance_dist(cfg, month).quantile(prob);

            let phase = TAU * (month - 1) as f64 / 12.0;
            let noise = noise_dist.sample(&mut rng);
            let etp_val = cfg.etp_mean + cfg.etp_amplitude * phase.sin() + noise;

            precip.push(TimePoint::new(date, Some(balance + etp_val)));
            etp.push(TimePoint::new(date, Some(etp_val)));
        }
    }

    log::debug!("synthesized {n_months} months from {}", cfg.first_year);

    Ok(Synthetic {
        precip: Series::new(precip),
        etp: Series::new(etp),
    })
}
