use chrono::{Datelike, NaiveDate};
use spei::aggregate::{GroupBy, category_distribution, summary};
use spei::category::categorize;
use spei::config::{IndexConfig, SynthesisConfig};
use spei::fit::LogLogistic;
use spei::report::Report;
use spei::standardize::standardize_value;
use spei::synth::synthesize;
use spei::{Series, SpeiError, TimePoint, compute};
use std::{env, fs, path::PathBuf};

const N_YEARS: i32 = 20;
const FIRST_YEAR: i32 = 1981;
const ETP: f64 = 100.0;

/// Injected balance distribution of each calendar month.
fn injected(month: u32) -> LogLogistic {
    let m = month as f64;
    LogLogistic {
        shape: 2.5 + 0.1 * m,
        scale: 50.0 + 5.0 * m,
        location: -80.0 - 3.0 * m,
    }
}

/// Twenty years whose balance takes, for every month, the twenty plotting
/// position quantiles of the injected distribution in a scrambled order.
fn injected_inputs() -> (Series, Series) {
    let n = N_YEARS as usize;
    let mut precip = Vec::new();
    let mut etp = Vec::new();
    for i_year in 0..n {
        for month in 1..=12 {
            let rank = (i_year * 7 + month as usize) % n + 1;
            let prob = (rank as f64 - 0.35) / n as f64;
            let balance = injected(month).quantile(prob);

            let date = NaiveDate::from_ymd_opt(FIRST_YEAR + i_year as i32, month, 1).unwrap();
            precip.push(TimePoint::new(date, Some(balance + ETP)));
            etp.push(TimePoint::new(date, Some(ETP)));
        }
    }
    (Series::new(precip), Series::new(etp))
}

fn unit_window() -> IndexConfig {
    IndexConfig {
        window: 1,
        min_samples: 8,
    }
}

fn assert_rel_close(actual: f64, expected: f64, tol: f64) {
    let rel = ((actual - expected) / expected).abs();
    assert!(rel < tol, "{actual} differs from {expected} by {rel}");
}

#[test]
fn recovers_injected_parameters() {
    let (precip, etp) = injected_inputs();

    let outcome = compute(&precip, &etp, &unit_window()).unwrap();

    assert_eq!(outcome.fit.n_fitted(), 12);
    for month in 1..=12 {
        let fitted = outcome.fit.dist(month).unwrap();
        let truth = injected(month);
        assert_rel_close(fitted.shape, truth.shape, 0.1);
        assert_rel_close(fitted.scale, truth.scale, 0.1);
        assert_rel_close(fitted.location, truth.location, 0.1);
        assert!((fitted.median() - truth.median()).abs() < 0.02 * truth.scale);
    }
}

#[test]
fn index_is_standard_normal_over_history() {
    let (precip, etp) = injected_inputs();

    let outcome = compute(&precip, &etp, &unit_window()).unwrap();

    let summary = summary(&outcome.index).unwrap();
    assert_eq!(summary.count, 12 * N_YEARS as usize);
    assert!(summary.mean.abs() < 0.1, "mean {}", summary.mean);
    assert!((summary.std_dev - 1.0).abs() < 0.1, "std {}", summary.std_dev);
}

#[test]
fn fitted_median_has_zero_index() {
    let (precip, etp) = injected_inputs();
    let outcome = compute(&precip, &etp, &unit_window()).unwrap();

    for fit in outcome.fit.iter() {
        let dist = fit.dist.as_ref().unwrap();
        assert!(standardize_value(dist.median(), dist).abs() < 1e-12);
    }
}

#[test]
fn runs_are_bit_identical() {
    let (precip, etp) = injected_inputs();
    let cfg = IndexConfig {
        window: 3,
        min_samples: 8,
    };

    let first = compute(&precip, &etp, &cfg).unwrap();
    let second = compute(&precip, &etp, &cfg).unwrap();

    let bits = |series: &Series| -> Vec<Option<u64>> {
        series.iter().map(|p| p.value.map(f64::to_bits)).collect()
    };
    assert_eq!(bits(&first.index), bits(&second.index));
    assert_eq!(first.categories, second.categories);
    assert_eq!(first.fit, second.fit);
}

#[test]
fn accumulation_shortens_the_index() {
    let (precip, etp) = injected_inputs();
    let cfg = IndexConfig {
        window: 6,
        min_samples: 8,
    };

    let outcome = compute(&precip, &etp, &cfg).unwrap();

    assert_eq!(outcome.balance.len(), 240);
    assert_eq!(outcome.accumulated.len(), 235);
    assert_eq!(outcome.index.len(), 235);
    assert_eq!(outcome.categories.len(), 235);
    assert_eq!(outcome.index.points[0].date, outcome.balance.points[5].date);
}

#[test]
fn sparse_month_is_missing_everywhere() {
    let (precip, etp) = injected_inputs();
    // Keep February only in the first five years.
    let sparse = Series::new(
        etp.points
            .iter()
            .filter(|p| p.month() != 2 || p.year() < FIRST_YEAR + 5)
            .copied()
            .collect(),
    );

    let outcome = compute(&precip, &sparse, &unit_window()).unwrap();

    assert_eq!(outcome.fit.month(2).n_samples, 5);
    for (point, category) in outcome.index.iter().zip(&outcome.categories) {
        if point.month() == 2 {
            assert_eq!(point.value, None);
            assert_eq!(*category, None);
        } else {
            assert!(point.value.is_some());
            assert_eq!(*category, categorize(point.value));
        }
    }
}

#[test]
fn window_longer_than_history_gives_empty_index() {
    let (precip, etp) = injected_inputs();
    let precip = Series::new(precip.points[..10].to_vec());
    let cfg = IndexConfig {
        window: 12,
        min_samples: 8,
    };

    let outcome = compute(&precip, &etp, &cfg).unwrap();

    assert!(outcome.index.is_empty());
    assert_eq!(outcome.fit.n_fitted(), 0);
    assert_eq!(summary(&outcome.index), None);
}

#[test]
fn engine_errors_surface() {
    let (precip, etp) = injected_inputs();

    let zero = IndexConfig {
        window: 0,
        min_samples: 8,
    };
    assert_eq!(
        compute(&precip, &etp, &zero),
        Err(SpeiError::InvalidWindow(0))
    );

    let later = Series::new(
        etp.points
            .iter()
            .map(|p| TimePoint::new(p.date.with_year(p.year() + 100).unwrap(), p.value))
            .collect(),
    );
    assert_eq!(
        compute(&precip, &later, &unit_window()),
        Err(SpeiError::DataMisalignment)
    );
}

#[test]
fn yearly_category_shares_sum_to_hundred() {
    let (precip, etp) = injected_inputs();
    let outcome = compute(&precip, &etp, &unit_window()).unwrap();

    let shares = category_distribution(&outcome.index, |date| GroupBy::Year.key(date));

    assert_eq!(shares.len(), N_YEARS as usize);
    for year in shares.values() {
        assert_eq!(year.len(), 7);
        assert!((year.values().sum::<f64>() - 100.0).abs() < 1e-9);
    }
}

#[test]
fn random_synthetic_history_standardizes() {
    let cfg = SynthesisConfig {
        n_years: 100,
        first_year: 1901,
        shape: 3.0,
        scale: 60.0,
        location: -90.0,
        seasonality: 20.0,
        etp_mean: 110.0,
        etp_amplitude: 40.0,
        etp_noise: 5.0,
        seed: Some(42),
    };
    let synthetic = synthesize(&cfg).unwrap();

    let outcome = compute(&synthetic.precip, &synthetic.etp, &unit_window()).unwrap();

    let summary = summary(&outcome.index).unwrap();
    assert!(summary.mean.abs() < 0.1, "mean {}", summary.mean);
    assert!((summary.std_dev - 1.0).abs() < 0.15, "std {}", summary.std_dev);
}

#[test]
fn report_survives_a_save() {
    let (precip, etp) = injected_inputs();
    let outcome = compute(&precip, &etp, &unit_window()).unwrap();
    let report = Report::new(1, &outcome, &outcome.index);

    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("report_survives_a_save");
    fs::create_dir_all(&dir).expect("failed to create test directory");
    let file = dir.join("report.msgpack");

    report.save(&file).unwrap();
    let loaded = Report::load(&file).unwrap();

    assert_eq!(loaded.fits, report.fits);
    assert_eq!(loaded.by_decade.keys().collect::<Vec<_>>(), vec![&1980, &1990, &2000]);
    assert_eq!(loaded.categories_by_year, report.categories_by_year);
    assert_eq!(loaded.summary, report.summary);

    fs::remove_dir_all(&dir).ok();
}
