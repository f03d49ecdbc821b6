use crate::fit::DEFAULT_MIN_SAMPLES;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path, path::PathBuf};

/// Run configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Input file locations.
    pub input: InputConfig,

    /// Index computation parameters.
    #[serde(default)]
    pub index: IndexConfig,

    /// Post-processing parameters.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Synthetic input parameters, needed only to synthesize inputs.
    pub synthesis: Option<SynthesisConfig>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Precipitation CSV, relative to the run directory.
    pub precipitation: PathBuf,
    /// Potential evapotranspiration CSV, relative to the run directory.
    pub evapotranspiration: PathBuf,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Accumulation window in months.
    pub window: usize,
    /// Minimum number of samples for a calendar month to be fitted.
    pub min_samples: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            window: 1,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Window of the moving average of the index, in months.
    pub moving_average: usize,
    /// First year reported (inclusive).
    pub first_year: Option<i32>,
    /// Last year reported (inclusive).
    pub last_year: Option<i32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            moving_average: 12,
            first_year: None,
            last_year: None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Number of full years generated.
    pub n_years: usize,
    /// Year of the first generated January.
    pub first_year: i32,

    /// Shape of the monthly water balance distribution.
    pub shape: f64,
    /// Scale of the monthly water balance distribution.
    pub scale: f64,
    /// Mean location of the monthly water balance distribution.
    pub location: f64,
    /// Amplitude of the seasonal shift of the location.
    pub seasonality: f64,

    /// Mean evapotranspiration.
    pub etp_mean: f64,
    /// Amplitude of the seasonal evapotranspiration cycle.
    pub etp_amplitude: f64,
    /// Standard deviation of the evapotranspiration noise.
    pub etp_noise: f64,

    /// Random seed; drawn from the OS if absent.
    pub seed: Option<u64>,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.index.window, 1..=48).context("invalid accumulation window")?;
        check_num(self.index.min_samples, 3..=10_000)
            .context("invalid minimum number of samples")?;

        check_num(self.analysis.moving_average, 1..=120)
            .context("invalid moving average window")?;
        if let (Some(first), Some(last)) = (self.analysis.first_year, self.analysis.last_year) {
            check_num(last, first..).context("invalid year range")?;
        }

        if let Some(synthesis) = &self.synthesis {
            synthesis
                .validate()
                .context("invalid synthesis parameters")?;
        }

        Ok(())
    }
}

impl SynthesisConfig {
    fn validate(&self) -> Result<()> {
        check_num(self.n_years, 1..=1_000).context("invalid number of years")?;
        check_num(self.first_year, 1..=9_000).context("invalid first year")?;

        check_num(self.shape, 1.0..=100.0).context("invalid shape")?;
        if self.shape == 1.0 {
            bail!("shape must exceed 1.0 for the balance to have a mean");
        }
        check_num(self.scale, 0.0..=1e6).context("invalid scale")?;
        if self.scale == 0.0 {
            bail!("scale must be positive");
        }
        check_finite(self.location).context("invalid location")?;
        check_finite(self.seasonality).context("invalid seasonality")?;

        check_finite(self.etp_mean).context("invalid mean evapotranspiration")?;
        check_finite(self.etp_amplitude).context("invalid evapotranspiration amplitude")?;
        check_num(self.etp_noise, 0.0..=1e6).context("invalid evapotranspiration noise")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_finite(num: f64) -> Result<()> {
    if !num.is_finite() {
        bail!("number must be finite, but is {num:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[input]
precipitation = "precipitation.csv"
evapotranspiration = "evapotranspiration.csv"
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();

        assert_eq!(config.index, IndexConfig::default());
        assert_eq!(config.index.min_samples, 8);
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert_eq!(config.synthesis, None);
    }

    #[test]
    fn full_config_is_parsed() {
        let contents = String::new()
            + MINIMAL
            + "[index]\n"
            + "window = 3\n"
            + "min_samples = 10\n"
            + "[analysis]\n"
            + "moving_average = 6\n"
            + "first_year = 1981\n"
            + "last_year = 1990\n"
            + "[synthesis]\n"
            + "n_years = 20\n"
            + "first_year = 1981\n"
            + "shape = 3.0\n"
            + "scale = 60.0\n"
            + "location = -90.0\n"
            + "seasonality = 20.0\n"
            + "etp_mean = 110.0\n"
            + "etp_amplitude = 40.0\n"
            + "etp_noise = 5.0\n"
            + "seed = 7\n";

        let config = Config::from_toml(&contents).unwrap();

        assert_eq!(config.index.window, 3);
        assert_eq!(config.analysis.last_year, Some(1990));
        let synthesis = config.synthesis.unwrap();
        assert_eq!(synthesis.seed, Some(7));
        assert_eq!(synthesis.location, -90.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_window = String::new() + MINIMAL + "[index]\nwindow = 0\nmin_samples = 8\n";
        let err = Config::from_toml(&zero_window).unwrap_err();
        assert!(format!("{err:#}").contains("invalid accumulation window"));

        let reversed = String::new()
            + MINIMAL
            + "[analysis]\nmoving_average = 12\nfirst_year = 2000\nlast_year = 1990\n";
        assert!(Config::from_toml(&reversed).is_err());

        let unknown = String::new() + MINIMAL + "[index]\nwindow = 1\nmin_samples = 8\nk = 2\n";
        assert!(Config::from_toml(&unknown).is_err());
    }
}
