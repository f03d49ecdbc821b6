use crate::aggregate::{filter_years, moving_average};
use crate::config::Config;
use crate::ingest::{read_series, write_index, write_series};
use crate::pipeline::compute;
use crate::report::Report;
use crate::synth::synthesize;
use anyhow::{Context, Result, bail};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Owns a run directory: its configuration, inputs and outputs.
pub struct Manager {
    run_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(run_dir: P) -> Result<Self> {
        let run_dir = run_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(run_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { run_dir, cfg })
    }

    /// Write synthetic precipitation and evapotranspiration inputs.
    pub fn synthesize_inputs(&self) -> Result<()> {
        let Some(synthesis) = &self.cfg.synthesis else {
            bail!("config has no synthesis section");
        };

        let synthetic = synthesize(synthesis).context("failed to synthesize inputs")?;

        let precip_file = self.precip_file();
        write_series(&precip_file, &synthetic.precip)
            .with_context(|| format!("failed to write {precip_file:?}"))?;
        log::info!("wrote {precip_file:?}");

        let etp_file = self.etp_file();
        write_series(&etp_file, &synthetic.etp)
            .with_context(|| format!("failed to write {etp_file:?}"))?;
        log::info!("wrote {etp_file:?}");

        Ok(())
    }

    /// Compute the index from the inputs and write the index tables and the
    /// report.
    pub fn compute_index(&self) -> Result<()> {
        let precip_file = self.precip_file();
        let precip =
            read_series(&precip_file).with_context(|| format!("failed to read {precip_file:?}"))?;
        log::info!("read {} points from {precip_file:?}", precip.len());

        let etp_file = self.etp_file();
        let etp = read_series(&etp_file).with_context(|| format!("failed to read {etp_file:?}"))?;
        log::info!("read {} points from {etp_file:?}", etp.len());

        let outcome = compute(&precip, &etp, &self.cfg.index).context("failed to compute index")?;

        let analysis = &self.cfg.analysis;
        let index = filter_years(
            &outcome.index,
            analysis.first_year.unwrap_or(i32::MIN),
            analysis.last_year.unwrap_or(i32::MAX),
        );
        if index.len() < outcome.index.len() {
            log::info!("kept {} of {} index points", index.len(), outcome.index.len());
        }

        let index_file = self.index_file();
        write_index(&index_file, &outcome, &index)
            .with_context(|| format!("failed to write {index_file:?}"))?;
        log::info!("wrote {index_file:?}");

        let averaged = moving_average(&index, analysis.moving_average)
            .context("failed to average index")?;
        let average_file = self.average_file();
        write_series(&average_file, &averaged)
            .with_context(|| format!("failed to write {average_file:?}"))?;
        log::info!("wrote {average_file:?}");

        let report = Report::new(self.cfg.index.window, &outcome, &index);
        let report_file = self.report_file();
        report
            .save(&report_file)
            .with_context(|| format!("failed to save {report_file:?}"))?;
        log::info!("wrote {report_file:?}");

        Ok(())
    }

    /// Remove every output of [`Manager::compute_index`].
    pub fn clean_outputs(&self) -> Result<()> {
        let mut outputs = self.glob_files("spei*.csv").context("failed to glob index files")?;
        outputs.push(self.report_file());

        for file in outputs.into_iter().filter(|file| file.is_file()) {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }

        Ok(())
    }

    fn glob_files(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = self.run_dir.join(pattern);
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let files = glob(pattern)
            .context("failed to glob files")?
            .filter_map(Result::ok)
            .collect();
        Ok(files)
    }

    fn precip_file(&self) -> PathBuf {
        self.run_dir.join(&self.cfg.input.precipitation)
    }

    fn etp_file(&self) -> PathBuf {
        self.run_dir.join(&self.cfg.input.evapotranspiration)
    }

    pub fn index_file(&self) -> PathBuf {
        self.run_dir.join("spei.csv")
    }

    pub fn average_file(&self) -> PathBuf {
        self.run_dir.join("spei-moving-average.csv")
    }

    pub fn report_file(&self) -> PathBuf {
        self.run_dir.join("report.msgpack")
    }
}
