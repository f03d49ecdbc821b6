use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spei::manager::Manager;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    run_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write synthetic inputs from the synthesis section of the config.
    Synthesize,

    /// Compute the index and write its tables and report.
    Compute,

    /// Remove computed outputs.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.run_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Synthesize => mgr.synthesize_inputs()?,
        Command::Compute => mgr.compute_index()?,
        Command::Clean => mgr.clean_outputs()?,
    }

    Ok(())
}
