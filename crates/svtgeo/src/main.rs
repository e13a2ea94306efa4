use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use svtgeo_core::pipeline::{self, TableSummary};
use svtgeo_core::RunConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare SVT sensor positions across geometry dumps", long_about = None)]
struct Cli {
    /// TOML file listing detectors and master-table columns
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory that detector paths are resolved against
    #[arg(long, global = true)]
    input_dir: Option<PathBuf>,
    /// Directory the CSV tables are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the transposed top and bottom master tables (default)
    Master,
    /// Write all detectors side by side, top and bottom merged
    Wide(WideArgs),
    /// Write one detector's sensors in long form
    Single(SingleArgs),
    /// Write axial/stereo separations and mean layer positions
    Pairs,
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug, Default)]
struct WideArgs {
    /// Use the first detector's sensors as rows instead of the configured schema
    #[arg(long)]
    first_detector_rows: bool,
}

#[derive(Args, Debug)]
struct SingleArgs {
    /// Detector label as configured
    #[arg(long)]
    detector: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command.unwrap_or(Command::Master) {
        Command::Master => handle_master(&config),
        Command::Wide(args) => handle_wide(&config, args),
        Command::Single(args) => handle_single(&config, args),
        Command::Pairs => handle_pairs(&config),
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(dir) = &cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    Ok(config)
}

fn handle_master(config: &RunConfig) -> Result<()> {
    let detectors = pipeline::load_detectors(config)?;
    let summaries = pipeline::write_master_tables(config, &detectors)?;
    report(&summaries);
    Ok(())
}

fn handle_wide(config: &RunConfig, args: WideArgs) -> Result<()> {
    let detectors = pipeline::load_detectors(config)?;
    let summary = pipeline::write_wide_table(config, &detectors, args.first_detector_rows)?;
    report(&[summary]);
    Ok(())
}

fn handle_single(config: &RunConfig, args: SingleArgs) -> Result<()> {
    let detector = pipeline::load_annotated(config, &args.detector)?;
    let summary = pipeline::write_detector_table(config, &detector)?;
    report(&[summary]);
    Ok(())
}

fn handle_pairs(config: &RunConfig) -> Result<()> {
    let detectors = pipeline::load_detectors(config)?;
    let summary = pipeline::write_pair_table(config, &detectors)?;
    report(&[summary]);
    Ok(())
}

fn report(summaries: &[TableSummary]) {
    for summary in summaries {
        println!("{} ({} rows)", summary.path.display(), summary.rows);
    }
    info!(tables = summaries.len(), "Run complete");
}
