mod cli;

use std::process::ExitCode;

use env_logger::{Builder, Target};
use log::{error, info, LevelFilter};
use thiserror::Error;

use gnss_lsq::prelude::{
    ConfigError, Error as ProcessingError, ObservationTableReader, Processor, ResultWriter,
    SatelliteEpochCatalog,
};

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file: {0}")]
    ConfigFile(std::io::Error),
    #[error("configuration file: {0}")]
    ConfigParsing(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid value \"{0}\", expecting three comma separated numbers")]
    InvalidTriplet(String),
    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

impl Error {
    /// Process exit code, distinct per failure class
    fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigFile(_)
            | Self::ConfigParsing(_)
            | Self::Config(_)
            | Self::InvalidTriplet(_) => 1,
            Self::Processing(e) => match e {
                e if e.is_catalog_error() => 2,
                ProcessingError::SourceOpen { .. } => 3,
                ProcessingError::SinkOpen { .. } => 4,
                ProcessingError::Write(_) => 6,
                _ => 5,
            },
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let cfg = cli.config()?;
    info!(
        "max iterations={}, threshold={:E}m, tolerance={}s, reference={}, output={}",
        cfg.solver.max_iterations,
        cfg.solver.convergence_threshold_m,
        cfg.matching.tolerance_s,
        cfg.reference,
        cfg.output
    );

    let catalog = SatelliteEpochCatalog::from_file(cli.satellites())?;
    info!(
        "{}: {} epochs of satellite positions",
        cli.satellites(),
        catalog.len()
    );

    let mut source = ObservationTableReader::from_file(cli.observations())?;
    let mut sink = ResultWriter::create(cli.results(), cfg.output)?;

    let processor = Processor::new(&cfg, &catalog);
    let summary = processor.run(&mut source, &mut sink)?;

    info!("{}: {} solutions", cli.results(), summary.solved);

    if !summary.statistics.is_empty() && !cli.quiet() {
        info!("position errors:\n{}", summary.statistics);
    }

    Ok(())
}

pub fn main() -> ExitCode {
    let mut builder = Builder::new();

    builder
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let cli = Cli::new();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        },
    }
}
