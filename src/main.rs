//! Site Analyser - command-line front end over the scoring core

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;

use site_analyser_core::constants::{APP_NAME, APP_VERSION};
use site_analyser_core::logic::training::dataset::parse_labeled_scans;
use site_analyser_core::{Engine, EngineConfig, ModelFamily, ScanData, TrainingError};

#[derive(Parser, Debug)]
#[command(name = "site-analyser", about = "Risk scoring and threat classification for site scans", version)]
struct Cli {
    /// Directory for persisted models (overrides MODEL_PATH)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a scan record (JSON file) and print the assessment
    Score { scan: PathBuf },

    /// Train one model family and print its metrics
    Train {
        /// risk, threat or anomaly
        family: ModelFamily,

        /// JSON array of labelled scans (synthetic data when omitted)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Grid search before the final fit
        #[arg(long)]
        tune: bool,

        /// Do not persist the trained model
        #[arg(long)]
        no_save: bool,
    },

    /// Print model info for every family
    Info,

    /// Print the risk model's feature importance report
    Importance,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error("cannot render output: {0}")]
    Output(#[from] serde_json::Error),
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = EngineConfig::from_env();
    if let Some(dir) = cli.model_dir {
        config.model_dir = dir;
    }
    let engine = Engine::new(config);

    match cli.command {
        Command::Score { scan } => {
            let text = read(&scan)?;
            let value: serde_json::Value = serde_json::from_str(&text).map_err(|source| CliError::Json {
                path: scan.clone(),
                source,
            })?;
            let record = ScanData::from_value(value).map_err(|source| CliError::Json { path: scan, source })?;
            print_json(&engine.assess(&record))
        }
        Command::Train {
            family,
            data,
            tune,
            no_save,
        } => {
            let scans = match data {
                Some(path) => {
                    let text = read(&path)?;
                    Some(parse_labeled_scans(&text).map_err(|source| CliError::Json { path, source })?)
                }
                None => None,
            };
            let trained = engine.train(family, scans.as_deref(), tune, !no_save)?;
            print_json(&trained.metrics_json())
        }
        Command::Info => print_json(&engine.model_info()),
        Command::Importance => print_json(&engine.feature_importance()?),
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    log::debug!("Starting {} v{}", APP_NAME, APP_VERSION);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
