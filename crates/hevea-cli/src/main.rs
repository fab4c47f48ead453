//! hevea - latex quality grading CLI
//!
//! Usage:
//!   hevea classify --drc 65.5 --moisture 0.5 --impurities 0.3 --color 9
//!   hevea classify ... --algorithm tree     # Decision tree instead of KNN
//!   hevea compare ...                       # Both engines, flags disagreement
//!   hevea screen ...                        # Anomaly screening
//!   hevea optimal-k --max-k 10 --folds 5    # Cross-validated k search
//!   hevea info                              # Training corpus summary
//!
//! Every command trains on `--history FILE` (a JSON array of graded
//! samples) when given, and on the synthetic corpus otherwise.

use clap::{Args, Parser, Subcommand};
use hevea::grading::{Algorithm, LabMeasurement};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

use commands::{classify, compare, info, optimal_k, screen, Context};

/// hevea - Latex quality grading
///
/// Grades latex samples A to D with k-nearest neighbors or a decision tree.
#[derive(Parser)]
#[command(name = "hevea")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Historical graded samples (JSON array)
    #[arg(long, global = true, value_name = "FILE")]
    history: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Lab results of the sample to grade
#[derive(Args, Debug, Clone, Copy)]
struct MeasurementArgs {
    /// Dry rubber content, percent
    #[arg(long)]
    drc: f64,

    /// Moisture content, percent
    #[arg(long)]
    moisture: f64,

    /// Impurities, percent
    #[arg(long)]
    impurities: f64,

    /// Color score, 0 to 10
    #[arg(long)]
    color: f64,

    /// Viscosity; grading uses four features when omitted
    #[arg(long)]
    viscosity: Option<f64>,
}

impl From<MeasurementArgs> for LabMeasurement {
    fn from(args: MeasurementArgs) -> Self {
        let measurement = LabMeasurement::new(args.drc, args.moisture, args.impurities, args.color);
        match args.viscosity {
            Some(v) => measurement.with_viscosity(v),
            None => measurement,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one sample
    Classify {
        #[command(flatten)]
        measurement: MeasurementArgs,

        /// Engine: knn or tree
        #[arg(short, long, default_value = "knn")]
        algorithm: Algorithm,
    },

    /// Grade with both engines and report disagreement
    Compare {
        #[command(flatten)]
        measurement: MeasurementArgs,
    },

    /// Screen a sample for anomalous lab values
    Screen {
        #[command(flatten)]
        measurement: MeasurementArgs,
    },

    /// Cross-validate k for the KNN engine
    OptimalK {
        /// Exclusive upper bound on k
        #[arg(long, default_value = "10")]
        max_k: usize,

        /// Number of folds
        #[arg(long, default_value = "5")]
        folds: usize,
    },

    /// Describe the training corpus and settings
    Info,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = Context::new(cli.config.as_deref(), cli.history.as_deref(), cli.json).and_then(
        |ctx| match cli.command {
            Commands::Classify {
                measurement,
                algorithm,
            } => classify::run(&ctx, &measurement.into(), algorithm),
            Commands::Compare { measurement } => compare::run(&ctx, &measurement.into()),
            Commands::Screen { measurement } => screen::run(&ctx, &measurement.into()),
            Commands::OptimalK { max_k, folds } => optimal_k::run(&ctx, max_k, folds),
            Commands::Info => info::run(&ctx),
        },
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}
