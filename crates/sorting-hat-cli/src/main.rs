//! sorting-hat CLI: train, apply and inspect one-vs-all house classifiers.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sorting_hat::config::{DEFAULT_LABEL_COLUMN, DEFAULT_MODEL_PATH, DEFAULT_PREDICTIONS_PATH};
use tracing_subscriber::EnvFilter;

use commands::TrainArgs;

#[derive(Parser, Debug)]
#[command(name = "sorting-hat")]
#[command(about = "One-vs-all logistic regression house classifier")]
#[command(version)]
struct Cli {
    /// Log per-epoch weights (debug level); RUST_LOG overrides
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fit imputation, scaling and the four classifiers, then save the model
    Train(TrainArgs),

    /// Predict a house for every row of a dataset
    Predict {
        /// Dataset to classify (CSV)
        data: PathBuf,

        /// Trained model file
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Output prediction table (CSV)
        #[arg(short, long, default_value = DEFAULT_PREDICTIONS_PATH)]
        output: PathBuf,
    },

    /// Report accuracy, confusion counts and per-house metrics on labelled data
    Evaluate {
        /// Labelled dataset (CSV)
        data: PathBuf,

        /// Trained model file
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Class label column
        #[arg(long, default_value = DEFAULT_LABEL_COLUMN)]
        label_column: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print descriptive statistics of every numeric column
    Describe {
        /// Dataset to summarise (CSV)
        data: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Train(args) => commands::cmd_train(&args),
        Commands::Predict {
            data,
            model,
            output,
        } => commands::cmd_predict(&data, &model, &output),
        Commands::Evaluate {
            data,
            model,
            label_column,
            json,
        } => commands::cmd_evaluate(&data, &model, &label_column, json),
        Commands::Describe { data } => commands::cmd_describe(&data),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}
