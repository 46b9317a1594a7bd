//! Subcommand implementations.

use std::path::{Path, PathBuf};

use clap::Args;
use sorting_hat::classification::{require_labels, GradientDescent, House, OneVsAllModel};
use sorting_hat::config::{DescentMode, TrainingConfig};
use sorting_hat::data::{DataFrame, INDEX_COLUMN};
use sorting_hat::metrics::{accuracy, house_report};
use sorting_hat::model_selection::train_test_indices;
use sorting_hat::HatError;
use sorting_hat::stats;

use crate::error::{CliError, Result};

/// Options of `sorting-hat train`; unset values come from the config file
/// or the built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct TrainArgs {
    /// Labelled training dataset (CSV)
    pub(crate) data: PathBuf,

    /// TOML training configuration
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Output model file
    #[arg(short, long)]
    pub(crate) model: Option<PathBuf>,

    /// Epochs per binary classifier
    #[arg(short, long)]
    pub(crate) epochs: Option<usize>,

    /// Gradient step size
    #[arg(long)]
    pub(crate) learning_rate: Option<f64>,

    /// Gradient descent variant: batch, stochastic or mini-batch
    #[arg(long)]
    pub(crate) descent: Option<GradientDescent>,

    /// Samples per mini-batch step
    #[arg(long)]
    pub(crate) batch_size: Option<usize>,

    /// Seed for weight initialisation and shuffling
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// L1 regularization strength C
    #[arg(long)]
    pub(crate) regularization: Option<f64>,

    /// Fraction of rows held out to report generalisation accuracy
    #[arg(long)]
    pub(crate) holdout: Option<f64>,

    /// Seed for the holdout split
    #[arg(long)]
    pub(crate) split_seed: Option<u64>,

    /// Train the four classifiers one after the other
    #[arg(long)]
    pub(crate) sequential: bool,
}

impl TrainArgs {
    /// Resolves the effective configuration: file (or defaults), then flags.
    pub(crate) fn resolve(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => {
                ensure_file(path)?;
                TrainingConfig::load(path)?
            }
            None => TrainingConfig::default(),
        };

        if let Some(model) = &self.model {
            config.model_path.clone_from(model);
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }
        if let Some(descent) = self.descent {
            config.descent = DescentMode::from(descent);
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.regularization.is_some() {
            config.regularization = self.regularization;
        }
        if self.holdout.is_some() {
            config.holdout = self.holdout;
        }
        if self.split_seed.is_some() {
            config.split_seed = self.split_seed;
        }
        if self.sequential {
            config.parallel = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn ensure_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::FileNotFound(path.to_path_buf()))
    }
}

fn load_table(path: &Path) -> Result<DataFrame> {
    ensure_file(path)?;
    Ok(DataFrame::from_path(path)?)
}

fn load_model(path: &Path, label_column: &str) -> Result<OneVsAllModel> {
    ensure_file(path)?;
    Ok(OneVsAllModel::load(path)?.with_label_column(label_column))
}

fn print_confusion(y_pred: &[House], y_true: &[House]) {
    let report = house_report(y_pred, y_true);
    let width = House::ALL.iter().map(|h| h.name().len()).max().unwrap_or(0);

    println!("Confusion matrix (rows = truth, columns = prediction):");
    print!("{:width$}", "");
    for house in House::ALL {
        print!("  {:>width$}", house.name());
    }
    println!();
    for (house, row) in House::ALL.iter().zip(&report.confusion) {
        print!("{:>width$}", house.name());
        for count in row {
            print!("  {count:>width$}");
        }
        println!();
    }
}

pub(crate) fn cmd_train(args: &TrainArgs) -> Result<()> {
    let config = args.resolve()?;
    let table = load_table(&args.data)?;

    println!("Training Sorting Hat");
    println!("====================");
    println!("Dataset:       {} ({} rows)", args.data.display(), table.n_rows());
    println!("Features:      {}", config.features.len());
    println!("Descent:       {:?}", config.gradient_descent());
    println!("Learning rate: {}", config.learning_rate);
    println!("Epochs:        {}", config.epochs);
    println!();

    // Holdout rows must not reach the imputer or scaler fit.
    let (train_table, holdout_table) = match config.holdout {
        Some(test_size) => {
            let (train_rows, test_rows) =
                train_test_indices(table.n_rows(), test_size, config.split_seed)?;
            (
                table.select_rows(&train_rows)?,
                Some(table.select_rows(&test_rows)?),
            )
        }
        None => (table, None),
    };

    let mut model = OneVsAllModel::from_config(&config);
    let (x_train, labels) = model.preprocess(&train_table, true)?;
    let y_train = require_labels(&labels)?;

    model.train(&x_train, &y_train, config.epochs, config.seed)?;

    let train_pred = model.predict(&x_train)?;
    let train_acc = accuracy(&train_pred, &y_train);
    println!("Training accuracy: {:.2}%", train_acc * 100.0);
    tracing::info!(train_accuracy = train_acc, "training finished");

    if let Some(holdout_table) = holdout_table {
        let (x_test, labels) = model.preprocess(&holdout_table, false)?;
        let y_test = require_labels(&labels)?;
        let test_pred = model.predict(&x_test)?;
        let test_acc = accuracy(&test_pred, &y_test);
        println!(
            "Holdout accuracy:  {:.2}% ({} rows)",
            test_acc * 100.0,
            y_test.len()
        );
        print_confusion(&test_pred, &y_test);
    } else {
        print_confusion(&train_pred, &y_train);
    }

    model.dump(&config.model_path)?;
    println!();
    println!("Model saved to {}", config.model_path.display());
    Ok(())
}

pub(crate) fn cmd_predict(data: &Path, model_path: &Path, output: &Path) -> Result<()> {
    let mut model = load_model(model_path, sorting_hat::config::DEFAULT_LABEL_COLUMN)?;
    let table = load_table(data)?;

    let (x, _) = model.preprocess(&table, false)?;
    let predictions = model.predict(&x)?;

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record([INDEX_COLUMN, model.label_column()])?;
    for (index, house) in predictions.iter().enumerate() {
        writer.write_record([index.to_string().as_str(), house.name()])?;
    }
    writer.flush()?;

    tracing::info!(rows = predictions.len(), output = %output.display(), "predictions written");
    println!(
        "Wrote {} predictions to {}",
        predictions.len(),
        output.display()
    );
    Ok(())
}

pub(crate) fn cmd_evaluate(
    data: &Path,
    model_path: &Path,
    label_column: &str,
    json: bool,
) -> Result<()> {
    let mut model = load_model(model_path, label_column)?;
    let table = load_table(data)?;

    let (x, labels) = model.preprocess(&table, false)?;
    let y = require_labels(&labels)?;
    if y.is_empty() {
        return Err(HatError::empty_input("evaluation table has no rows").into());
    }
    let predictions = model.predict(&x)?;
    let report = house_report(&predictions, &y);
    tracing::info!(accuracy = report.accuracy, rows = report.total, "evaluation finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
        println!();
        print_confusion(&predictions, &y);
    }
    Ok(())
}

pub(crate) fn cmd_describe(data: &Path) -> Result<()> {
    let table = load_table(data)?;
    let summaries = stats::describe(&table)?;
    print!("{}", stats::format_summary_table(&summaries));
    Ok(())
}
