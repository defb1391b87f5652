use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use bonsai_c45::{C45Config, Dataset, TreeModel};
use bonsai_io::{DataReader, DatasetReader};

#[derive(Parser)]
#[command(name = "bonsai")]
#[command(about = "C4.5 decision tree induction over UCI-style attribute files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Train a decision tree from a .names/.data file pair
    Train {
        /// Base path of the input files (extension ignored)
        #[arg(long)]
        data: PathBuf,

        /// Where to save the trained model
        #[arg(long)]
        model: Option<PathBuf>,

        /// Minimum total case weight a node must exceed to be split
        #[arg(long, default_value_t = 4.0)]
        min_split_weight: f64,

        /// Skip error-based pruning after construction
        #[arg(long)]
        no_prune: bool,

        /// Print the tree as an indented rule listing
        #[arg(long)]
        print_tree: bool,
    },

    /// Print a saved model as an indented rule listing
    Show {
        /// Path to the saved model
        #[arg(long)]
        model: PathBuf,
    },

    /// Classify a labeled .data file with a saved model
    Predict {
        /// Path to the saved model
        #[arg(long)]
        model: PathBuf,

        /// Base path of the .data file (extension ignored); the model
        /// supplies the attribute schema, so no .names file is needed
        #[arg(long)]
        data: PathBuf,
    },
}

#[derive(Serialize)]
struct TrainOutput {
    dataset: String,
    n_cases: usize,
    n_attributes: usize,
    n_classes: usize,
    min_split_weight: f64,
    pruned: bool,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    training_errors: usize,
    training_error_rate: f64,
    model_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct PredictOutput {
    dataset: String,
    n_cases: usize,
    n_errors: usize,
    error_rate: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Train {
            data,
            model,
            min_split_weight,
            no_prune,
            print_tree,
        } => {
            let dataset = DatasetReader::new(&data)
                .read()
                .context("failed to read the .names/.data pair")?;
            info!(
                name = %dataset.name(),
                n_cases = dataset.case_count(),
                "dataset loaded"
            );

            let config = C45Config::new()
                .with_min_split_weight(min_split_weight)
                .with_pruning(!no_prune);
            let tree = config.fit(&dataset).context("training failed")?;
            info!(
                n_nodes = tree.node_count(),
                depth = tree.depth(),
                "model trained"
            );

            let report = tree
                .evaluate(&dataset)
                .context("failed to evaluate the training data")?;

            if let Some(path) = &model {
                tree.save(path).context("failed to save model")?;
                info!(path = %path.display(), "model saved");
            }
            if print_tree {
                print!("{}", tree.plain_view());
            }

            let output = TrainOutput {
                dataset: dataset.name().to_string(),
                n_cases: dataset.case_count(),
                n_attributes: dataset.attribute_count(),
                n_classes: dataset.schema().class_count(),
                min_split_weight,
                pruned: !no_prune,
                n_nodes: tree.node_count(),
                n_leaves: tree.leaf_count(),
                depth: tree.depth(),
                training_errors: report.errors,
                training_error_rate: report.error_rate,
                model_path: model,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Show { model } => {
            let tree = TreeModel::load(&model).context("failed to load model")?;
            info!(
                n_nodes = tree.node_count(),
                n_leaves = tree.leaf_count(),
                "model loaded"
            );
            print!("{}", tree.plain_view());
        }

        Command::Predict { model, data } => {
            let tree = TreeModel::load(&model).context("failed to load model")?;
            let rows = DataReader::new(&data.with_extension("data"))
                .read()
                .context("failed to read the .data file")?;
            let name = data
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("dataset");
            let dataset = Dataset::new(name, tree.schema().clone(), rows)
                .context("records do not match the model's attributes")?;
            let report = tree.evaluate(&dataset).context("classification failed")?;
            info!(
                n_cases = report.cases,
                n_errors = report.errors,
                "records classified"
            );

            let output = PredictOutput {
                dataset: dataset.name().to_string(),
                n_cases: report.cases,
                n_errors: report.errors,
                error_rate: report.error_rate,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
