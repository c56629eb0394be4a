//! CLI entry point for dataset profiling and regression training.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use regviz_learning::{
    ModelComparisonEntry, RegressionConfig, RegressionResponse, RegressionService,
};
use regviz_processing::profiler::DEFAULT_PREVIEW_ROWS;
use regviz_processing::{DataProfiler, load_csv, parse_feature_list};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Automated regression model comparison",
    long_about = "Profile a CSV dataset, then train and compare five regression models \
                  for a chosen target column.\n\n\
                  EXAMPLES:\n  \
                  # Look at the data first\n  \
                  regviz preview -i houses.csv\n  \
                  regviz recommend -i houses.csv\n\n  \
                  # Train with mean imputation and save the plot trace\n  \
                  regviz train -i houses.csv -t price -f age,rooms,city \
                  --null-strategy mean --plot-out plot.json\n\n  \
                  # Machine-readable output only\n  \
                  regviz train -i houses.csv -t price -f age,city --json | jq .best_model"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs so stdout only holds the JSON document.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the first rows, column types and null counts
    Preview {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Number of rows to show
        #[arg(short, long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        rows: usize,
    },

    /// Summary statistics and correlations
    Eda {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Suggest a target column and features
    Recommend {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Train, compare and save regression models
    Train {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Numeric column to predict
        #[arg(short, long)]
        target: String,

        /// Comma-separated feature columns
        #[arg(short, long)]
        features: String,

        /// How to handle missing values: drop, mean or auto
        #[arg(long)]
        null_strategy: Option<String>,

        /// Fraction of rows held out for testing
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,

        /// Seed for the train/test split
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Directory for saved models
        #[arg(long, default_value = regviz_learning::DEFAULT_MODEL_DIR)]
        model_dir: PathBuf,

        /// Write the selected model's actual-vs-predicted trace to this file
        #[arg(long)]
        plot_out: Option<PathBuf>,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    match &args.command {
        Command::Preview { input, rows } => {
            let df = load(input)?;
            let report = DataProfiler::preview(&df, &file_name(input), *rows)?;
            print_json(&report)
        }
        Command::Eda { input } => {
            let df = load(input)?;
            print_json(&DataProfiler::eda(&df)?)
        }
        Command::Recommend { input } => {
            let df = load(input)?;
            print_json(&DataProfiler::recommend(&df)?)
        }
        Command::Train {
            input,
            target,
            features,
            null_strategy,
            test_size,
            seed,
            model_dir,
            plot_out,
        } => {
            let df = load(input)?;
            let config = RegressionConfig::builder()
                .test_size(*test_size)
                .random_seed(*seed)
                .model_dir(model_dir)
                .build()?;

            let mut builder = RegressionService::builder().config(config);
            if !args.quiet && !args.json {
                builder = builder.on_progress(|update| {
                    info!(
                        "[{:.0}%] {}: {}",
                        update.progress * 100.0,
                        update.stage,
                        update.message
                    );
                });
            }
            let service = builder.build()?;

            let features = parse_feature_list(features);
            let run = service
                .run(&df, target, &features, null_strategy.as_deref())
                .map_err(|e| {
                    error!("Training failed: {}", e);
                    anyhow!("Training failed: {e}")
                })?;

            if let Some(path) = plot_out {
                let trace = service.latest_plot()?;
                std::fs::write(path, serde_json::to_vec_pretty(&trace)?)
                    .with_context(|| format!("writing plot trace to {}", path.display()))?;
                info!("Plot trace written to {}", path.display());
            }

            if args.json {
                print_json(&run.response)
            } else {
                print_summary(&run.response);
                Ok(())
            }
        }
    }
}

fn load(input: &Path) -> Result<polars::prelude::DataFrame> {
    info!("Loading dataset from: {}", input.display());
    let df = load_csv(input).with_context(|| format!("loading {}", input.display()))?;
    info!("Dataset loaded successfully: {:?}", df.shape());
    Ok(df)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human-readable result table.
///
/// Uses `println!` on purpose: this is the command's output, not a log line.
fn print_summary(response: &RegressionResponse) {
    println!("\n{}", "=".repeat(72));
    println!("MODEL COMPARISON");
    println!("{}", "-".repeat(72));
    println!(
        "{:<24} {:>12} {:>12} {:>14}",
        "Model", "Train R2", "Test R2", "Test MSE"
    );
    println!("{}", "-".repeat(72));

    for (name, entry) in &response.model_comparison {
        let marker = if *name == response.best_model { "*" } else { " " };
        match entry {
            ModelComparisonEntry::Scored(m) => println!(
                "{}{:<23} {:>12} {:>12} {:>14}",
                marker,
                name,
                fmt_metric(m.train_r2),
                fmt_metric(m.test_r2),
                fmt_metric(m.test_mse)
            ),
            ModelComparisonEntry::Failed { error } => {
                println!("{}{:<23} failed: {}", marker, name, error)
            }
        }
    }

    let info = &response.data_info;
    println!("{}", "-".repeat(72));
    println!("Best model:       {}", response.best_model);
    println!(
        "Rows:             {} ({} train / {} test), null strategy '{}'",
        info.rows, info.train_rows, info.test_rows, info.null_strategy
    );
    println!(
        "Numeric:          {}",
        response.feature_engineering.numeric.join(", ")
    );
    println!(
        "Categorical:      {}",
        response.feature_engineering.categorical.join(", ")
    );
    println!("Saved model:      {}", response.saved_model_filename);
    println!("{}", "=".repeat(72));
}

fn fmt_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}
