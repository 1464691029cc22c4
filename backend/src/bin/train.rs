//! Offline training binary.
//!
//! Fits the preprocessing pipeline and the gradient-boosted classifier on a
//! labelled CSV and writes `fire_risk_model.json` and `preprocessor.json`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin fire-risk-train -- --data data/train.csv --out-dir model/ --holdout-every 5
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use fire_risk::model::TrainingParams;
use fire_risk::training::{self, MODEL_FILE, PREPROCESSOR_FILE};

/// Train the fire-risk classifier.
#[derive(Debug, Parser)]
#[command(name = "fire-risk-train", version, about)]
struct Args {
    /// Labelled training CSV
    #[arg(long)]
    data: PathBuf,

    /// Directory receiving the model and preprocessor files
    #[arg(long, default_value = "model")]
    out_dir: PathBuf,

    /// Boosting rounds
    #[arg(long, default_value_t = 500)]
    iterations: usize,

    /// Shrinkage per round
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,

    /// Maximum tree depth
    #[arg(long, default_value_t = 6)]
    depth: u32,

    /// Hold out every n-th row for evaluation (0 disables)
    #[arg(long, default_value_t = 0)]
    holdout_every: usize,
}

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    let args = Args::parse();
    let params = TrainingParams {
        iterations: args.iterations,
        learning_rate: args.learning_rate,
        max_depth: args.depth,
        ..TrainingParams::default()
    };

    let artifacts = training::train_from_csv(&args.data, &params, args.holdout_every)
        .with_context(|| format!("training on {} failed", args.data.display()))?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    artifacts
        .save(&args.out_dir)
        .context("failed to write artifacts")?;

    info!(
        "Wrote {} and {} to {}",
        MODEL_FILE,
        PREPROCESSOR_FILE,
        args.out_dir.display()
    );
    if let Some(metrics) = artifacts.holdout {
        info!(
            "Hold-out F1 {:.4} over {} rows",
            metrics.f1, metrics.support
        );
    }
    Ok(())
}
