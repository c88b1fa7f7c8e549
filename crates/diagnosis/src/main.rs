//! MedAssist model trainer CLI
//!
//! Trains the symptom decision tree offline and writes the frozen model
//! (`active.json` + `active.hash`) that the node serves.

use anyhow::{Context, Result};
use clap::Parser;
use medassist_diagnosis::{
    accuracy, train_model, ReferralTable, SymptomDataset, TrainingParams, TreeConfig,
};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "medassist-train")]
#[command(author = "MedAssist Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train the MedAssist symptom decision tree", long_about = None)]
struct Args {
    /// Training table: 0/1 symptom columns plus a `prognosis` column
    #[arg(short, long)]
    training: PathBuf,

    /// Optional separate testing table, evaluated after training
    #[arg(long)]
    testing: Option<PathBuf>,

    /// Referral table with header `disease,provider_name,provider_link`
    #[arg(short, long)]
    doctors: PathBuf,

    /// Treat the referral table as header-less `name,link` rows aligned
    /// with the sorted disease labels
    #[arg(long)]
    positional_doctors: bool,

    /// Output directory for model and hash
    #[arg(short, long, default_value = "models/diagnosis")]
    output: PathBuf,

    /// Share of training rows held out for evaluation
    #[arg(long, default_value = "0.25")]
    test_ratio: f64,

    /// Seed for the deterministic shuffle
    #[arg(long, default_value = "0")]
    seed: i64,

    /// Maximum tree depth (unbounded when omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Minimum samples per leaf
    #[arg(long, default_value = "1")]
    min_samples_leaf: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("MedAssist trainer v{}", env!("CARGO_PKG_VERSION"));

    info!("Loading training table from: {}", args.training.display());
    let dataset = SymptomDataset::from_csv(&args.training).context("Failed to load training table")?;
    info!(
        "Loaded {} samples with {} symptoms and {} diseases",
        dataset.len(),
        dataset.feature_count(),
        dataset.classes().len()
    );

    let referrals = if args.positional_doctors {
        ReferralTable::from_positional_csv(&args.doctors, &dataset.classes())
    } else {
        ReferralTable::from_csv(&args.doctors)
    }
    .context("Failed to load referral table")?;
    info!("Loaded {} referral records", referrals.len());

    let params = TrainingParams {
        tree: TreeConfig {
            max_depth: args.max_depth,
            min_samples_leaf: args.min_samples_leaf,
            ..TreeConfig::default()
        },
        test_ratio: args.test_ratio,
        seed: args.seed,
    };

    info!("Training configuration:");
    info!("  Test ratio: {}", params.test_ratio);
    info!("  Seed: {}", params.seed);
    info!("  Max depth: {:?}", params.tree.max_depth);
    info!("  Min samples leaf: {}", params.tree.min_samples_leaf);

    let model = train_model(&dataset, referrals, params).context("Training failed")?;

    info!(
        "Tree has {} nodes, depth {}",
        model.tree.nodes.len(),
        model.tree.depth()
    );
    match model.metadata.holdout_accuracy {
        Some(acc) => info!("Holdout accuracy: {:.2}%", acc * 100.0),
        None => warn!("No rows held out; skipping holdout evaluation"),
    }

    if let Some(testing) = &args.testing {
        let test_set = SymptomDataset::from_csv(testing)
            .context("Failed to load testing table")?
            .align_to(&model.tree.feature_names)
            .context("Testing table does not match training symptoms")?;
        let acc = accuracy(&model.tree, &test_set).context("Evaluation failed")?;
        info!(
            "Testing table accuracy: {:.2}% over {} rows",
            acc * 100.0,
            test_set.len()
        );
    }

    let (path, hash) = model.save(&args.output).context("Failed to save model")?;

    info!("Model saved to: {}", path.display());
    info!("Model hash: {}", hash);

    Ok(())
}
