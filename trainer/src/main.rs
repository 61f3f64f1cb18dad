use std::{path::PathBuf, process};

use clap::Parser;
use log::info;

use machine_learning::{MlErr, Trainer, TrainingConfig};

/// Trains the body-composition regressor from a CSV file and saves the model artifact.
#[derive(Parser, Debug)]
#[command(name = "train_model", version)]
struct Args {
    /// Path to the CSV with the training data.
    #[arg(long)]
    data: PathBuf,

    /// Where to write the model artifact.
    #[arg(long)]
    out: PathBuf,

    /// Feature columns, defaults to the body-composition inputs.
    #[arg(long, num_args = 1..)]
    features: Option<Vec<String>>,

    /// Target columns, defaults to body_fat_pct, lean_mass_kg and bmr.
    #[arg(long, num_args = 1..)]
    targets: Option<Vec<String>>,

    /// Trees per target.
    #[arg(long)]
    n_estimators: Option<usize>,

    /// Seed of the forests.
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn into_config(self) -> TrainingConfig {
        let mut config = TrainingConfig::default();
        if let Some(features) = self.features {
            config = config.with_features(features);
        }
        if let Some(targets) = self.targets {
            config = config.with_targets(targets);
        }
        if let Some(n_estimators) = self.n_estimators {
            config = config.with_n_estimators(n_estimators);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn run(args: Args) -> Result<(), MlErr> {
    let data = args.data.clone();
    let out = args.out.clone();
    let config = args.into_config();

    info!(
        "training {} targets from {} features in {}",
        config.targets.len(),
        config.features.len(),
        data.display()
    );

    let report = Trainer::new(config).train_csv(&data)?;
    report.artifact.save(&out)?;

    println!("Saved model to {}", out.display());
    println!("Validation MAE: {}", report.artifact.mae_report());
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
