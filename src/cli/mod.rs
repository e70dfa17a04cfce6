// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// `clap` and hands off to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`   - fits the classifier and evaluates it
//   2. `inspect` - explores the dataset without training

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InspectArgs, TrainArgs};

use crate::application::train_use_case::TrainConfig;

#[derive(Parser, Debug)]
#[command(
    name = "tweet-emotion",
    version,
    about = "Classify the emotion of tweets with a bidirectional LSTM."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case. Nothing is computed here.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Inspect(args) => run_inspect(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let config = match &args.config {
        Some(path) => {
            tracing::info!("Reading training configuration from '{}'", path.display());
            let mut config = TrainConfig::from_json_file(path)?;
            if args.report_dir.is_some() {
                config.report_dir = args.report_dir.clone();
            }
            config
        }
        None => args.into(),
    };

    match &config.data.data_dir {
        Some(dir) => tracing::info!("Starting training on tweets in: {}", dir),
        None      => tracing::info!("Starting training on hub dataset: {}", config.data.hub_dataset),
    }

    TrainUseCase::new(config).execute()?;
    println!("Training complete.");
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    InspectUseCase::new(args.into()).execute()
}
