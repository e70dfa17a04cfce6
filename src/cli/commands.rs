// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `inspect`, and all
// their configurable flags. Data location flags are shared
// through `DataArgs` and flattened into both.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    inspect_use_case::InspectConfig, prepare::DataConfig, train_use_case::TrainConfig,
};
use crate::data::{
    hub::DEFAULT_DATASET,
    loader::{SplitFiles, DEFAULT_TEST_FILE, DEFAULT_TRAIN_FILE, DEFAULT_VALIDATION_FILE},
    sequences::{Padding, Truncating},
};
use crate::ml::early_stopping::Monitor;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the emotion classifier and evaluate it on the test split
    Train(TrainArgs),

    /// Show dataset statistics and how the tokenizer sees a tweet
    Inspect(InspectArgs),
}

/// Where the tweets come from
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Local directory with the split files. Without it the
    /// dataset is downloaded from the Hugging Face hub.
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Hub dataset id
    #[arg(long, default_value = DEFAULT_DATASET)]
    pub hub_dataset: String,

    /// Hub revision (branch, tag or commit)
    #[arg(long, default_value = "main")]
    pub revision: String,

    /// Split files, relative to --data-dir or the hub repo root.
    /// Extensions .parquet, .jsonl, .csv and .txt are read; the text
    /// formats may carry a trailing .gz.
    #[arg(long, default_value = DEFAULT_TRAIN_FILE)]
    pub train_file: String,

    #[arg(long, default_value = DEFAULT_VALIDATION_FILE)]
    pub validation_file: String,

    #[arg(long, default_value = DEFAULT_TEST_FILE)]
    pub test_file: String,

    /// Share of the training split held out when there is no validation file
    #[arg(long, default_value_t = 0.1)]
    pub validation_fraction: f64,
}

impl From<DataArgs> for DataConfig {
    fn from(a: DataArgs) -> Self {
        DataConfig {
            data_dir:            a.data_dir,
            hub_dataset:         a.hub_dataset,
            revision:            a.revision,
            files:               SplitFiles {
                train:      a.train_file,
                validation: a.validation_file,
                test:       a.test_file,
            },
            validation_fraction: a.validation_fraction,
        }
    }
}

/// All arguments for the `train` command
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// JSON file with a full training configuration. When given,
    /// it replaces every flag below except --report-dir.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for history.csv and confusion_matrix.csv
    #[arg(long)]
    pub report_dir: Option<String>,

    /// Vocabulary cap; only the most frequent words get their own id
    #[arg(long, default_value_t = 10_000)]
    pub num_words: usize,

    /// Token that stands in for out-of-vocabulary words
    #[arg(long, default_value = "<UNK>")]
    pub oov_token: String,

    /// Every tweet is padded or cut to this many tokens
    #[arg(long, default_value_t = 50)]
    pub max_len: usize,

    #[arg(long, value_enum, default_value_t = Padding::Post)]
    pub padding: Padding,

    #[arg(long, value_enum, default_value_t = Truncating::Post)]
    pub truncating: Truncating,

    /// Training fails unless the labels form exactly this many classes
    #[arg(long, default_value_t = 6)]
    pub expected_classes: usize,

    #[arg(long, default_value_t = 16)]
    pub embedding_dim: usize,

    /// Units per direction in each BiLSTM layer
    #[arg(long, default_value_t = 20)]
    pub hidden_size: usize,

    /// Upper bound on epochs; early stopping usually ends sooner
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    #[arg(long, default_value_t = 1e-7)]
    pub adam_epsilon: f32,

    /// Validation metric watched by early stopping
    #[arg(long, value_enum, default_value_t = Monitor::ValAccuracy)]
    pub monitor: Monitor,

    /// Epochs without improvement before training stops
    #[arg(long, default_value_t = 2)]
    pub patience: usize,

    /// Smallest change that counts as an improvement
    #[arg(long, default_value_t = 0.0)]
    pub min_delta: f64,

    /// Roll the model back to the best epoch when training stops
    #[arg(long)]
    pub restore_best_weights: bool,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data:                 a.data.into(),
            num_words:            a.num_words,
            oov_token:            a.oov_token,
            max_len:              a.max_len,
            padding:              a.padding,
            truncating:           a.truncating,
            expected_classes:     a.expected_classes,
            embedding_dim:        a.embedding_dim,
            hidden_size:          a.hidden_size,
            epochs:               a.epochs,
            batch_size:           a.batch_size,
            lr:                   a.lr,
            adam_epsilon:         a.adam_epsilon,
            monitor:              a.monitor,
            patience:             a.patience,
            min_delta:            a.min_delta,
            restore_best_weights: a.restore_best_weights,
            seed:                 a.seed,
            report_dir:           a.report_dir,
        }
    }
}

/// All arguments for the `inspect` command
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[arg(long, default_value_t = 10_000)]
    pub num_words: usize,

    #[arg(long, default_value = "<UNK>")]
    pub oov_token: String,

    /// Length the histogram summary compares against
    #[arg(long, default_value_t = 50)]
    pub max_len: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<InspectArgs> for InspectConfig {
    fn from(a: InspectArgs) -> Self {
        InspectConfig {
            data:      a.data.into(),
            num_words: a.num_words,
            oov_token: a.oov_token,
            max_len:   a.max_len,
            seed:      a.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["tweet-emotion", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let from_flags: TrainConfig = args.into();
        let defaults = TrainConfig::default();
        assert_eq!(from_flags.num_words, defaults.num_words);
        assert_eq!(from_flags.max_len, defaults.max_len);
        assert_eq!(from_flags.patience, defaults.patience);
        assert_eq!(from_flags.monitor, defaults.monitor);
        assert_eq!(from_flags.data.files, SplitFiles::default());
        assert_eq!(from_flags.data.hub_dataset, DEFAULT_DATASET);
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "tweet-emotion", "train",
            "--data-dir", "data/emotion",
            "--train-file", "train.txt",
            "--monitor", "val-loss",
            "--padding", "pre",
            "--restore-best-weights",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.data.data_dir.as_deref(), Some("data/emotion"));
        assert_eq!(cfg.data.files.train, "train.txt");
        assert_eq!(cfg.monitor, Monitor::ValLoss);
        assert_eq!(cfg.padding, Padding::Pre);
        assert!(cfg.restore_best_weights);
    }

    #[test]
    fn test_inspect_args() {
        let cli = Cli::try_parse_from(["tweet-emotion", "inspect", "--max-len", "30"]).unwrap();
        let Commands::Inspect(args) = cli.command else { panic!("expected inspect") };
        let cfg: InspectConfig = args.into();
        assert_eq!(cfg.max_len, 30);
        assert!(cfg.data.data_dir.is_none());
    }
}
