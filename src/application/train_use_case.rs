// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load train/validation/test   (Layer 4 - data)
//   Step 2: Fit the tokenizer            (Layer 6 - infra)
//   Step 3: Pad sequences                (Layer 4 - data)
//   Step 4: Encode labels                (Layer 3 - domain)
//   Step 5: Build the model              (Layer 5 - ml)
//   Step 6: Train with early stopping    (Layer 5 - ml)
//   Step 7: Plot training curves         (Layer 6 - infra)
//   Step 8: Evaluate on the test split   (Layer 5 - ml)
//   Step 9: Confusion matrix             (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::{Context, Result};
use burn::{
    module::AutodiffModule,
    prelude::{Backend, Module},
    tensor::backend::AutodiffBackend,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::prepare::{encode_split, load_splits, DataConfig};
use crate::application::inspect_use_case::{print_class_distribution, print_length_histogram, print_sample};
use crate::data::sequences::{Padding, Truncating};
use crate::domain::{labels::LabelEncoder, tweet::Tweet};
use crate::error::EmotionError;
use crate::infra::{
    metrics::{ConfusionMatrix, History, MetricsLogger},
    report::{render_confusion_matrix, render_history},
    word_tokenizer::WordTokenizer,
};
use crate::ml::{
    early_stopping::{EarlyStoppingConfig, Monitor},
    evaluator::{argmax, evaluate, predict_one},
    model::{EmotionClassifier, EmotionClassifierConfig},
    trainer::{train, TrainingSettings},
    Device, TrainBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Can be loaded from a
// JSON file with --config instead of passing flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub data:                 DataConfig,
    pub num_words:            usize,
    pub oov_token:            String,
    pub max_len:              usize,
    pub padding:              Padding,
    pub truncating:           Truncating,
    pub expected_classes:     usize,
    pub embedding_dim:        usize,
    pub hidden_size:          usize,
    pub epochs:               usize,
    pub batch_size:           usize,
    pub lr:                   f64,
    pub adam_epsilon:         f32,
    pub monitor:              Monitor,
    pub patience:             usize,
    pub min_delta:            f64,
    pub restore_best_weights: bool,
    pub seed:                 u64,
    /// Where history.csv and confusion_matrix.csv go; console only when None
    pub report_dir:           Option<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data:                 DataConfig::default(),
            num_words:            10_000,
            oov_token:            "<UNK>".to_string(),
            max_len:              50,
            padding:              Padding::Post,
            truncating:           Truncating::Post,
            expected_classes:     6,
            embedding_dim:        16,
            hidden_size:          20,
            epochs:               20,
            batch_size:           32,
            lr:                   1e-3,
            adam_epsilon:         1e-7,
            monitor:              Monitor::ValAccuracy,
            patience:             2,
            min_delta:            0.0,
            restore_best_weights: false,
            seed:                 42,
            report_dir:           None,
        }
    }
}

impl TrainConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config in '{}'", path.display()))
    }

    pub fn validate(&self) -> Result<(), EmotionError> {
        let positive = [
            ("max_len",       self.max_len),
            ("batch_size",    self.batch_size),
            ("epochs",        self.epochs),
            ("embedding_dim", self.embedding_dim),
            ("hidden_size",   self.hidden_size),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(EmotionError::InvalidConfig(format!("{name} must be positive")));
            }
        }
        if self.num_words <= 2 {
            return Err(EmotionError::InvalidConfig(
                "num_words must be greater than 2 (ids 0 and 1 are reserved)".to_string(),
            ));
        }
        if self.expected_classes < 2 {
            return Err(EmotionError::InvalidConfig("expected_classes must be at least 2".to_string()));
        }
        self.data.validate()
    }

    pub fn training_settings(&self) -> TrainingSettings {
        TrainingSettings {
            epochs:               self.epochs,
            batch_size:           self.batch_size,
            learning_rate:        self.lr,
            adam_epsilon:         self.adam_epsilon,
            seed:                 self.seed,
            early_stopping:       EarlyStoppingConfig {
                monitor:   self.monitor,
                patience:  self.patience,
                min_delta: self.min_delta,
            },
            restore_best_weights: self.restore_best_weights,
        }
    }

    pub fn model_config(&self, num_classes: usize) -> EmotionClassifierConfig {
        EmotionClassifierConfig::new(self.num_words, num_classes)
            .with_embedding_dim(self.embedding_dim)
            .with_hidden_size(self.hidden_size)
    }
}

// ─── TrainUseCase ────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

/// What a finished run produced, for callers that want more than the console.
pub struct TrainReport {
    pub history:       History,
    pub test_loss:     f64,
    pub test_accuracy: f64,
    pub confusion:     ConfusionMatrix,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline on the default WGPU device.
    pub fn execute(&self) -> Result<()> {
        let report = self.execute_on::<TrainBackend>(&Device::default())?;
        tracing::info!(
            "Finished after {} epochs: test loss {:.4}, test accuracy {:.4} ({:.4} from the confusion matrix)",
            report.history.len(),
            report.test_loss,
            report.test_accuracy,
            report.confusion.accuracy()
        );
        Ok(())
    }

    pub fn execute_on<B: AutodiffBackend>(&self, device: &B::Device) -> Result<TrainReport> {
        let cfg = &self.config;
        cfg.validate()?;
        tracing::debug!("Training configuration: {:?}", cfg);

        // ── Step 1: Load the splits ───────────────────────────────────────────
        let source = cfg.data.source()?;
        let splits = load_splits(source.as_ref(), &cfg.data, cfg.seed)?;
        let test_tweets = splits.test.ok_or(EmotionError::MissingSplit("test"))?;
        if test_tweets.is_empty() {
            return Err(EmotionError::EmptySplit("test").into());
        }
        let first = splits.train.first().ok_or(EmotionError::EmptySplit("train"))?;
        print_sample(first);

        // ── Step 2: Fit the tokenizer on training texts only ──────────────────
        let train_texts: Vec<String> = splits.train.iter().map(|t| t.text.clone()).collect();
        let tokenizer = WordTokenizer::fit(&train_texts, cfg.num_words, &cfg.oov_token)?;
        println!("First tweet as token ids: {:?}", tokenizer.encode(&first.text)?);

        // ── Step 3: Sequence lengths ──────────────────────────────────────────
        print_length_histogram(&splits.train, cfg.max_len);

        // ── Step 4: Label encoding ────────────────────────────────────────────
        let encoder = LabelEncoder::fit(splits.train.iter().map(|t| t.label.as_str()));
        encoder.ensure_class_count(cfg.expected_classes)?;
        println!("Classes: {:?}", encoder.classes());
        print_class_distribution(&splits.train);

        let encode = |tweets: &[Tweet]| {
            encode_split(tweets, &tokenizer, &encoder, cfg.max_len, cfg.padding, cfg.truncating)
        };
        let train_set = encode(&splits.train).context("Cannot encode the training split")?;
        let valid_set = encode(&splits.validation).context("Cannot encode the validation split")?;
        let test_set  = encode(&test_tweets).context("Cannot encode the test split")?;
        println!("First padded sequence: {:?}", train_set.samples()[0].token_ids);

        // ── Step 5: Build the model ───────────────────────────────────────────
        let model_cfg = cfg.model_config(encoder.len());
        let preview: EmotionClassifier<B::InnerBackend> = model_cfg.init(device);
        print_model_summary(&preview);
        drop(preview);

        // ── Step 6: Train ─────────────────────────────────────────────────────
        let logger = match &cfg.report_dir {
            Some(dir) => Some(MetricsLogger::new(dir)?),
            None      => None,
        };
        let outcome = train::<B>(
            &model_cfg,
            &cfg.training_settings(),
            train_set,
            &valid_set,
            device,
            logger.as_ref(),
        )?;
        if outcome.stopped_early {
            println!("Stopped early; best epoch was {:?}", outcome.best_epoch);
        }

        // ── Step 7: Training curves ───────────────────────────────────────────
        println!("\n{}", render_history(&outcome.history));
        if let Some(best) = outcome.history.best_by_val_accuracy() {
            println!(
                "Best val_accuracy {:.4} at epoch {}",
                best.val_accuracy, best.epoch
            );
        }
        if let Some(logger) = &logger {
            tracing::info!("Epoch history written to '{}'", logger.csv_path().display());
        }

        // ── Step 8: Evaluate on the test split ────────────────────────────────
        let model = outcome.model.valid();
        let eval  = evaluate(&model, &test_set, cfg.batch_size, device);
        println!("Test loss: {:.4} - test accuracy: {:.4}", eval.loss, eval.accuracy);

        // A look at one random test tweet
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let i = rng.gen_range(0..test_tweets.len());
        let probs = predict_one(&model, &test_set.samples()[i], device);
        let predicted = argmax(&probs).context("Model returned no probabilities")?;
        println!("\nSentence: {}", test_tweets[i].text);
        println!("Emotion: {}", encoder.decode(test_set.samples()[i].label)?);
        println!("Predicted Emotion: {}", encoder.decode(predicted)?);

        // ── Step 9: Confusion matrix over the whole test split ────────────────
        let cm = ConfusionMatrix::from_predictions(&test_set.labels(), &eval.predictions, encoder.len());
        println!("\n{}", render_confusion_matrix(&cm, encoder.classes()));

        if let Some(dir) = &cfg.report_dir {
            let path = Path::new(dir).join("confusion_matrix.csv");
            cm.write_csv(&path, encoder.classes())?;
            tracing::info!("Reports written to '{}'", dir);
        }

        Ok(TrainReport {
            history:       outcome.history,
            test_loss:     eval.loss,
            test_accuracy: eval.accuracy,
            confusion:     cm,
        })
    }
}

fn print_model_summary<B: Backend>(model: &EmotionClassifier<B>) {
    println!("Model summary");
    for (layer, params) in model.layer_summary() {
        println!("  {layer:<16} {params:>10} params");
    }
    println!("  {:<16} {:>10} params", "total", model.num_params());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::SplitFiles;
    use burn::backend::{Autodiff, NdArray};
    use std::path::PathBuf;

    type TestBackend = Autodiff<NdArray<f32>>;

    const TRAIN: &str = "\
i feel so sad and alone;sadness
i am crying all day;sadness
i feel happy today;joy
what a joyful morning;joy
i love you so much;love
my sweet darling;love
i am so angry at him;anger
this makes me furious;anger
i am scared of the dark;fear
i feel afraid tonight;fear
wow i did not expect that;surprise
i am amazed and shocked;surprise
";

    const HELD_OUT: &str = "\
i feel alone;sadness
happy and joyful;joy
i love my darling;love
so angry and furious;anger
afraid of the dark;fear
shocked and amazed;surprise
";

    fn data_dir(name: &str, with_test: bool) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tweet-emotion-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("train.txt"), TRAIN).unwrap();
        std::fs::write(dir.join("validation.txt"), HELD_OUT).unwrap();
        if with_test {
            std::fs::write(dir.join("test.txt"), HELD_OUT).unwrap();
        }
        dir
    }

    fn small_config(dir: &Path) -> TrainConfig {
        TrainConfig {
            data: DataConfig {
                data_dir: Some(dir.display().to_string()),
                files: SplitFiles {
                    train:      "train.txt".to_string(),
                    validation: "validation.txt".to_string(),
                    test:       "test.txt".to_string(),
                },
                ..Default::default()
            },
            num_words:     50,
            max_len:       6,
            embedding_dim: 4,
            hidden_size:   3,
            epochs:        2,
            batch_size:    4,
            patience:      5,
            report_dir:    Some(dir.join("reports").display().to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_writes_reports() {
        let dir = data_dir("train-e2e", true);
        let device = Default::default();
        let report = TrainUseCase::new(small_config(&dir))
            .execute_on::<TestBackend>(&device)
            .unwrap();

        assert_eq!(report.history.len(), 2);
        assert!(report.test_loss.is_finite());
        assert!((0.0..=1.0).contains(&report.test_accuracy));
        let tallied: usize = report.confusion.counts().iter().flatten().sum();
        assert_eq!(tallied, 6);

        let history = std::fs::read_to_string(dir.join("reports/history.csv")).unwrap();
        assert_eq!(history.lines().count(), 1 + report.history.len());

        let matrix = std::fs::read_to_string(dir.join("reports/confusion_matrix.csv")).unwrap();
        let lines: Vec<&str> = matrix.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].ends_with("anger,fear,joy,love,sadness,surprise"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_test_split_is_reported() {
        let dir = data_dir("train-no-test", false);
        let device = Default::default();
        let err = TrainUseCase::new(small_config(&dir))
            .execute_on::<TestBackend>(&device)
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<EmotionError>(),
            Some(EmotionError::MissingSplit("test"))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_defaults_are_valid() {
        let cfg = TrainConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_len, 50);
        assert_eq!(cfg.num_words, 10_000);
        assert_eq!(cfg.training_settings().early_stopping.patience, 2);
    }

    #[test]
    fn test_zero_max_len_rejected() {
        let cfg = TrainConfig { max_len: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(EmotionError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: TrainConfig = serde_json::from_str(r#"{"epochs": 3, "monitor": "val_loss"}"#).unwrap();
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.monitor, Monitor::ValLoss);
        assert_eq!(cfg.batch_size, 32);
        assert_eq!(cfg.data.validation_fraction, 0.1);
    }

    #[test]
    fn test_model_config_follows_settings() {
        let cfg = TrainConfig { hidden_size: 8, ..Default::default() };
        let model_cfg = cfg.model_config(6);
        assert_eq!(model_cfg.vocab_size, 10_000);
        assert_eq!(model_cfg.hidden_size, 8);
        assert_eq!(model_cfg.embedding_dim, 16);
    }
}
