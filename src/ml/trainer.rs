// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Custom train + validation loop using Burn's DataLoader and Adam.
//
// Key Burn insight:
//   - Training runs on an AutodiffBackend so gradients exist
//   - model.valid() returns the same weights on the inner backend
//     (no autodiff graph, cheaper), used for validation
//   - argmax(1) returns [batch, 1], reshaped to [batch] before
//     comparing with the targets
//
// Every epoch appends one EpochMetrics row to the History and
// feeds it to early stopping.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::TweetBatcher, dataset::TweetDataset};
use crate::infra::metrics::{EpochMetrics, History, MetricsLogger};
use crate::ml::early_stopping::{EarlyStopping, EarlyStoppingConfig, Verdict};
use crate::ml::evaluator::evaluate;
use crate::ml::model::{count_correct, EmotionClassifier, EmotionClassifierConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSettings {
    pub epochs:               usize,
    pub batch_size:           usize,
    pub learning_rate:        f64,
    pub adam_epsilon:         f32,
    pub seed:                 u64,
    pub early_stopping:       EarlyStoppingConfig,
    pub restore_best_weights: bool,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            epochs:               20,
            batch_size:           32,
            learning_rate:        1e-3,
            adam_epsilon:         1e-7,
            seed:                 42,
            early_stopping:       EarlyStoppingConfig::default(),
            restore_best_weights: false,
        }
    }
}

pub struct TrainingOutcome<B: AutodiffBackend> {
    pub model:         EmotionClassifier<B>,
    pub history:       History,
    pub stopped_early: bool,
    pub best_epoch:    Option<usize>,
}

pub fn train<B: AutodiffBackend>(
    model_cfg: &EmotionClassifierConfig,
    settings:  &TrainingSettings,
    train_set: TweetDataset,
    valid_set: &TweetDataset,
    device:    &B::Device,
    logger:    Option<&MetricsLogger>,
) -> Result<TrainingOutcome<B>> {
    B::seed(settings.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: EmotionClassifier<B> = model_cfg.init(device);
    tracing::info!(
        "Model ready: {} parameters, {} classes",
        model.num_params(),
        model_cfg.num_classes
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new()
        .with_epsilon(settings.adam_epsilon)
        .init();

    // ── Training data loader, reshuffled every epoch ──────────────────────────
    let train_size   = train_set.samples().len();
    let train_loader = DataLoaderBuilder::new(TweetBatcher::<B>::new(device.clone()))
        .batch_size(settings.batch_size)
        .shuffle(settings.seed)
        .num_workers(1)
        .build(train_set);

    let mut history       = History::new();
    let mut stopper       = EarlyStopping::new(settings.early_stopping);
    let mut best_model    = None;
    let mut stopped_early = false;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=settings.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let batch_len = batch.targets.dims()[0];
            let out = model.forward_classification(batch.tokens, batch.targets);

            loss_sum += out.loss.clone().into_scalar().elem::<f64>() * batch_len as f64;
            correct  += count_correct(out.logits.clone(), out.targets.clone());
            seen     += batch_len;

            let grads = out.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(settings.learning_rate, model, grads);
        }

        let loss     = if seen > 0 { loss_sum / seen as f64 } else { f64::NAN };
        let accuracy = if seen > 0 { correct as f64 / seen as f64 } else { 0.0 };
        debug_assert_eq!(seen, train_size);

        // ── Validation phase (inner backend, no autodiff) ─────────────────────
        let val = evaluate(&model.valid(), valid_set, settings.batch_size, device);

        let metrics = EpochMetrics::new(epoch, loss, accuracy, val.loss, val.accuracy);
        println!(
            "Epoch {:>3}/{} | loss={:.4} | accuracy={:.4} | val_loss={:.4} | val_accuracy={:.4}",
            epoch, settings.epochs, loss, accuracy, val.loss, val.accuracy,
        );
        if let Some(logger) = logger {
            logger.log(&metrics)?;
        }

        let verdict = stopper.observe(&metrics);
        history.push(metrics);

        match verdict {
            Verdict::Improved if settings.restore_best_weights => {
                best_model = Some(model.clone());
            }
            Verdict::Stop => {
                tracing::info!(
                    "Early stopping at epoch {}: {:?} has not improved on {:.4} for {} epochs",
                    epoch,
                    settings.early_stopping.monitor,
                    stopper.best().unwrap_or(f64::NAN),
                    settings.early_stopping.patience
                );
                stopped_early = true;
                break;
            }
            _ => {}
        }
    }

    if let Some(best) = best_model {
        tracing::info!("Restoring weights from epoch {:?}", stopper.best_epoch());
        model = best;
    }

    tracing::info!("Training complete after {} epochs", history.len());
    Ok(TrainingOutcome {
        model,
        history,
        stopped_early,
        best_epoch: stopper.best_epoch(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::early_stopping::Monitor;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    /// The first token alone decides the class.
    fn toy_dataset(copies: usize) -> TweetDataset {
        let mut seqs   = Vec::new();
        let mut labels = Vec::new();
        for _ in 0..copies {
            for class in 0..3u32 {
                seqs.push(vec![class + 2, 1, 0, 0, 0]);
                labels.push(class as usize);
            }
        }
        TweetDataset::from_parts(seqs, labels).unwrap()
    }

    fn model_cfg() -> EmotionClassifierConfig {
        EmotionClassifierConfig::new(8, 3).with_embedding_dim(4).with_hidden_size(4)
    }

    #[test]
    fn test_runs_all_epochs_without_early_stop() {
        let settings = TrainingSettings {
            epochs: 3,
            batch_size: 4,
            early_stopping: EarlyStoppingConfig { patience: 10, ..Default::default() },
            ..Default::default()
        };
        let device = Default::default();
        let outcome = train::<TestBackend>(&model_cfg(), &settings, toy_dataset(4), &toy_dataset(1), &device, None)
            .unwrap();

        assert_eq!(outcome.history.len(), 3);
        assert!(!outcome.stopped_early);
        for (i, m) in outcome.history.epochs.iter().enumerate() {
            assert_eq!(m.epoch, i + 1);
            assert!(m.loss.is_finite() && m.val_loss.is_finite());
            assert!((0.0..=1.0).contains(&m.accuracy));
            assert!((0.0..=1.0).contains(&m.val_accuracy));
        }
    }

    #[test]
    fn test_loss_goes_down_on_separable_data() {
        let settings = TrainingSettings {
            epochs: 15,
            batch_size: 6,
            learning_rate: 1e-2,
            early_stopping: EarlyStoppingConfig {
                monitor: Monitor::ValLoss,
                patience: 100,
                min_delta: 0.0,
            },
            ..Default::default()
        };
        let device = Default::default();
        let outcome = train::<TestBackend>(&model_cfg(), &settings, toy_dataset(8), &toy_dataset(2), &device, None)
            .unwrap();

        let epochs = &outcome.history.epochs;
        assert!(epochs[epochs.len() - 1].loss < epochs[0].loss);
    }

    #[test]
    fn test_patience_bounds_training_length() {
        // Nothing can beat a perfect first epoch once min_delta is this large
        let settings = TrainingSettings {
            epochs: 10,
            batch_size: 4,
            early_stopping: EarlyStoppingConfig {
                monitor: Monitor::ValAccuracy,
                patience: 1,
                min_delta: 2.0,
            },
            restore_best_weights: true,
            ..Default::default()
        };
        let device = Default::default();
        let outcome = train::<TestBackend>(&model_cfg(), &settings, toy_dataset(2), &toy_dataset(1), &device, None)
            .unwrap();

        assert_eq!(outcome.history.len(), 2);
        assert!(outcome.stopped_early);
        assert_eq!(outcome.best_epoch, Some(1));
    }
}
