// ============================================================
// Layer 5 - Evaluator
// ============================================================
// Runs a trained classifier over a dataset without gradients:
// average loss, accuracy and the predicted class per sample.
//
// Batches are taken in dataset order so predictions line up
// with the labels they are compared against.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::{
    batcher::TweetBatcher,
    dataset::{TweetDataset, TweetSample},
};
use crate::ml::model::{count_correct, EmotionClassifier};

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub loss:        f64,
    pub accuracy:    f64,
    /// Arg-max class per sample, in dataset order
    pub predictions: Vec<usize>,
}

pub fn evaluate<B: Backend>(
    model:      &EmotionClassifier<B>,
    dataset:    &TweetDataset,
    batch_size: usize,
    device:     &B::Device,
) -> Evaluation {
    let batcher = TweetBatcher::<B>::new(device.clone());
    let samples = dataset.samples();

    let mut loss_sum    = 0.0f64;
    let mut correct     = 0usize;
    let mut predictions = Vec::with_capacity(samples.len());

    for chunk in samples.chunks(batch_size.max(1)) {
        let batch = batcher.batch(chunk.to_vec());
        let out   = model.forward_classification(batch.tokens, batch.targets);

        // Weight by batch size so a short final batch counts proportionally
        loss_sum += out.loss.into_scalar().elem::<f64>() * chunk.len() as f64;
        correct  += count_correct(out.logits.clone(), out.targets);

        let predicted = out.logits.argmax(1).reshape([chunk.len()]);
        predictions.extend(predicted.into_data().iter::<i64>().map(|p| p as usize));
    }

    let total = samples.len();
    Evaluation {
        loss:     if total > 0 { loss_sum / total as f64 } else { f64::NAN },
        accuracy: if total > 0 { correct as f64 / total as f64 } else { 0.0 },
        predictions,
    }
}

/// Class probabilities for a single sample.
pub fn predict_one<B: Backend>(
    model:  &EmotionClassifier<B>,
    sample: &TweetSample,
    device: &B::Device,
) -> Vec<f32> {
    let batch = TweetBatcher::<B>::new(device.clone()).batch(vec![sample.clone()]);
    model
        .predict_proba(batch.tokens)
        .into_data()
        .iter::<f32>()
        .collect()
}

/// Index of the largest value; first one wins ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::EmotionClassifierConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn dataset() -> TweetDataset {
        TweetDataset::from_parts(
            vec![vec![2, 3, 0, 0], vec![4, 0, 0, 0], vec![5, 6, 7, 0], vec![1, 1, 1, 1], vec![9, 8, 0, 0]],
            vec![0, 1, 2, 1, 0],
        )
        .unwrap()
    }

    #[test]
    fn test_one_prediction_per_sample() {
        let device = Default::default();
        let model: EmotionClassifier<TestBackend> =
            EmotionClassifierConfig::new(10, 3).with_hidden_size(4).init(&device);

        // batch size 2 leaves a short final batch
        let eval = evaluate(&model, &dataset(), 2, &device);
        assert_eq!(eval.predictions.len(), 5);
        assert!(eval.predictions.iter().all(|&p| p < 3));
        assert!(eval.loss.is_finite());
        assert!((0.0..=1.0).contains(&eval.accuracy));

        let agreeing = eval.predictions.iter().zip(dataset().labels()).filter(|(p, l)| **p == *l).count();
        assert!((eval.accuracy - agreeing as f64 / 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_predict_one_matches_batch_prediction() {
        let device = Default::default();
        let model: EmotionClassifier<TestBackend> =
            EmotionClassifierConfig::new(10, 3).init(&device);
        let ds = dataset();
        let eval = evaluate(&model, &ds, 5, &device);
        let probs = predict_one(&model, &ds.samples()[2], &device);
        assert_eq!(probs.len(), 3);
        assert_eq!(argmax(&probs), Some(eval.predictions[2]));
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }
}
