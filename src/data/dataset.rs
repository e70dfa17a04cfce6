use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::error::EmotionError;

/// One encoded tweet: `maxlen` token ids plus its class id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetSample {
    pub token_ids: Vec<u32>,
    pub label:     usize,
}

impl TweetSample {
    pub fn new(token_ids: Vec<u32>, label: usize) -> Self {
        Self { token_ids, label }
    }
}

pub struct TweetDataset {
    samples: Vec<TweetSample>,
}

impl TweetDataset {
    /// Zip padded sequences with their class ids.
    pub fn from_parts(sequences: Vec<Vec<u32>>, labels: Vec<usize>) -> Result<Self, EmotionError> {
        if sequences.len() != labels.len() {
            return Err(EmotionError::LengthMismatch {
                sequences: sequences.len(),
                labels:    labels.len(),
            });
        }
        let samples = sequences
            .into_iter()
            .zip(labels)
            .map(|(ids, label)| TweetSample::new(ids, label))
            .collect();
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[TweetSample] { &self.samples }

    pub fn labels(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.label).collect()
    }
}

impl Dataset<TweetSample> for TweetDataset {
    fn get(&self, index: usize) -> Option<TweetSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_pairs_in_order() {
        let ds = TweetDataset::from_parts(vec![vec![2, 3, 0], vec![5, 0, 0]], vec![1, 4]).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1), Some(TweetSample::new(vec![5, 0, 0], 4)));
        assert_eq!(ds.labels(), vec![1, 4]);
        assert!(ds.get(2).is_none());
    }

    #[test]
    fn test_from_parts_rejects_unpaired_inputs() {
        let err = TweetDataset::from_parts(vec![vec![2, 0], vec![3, 0]], vec![1]);
        assert!(matches!(
            err,
            Err(EmotionError::LengthMismatch { sequences: 2, labels: 1 })
        ));
    }
}
