// ============================================================
// Layer 4 - Tweet Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<TweetSample>
// into tensors the classifier can consume.
//
//   Input:  N samples, each with maxlen token ids
//   Output: tokens  [N, maxlen]  (Int)
//           targets [N]          (Int)
//
// Samples are already padded, so stacking is a flatten followed
// by a reshape.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::TweetSample;

#[derive(Debug, Clone)]
pub struct TweetBatch<B: Backend> {
    /// Token ids, shape [batch_size, maxlen]
    pub tokens: Tensor<B, 2, Int>,

    /// Class ids, shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct TweetBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TweetBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TweetSample, TweetBatch<B>> for TweetBatcher<B> {
    fn batch(&self, items: Vec<TweetSample>) -> TweetBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|s| s.token_ids.len()).unwrap_or(0);

        // Burn Int tensors are built from i32 here and converted by the backend
        let tokens_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.token_ids.iter().map(|&id| id as i32))
            .collect();

        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let tokens = Tensor::<B, 1, Int>::from_ints(tokens_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        TweetBatch { tokens, targets }
    }
}
