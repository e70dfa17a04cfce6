// ============================================================
// Layer 2 - Data Preparation
// ============================================================
// The steps shared by `train` and `inspect`:
//
//   Step 1: Pick the tweet source       (local dir or hub)
//   Step 2: Load train/validation/test  (Layer 4 - data)
//   Step 3: Encode a split              (tokenize, pad, label ids)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::TweetDataset,
    hub::{HubSource, DEFAULT_DATASET},
    loader::{LocalSource, SplitFiles},
    sequences::{pad_sequences, Padding, Truncating},
    splitter::split_train_val,
};
use crate::domain::{
    labels::LabelEncoder,
    traits::TweetSource,
    tweet::{Split, Tweet},
};
use crate::error::EmotionError;
use crate::infra::word_tokenizer::{WordTokenizer, PAD_ID};

// ─── Data Configuration ──────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Local directory with split files. When None the dataset is fetched
    /// from the hub by `hub_dataset`.
    pub data_dir:            Option<String>,
    pub hub_dataset:         String,
    pub revision:            String,
    pub files:               SplitFiles,
    /// Share of the training split used for validation when the source
    /// has no validation split of its own
    pub validation_fraction: f64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir:            None,
            hub_dataset:         DEFAULT_DATASET.to_string(),
            revision:            "main".to_string(),
            files:               SplitFiles::default(),
            validation_fraction: 0.1,
        }
    }
}

impl DataConfig {
    pub fn validate(&self) -> Result<(), EmotionError> {
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(EmotionError::InvalidConfig(format!(
                "validation_fraction must be in (0, 1), got {}",
                self.validation_fraction
            )));
        }
        Ok(())
    }

    pub fn source(&self) -> Result<Box<dyn TweetSource>> {
        match &self.data_dir {
            Some(dir) => Ok(Box::new(LocalSource::new(dir, self.files.clone()))),
            None => Ok(Box::new(HubSource::new(
                self.hub_dataset.clone(),
                self.revision.clone(),
                self.files.clone(),
            )?)),
        }
    }
}

// ─── Splits ──────────────────────────────────────────────────────────────────
pub struct Splits {
    pub train:      Vec<Tweet>,
    pub validation: Vec<Tweet>,
    pub test:       Option<Vec<Tweet>>,
}

/// Load all three splits. Validation falls back to a seeded slice of
/// the training split when the source does not provide one.
pub fn load_splits(source: &dyn TweetSource, cfg: &DataConfig, seed: u64) -> Result<Splits> {
    tracing::info!("Loading tweets from {}", source.describe());

    let train = source
        .load_split(Split::Train)
        .context("Failed to load the training split")?
        .ok_or(EmotionError::MissingSplit("train"))?;
    if train.is_empty() {
        return Err(EmotionError::EmptySplit("train").into());
    }

    let (train, validation) = match source.load_split(Split::Validation)? {
        Some(val) if !val.is_empty() => (train, val),
        _ => {
            tracing::warn!(
                "No validation split, holding out {:.0}% of the training split",
                cfg.validation_fraction * 100.0
            );
            split_train_val(train, 1.0 - cfg.validation_fraction, seed)
        }
    };
    // A small training split can round down to nothing on either side
    if train.is_empty() {
        return Err(EmotionError::EmptySplit("train").into());
    }
    if validation.is_empty() {
        return Err(EmotionError::EmptySplit("validation").into());
    }

    let test = source.load_split(Split::Test)?;

    tracing::info!(
        "Loaded {} train, {} validation, {} test tweets",
        train.len(),
        validation.len(),
        test.as_ref().map_or(0, Vec::len)
    );

    Ok(Splits { train, validation, test })
}

/// Tokenize, pad and label-encode one split.
pub fn encode_split(
    tweets:     &[Tweet],
    tokenizer:  &WordTokenizer,
    encoder:    &LabelEncoder,
    max_len:    usize,
    padding:    Padding,
    truncating: Truncating,
) -> Result<TweetDataset, EmotionError> {
    let texts: Vec<String> = tweets.iter().map(|t| t.text.clone()).collect();
    let sequences = tokenizer.encode_batch(&texts)?;
    let padded    = pad_sequences(&sequences, max_len, padding, truncating, PAD_ID);
    let labels    = encoder.encode_all(tweets.iter().map(|t| t.label.as_str()))?;
    TweetDataset::from_parts(padded, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::SplitFiles;
    use std::cell::RefCell;

    struct MemorySource {
        train:      Vec<Tweet>,
        validation: Option<Vec<Tweet>>,
        calls:      RefCell<Vec<Split>>,
    }

    impl TweetSource for MemorySource {
        fn load_split(&self, split: Split) -> Result<Option<Vec<Tweet>>> {
            self.calls.borrow_mut().push(split);
            Ok(match split {
                Split::Train      => Some(self.train.clone()),
                Split::Validation => self.validation.clone(),
                Split::Test       => None,
            })
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn tweets(n: usize) -> Vec<Tweet> {
        (0..n).map(|i| Tweet::new(format!("tweet {i}"), "joy")).collect()
    }

    #[test]
    fn test_validation_fallback_split() {
        let source = MemorySource { train: tweets(20), validation: None, calls: RefCell::default() };
        let splits = load_splits(&source, &DataConfig::default(), 3).unwrap();
        assert_eq!(splits.train.len(), 18);
        assert_eq!(splits.validation.len(), 2);
        assert!(splits.test.is_none());
        assert_eq!(*source.calls.borrow(), vec![Split::Train, Split::Validation, Split::Test]);
    }

    #[test]
    fn test_provided_validation_is_kept() {
        let source = MemorySource { train: tweets(5), validation: Some(tweets(3)), calls: RefCell::default() };
        let splits = load_splits(&source, &DataConfig::default(), 3).unwrap();
        assert_eq!(splits.train.len(), 5);
        assert_eq!(splits.validation.len(), 3);
    }

    fn load_error(source: &MemorySource, validation_fraction: f64) -> EmotionError {
        let cfg = DataConfig { validation_fraction, ..Default::default() };
        let err = load_splits(source, &cfg, 3).err().unwrap();
        err.downcast::<EmotionError>().unwrap()
    }

    #[test]
    fn test_empty_train_split_fails() {
        let source = MemorySource { train: vec![], validation: None, calls: RefCell::default() };
        assert!(matches!(load_error(&source, 0.1), EmotionError::EmptySplit("train")));
    }

    #[test]
    fn test_missing_train_split_is_not_found() {
        let source = LocalSource::new("/definitely/not/here", SplitFiles::default());
        let err = load_splits(&source, &DataConfig::default(), 3).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<EmotionError>(),
            Some(EmotionError::MissingSplit("train"))
        ));
    }

    #[test]
    fn test_holdout_cannot_empty_either_side() {
        // round(1 * 0.1) = 0 tweets left for training
        let source = MemorySource { train: tweets(1), validation: None, calls: RefCell::default() };
        assert!(matches!(load_error(&source, 0.9), EmotionError::EmptySplit("train")));

        // round(1 * 0.9) = 1 tweet for training, none held out
        let source = MemorySource { train: tweets(1), validation: None, calls: RefCell::default() };
        assert!(matches!(load_error(&source, 0.1), EmotionError::EmptySplit("validation")));
    }

    #[test]
    fn test_encode_split_has_fixed_length() {
        let train = vec![
            Tweet::new("i feel good", "joy"),
            Tweet::new("i feel awful and very very sad today", "sadness"),
        ];
        let texts: Vec<String> = train.iter().map(|t| t.text.clone()).collect();
        let tokenizer = WordTokenizer::fit(&texts, 100, "<UNK>").unwrap();
        let encoder = LabelEncoder::fit(train.iter().map(|t| t.label.as_str()));

        let ds = encode_split(&train, &tokenizer, &encoder, 5, Padding::Post, Truncating::Post).unwrap();
        assert!(ds.samples().iter().all(|s| s.token_ids.len() == 5));
        assert_eq!(ds.samples()[0].token_ids[3..], [0, 0]);
        assert_eq!(ds.labels(), vec![0, 1]);

        let unseen = vec![Tweet::new("hmm", "boredom")];
        assert!(encode_split(&unseen, &tokenizer, &encoder, 5, Padding::Post, Truncating::Post).is_err());
    }

    #[test]
    fn test_bad_validation_fraction() {
        let cfg = DataConfig { validation_fraction: 1.0, files: SplitFiles::default(), ..Default::default() };
        assert!(cfg.validate().is_err());
        assert!(DataConfig::default().validate().is_ok());
    }
}
