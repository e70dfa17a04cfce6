// ============================================================
// Layer 2 - InspectUseCase
// ============================================================
// Dataset exploration without training: a sample tweet, how the
// tokenizer sees it, tweet lengths and the class balance.

use anyhow::Result;

use crate::application::prepare::{load_splits, DataConfig};
use crate::data::{
    sequences::{pad_sequence, Padding, Truncating},
    stats::{class_distribution, LengthStats},
};
use crate::domain::{labels::LabelEncoder, tweet::Tweet};
use crate::error::EmotionError;
use crate::infra::{
    report::render_histogram,
    word_tokenizer::{WordTokenizer, PAD_ID},
};

#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub data:      DataConfig,
    pub num_words: usize,
    pub oov_token: String,
    pub max_len:   usize,
    pub seed:      u64,
}

pub struct InspectUseCase {
    config: InspectConfig,
}

impl InspectUseCase {
    pub fn new(config: InspectConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        cfg.data.validate()?;

        let source = cfg.data.source()?;
        let splits = load_splits(source.as_ref(), &cfg.data, cfg.seed)?;
        println!(
            "Splits: {} train, {} validation, {} test",
            splits.train.len(),
            splits.validation.len(),
            splits.test.as_ref().map_or(0, Vec::len)
        );

        let first = splits.train.first().ok_or(EmotionError::EmptySplit("train"))?;
        print_sample(first);

        let texts: Vec<String> = splits.train.iter().map(|t| t.text.clone()).collect();
        let tokenizer = WordTokenizer::fit(&texts, cfg.num_words, &cfg.oov_token)?;
        let ids = tokenizer.encode(&first.text)?;
        println!("Token ids: {:?}", ids);
        println!(
            "Padded:    {:?}",
            pad_sequence(&ids, cfg.max_len, Padding::Post, Truncating::Post, PAD_ID)
        );
        println!(
            "Vocabulary: {} distinct words, {} ids in use (cap {})",
            tokenizer.word_index_len(),
            tokenizer.vocab_size(),
            tokenizer.num_words()
        );

        println!(
            "OOV token {:?} has id {:?}",
            cfg.oov_token,
            tokenizer.token_id(&cfg.oov_token)
        );

        print_length_histogram(&splits.train, cfg.max_len);

        let encoder = LabelEncoder::fit(splits.train.iter().map(|t| t.label.as_str()));
        println!("Classes: {:?}", encoder.classes());
        print_class_distribution(&splits.train);

        Ok(())
    }
}

pub fn print_sample(tweet: &Tweet) {
    println!("Sample tweet: {:?}", tweet.text);
    println!("Label: {}", tweet.label);
}

pub fn print_length_histogram(tweets: &[Tweet], max_len: usize) {
    let stats = LengthStats::from_tweets(tweets);
    let rows: Vec<(String, usize)> = stats
        .histogram
        .iter()
        .map(|(len, count)| (len.to_string(), *count))
        .collect();
    println!("{}", render_histogram("Tweet length (words)", &rows));
    println!(
        "Lengths: min {} / mean {:.1} / max {}; {} tweets longer than {} words get truncated",
        stats.min,
        stats.mean,
        stats.max,
        stats.longer_than(max_len),
        max_len
    );
}

pub fn print_class_distribution(tweets: &[Tweet]) {
    let rows: Vec<(String, usize)> = class_distribution(tweets).into_iter().collect();
    println!("{}", render_histogram("Tweets per class", &rows));
}
