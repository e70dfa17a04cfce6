// ============================================================
// Layer 6 - Word Tokenizer
// ============================================================
// Builds a word-level tokenizer from the training texts.
//
// The vocabulary is a frequency ranking of words:
//
//   id 0        <PAD>  never produced by encode, only by padding
//   id 1        <UNK>  any word outside the vocabulary
//   id 2..      words, most frequent first, ties in order of
//               first appearance
//
// Only ids below `num_words` are emitted. Rarer words share the
// <UNK> id, which keeps the embedding table at num_words rows.
//
// Text is lowercased, punctuation plus tab and newline are
// replaced by spaces, then the text is split on the space
// character only. Other whitespace such as '\r' or a
// non-breaking space stays inside the word. The same rules are
// written into the tokenizer's normalizer and pre-tokenizer so
// counting and encoding can never disagree.
//
// The tokenizer lives in memory only. It is assembled as
// HuggingFace tokenizer JSON and parsed with Tokenizer::from_str.

use std::collections::HashMap;
use std::str::FromStr;

use tokenizers::Tokenizer;

use crate::error::EmotionError;

pub const PAD_TOKEN: &str = "<PAD>";
pub const PAD_ID: u32 = 0;
pub const OOV_ID: u32 = 1;

/// Characters treated as separators, tab and newline included.
const FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// The same set as an Oniguruma character class.
const FILTER_PATTERN: &str = r##"[!"#$%&()*+,\-./:;<=>?@\[\\\]^_`{|}~\t\n]"##;

/// Lowercase, drop punctuation, split on spaces.
pub fn split_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c == ' ' || FILTERS.contains(c))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct WordTokenizer {
    tokenizer:      Tokenizer,
    num_words:      usize,
    /// Distinct words seen during fitting, including those past num_words
    word_index_len: usize,
}

impl WordTokenizer {
    /// Count words in `texts` and build the capped vocabulary.
    pub fn fit<S: AsRef<str>>(
        texts:     &[S],
        num_words: usize,
        oov_token: &str,
    ) -> Result<Self, EmotionError> {
        if num_words <= OOV_ID as usize + 1 {
            return Err(EmotionError::InvalidConfig(format!(
                "num_words must leave room for at least one word, got {num_words}"
            )));
        }

        // word -> (count, first position)
        let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
        let mut position = 0usize;
        for text in texts {
            for word in split_words(text.as_ref()) {
                let entry = freq.entry(word).or_insert((0, position));
                entry.0 += 1;
                position += 1;
            }
        }

        let mut words: Vec<(String, (usize, usize))> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        let word_index_len = words.len();

        let mut vocab = serde_json::Map::new();
        vocab.insert(PAD_TOKEN.to_string(), serde_json::json!(PAD_ID));
        vocab.insert(oov_token.to_string(), serde_json::json!(OOV_ID));

        let mut next_id = OOV_ID as usize + 1;
        for (word, _) in words {
            if next_id >= num_words {
                break;
            }
            // A text could contain the literal OOV or PAD spelling
            if vocab.contains_key(&word) {
                continue;
            }
            vocab.insert(word, serde_json::json!(next_id));
            next_id += 1;
        }

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": {
                "type": "Sequence",
                "normalizers": [
                    { "type": "Lowercase" },
                    {
                        "type": "Replace",
                        "pattern": { "Regex": FILTER_PATTERN },
                        "content": " "
                    }
                ]
            },
            "pre_tokenizer": {
                "type": "Split",
                "pattern": { "String": " " },
                "behavior": "Removed",
                "invert": false
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": oov_token
            }
        });

        let tokenizer = Tokenizer::from_str(&tokenizer_json.to_string())?;

        tracing::info!(
            "Tokenizer fitted: {} distinct words, {} kept (num_words={})",
            word_index_len,
            next_id - 2,
            num_words
        );

        Ok(Self { tokenizer, num_words, word_index_len })
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u32>, EmotionError> {
        let enc = self.tokenizer.encode(text, false)?;
        Ok(enc.get_ids().to_vec())
    }

    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<u32>>, EmotionError> {
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let encodings = self.tokenizer.encode_batch(inputs, false)?;
        Ok(encodings.iter().map(|e| e.get_ids().to_vec()).collect())
    }

    pub fn token_id(&self, word: &str) -> Option<u32> {
        self.tokenizer.token_to_id(word)
    }

    pub fn num_words(&self) -> usize {
        self.num_words
    }

    pub fn word_index_len(&self) -> usize {
        self.word_index_len
    }

    /// Size of the id space actually in use (PAD and OOV included)
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(false)
    }
}
