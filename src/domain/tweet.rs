// ============================================================
// Layer 3 - Tweet Domain Type
// ============================================================
// One labelled post as it comes out of the dataset: the raw
// text and its emotion name, both untouched. Cleaning happens
// later inside the tokenizer, never here.

use serde::{Deserialize, Serialize};

/// Canonical class order used by the published hub copy of the
/// dataset, where labels are stored as integers.
pub const EMOTION_NAMES: [&str; 6] = ["sadness", "joy", "love", "anger", "fear", "surprise"];

/// A raw labelled tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub text:  String,
    pub label: String,
}

impl Tweet {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text:  text.into(),
            label: label.into(),
        }
    }

    /// Number of words when splitting on single spaces.
    /// Consecutive spaces count as empty words, same as `str.split(" ")`.
    pub fn word_count(&self) -> usize {
        self.text.split(' ').count()
    }
}

/// Resolve an integer label to its emotion name.
pub fn emotion_name(id: usize) -> Option<&'static str> {
    EMOTION_NAMES.get(id).copied()
}

/// The three dataset partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    pub fn name(&self) -> &'static str {
        match self {
            Split::Train      => "train",
            Split::Validation => "validation",
            Split::Test       => "test",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_splits_on_single_spaces() {
        assert_eq!(Tweet::new("i feel great", "joy").word_count(), 3);
        assert_eq!(Tweet::new("a  b", "joy").word_count(), 3);
    }

    #[test]
    fn test_emotion_name_lookup() {
        assert_eq!(emotion_name(0), Some("sadness"));
        assert_eq!(emotion_name(5), Some("surprise"));
        assert_eq!(emotion_name(6), None);
    }
}
