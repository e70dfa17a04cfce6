// ============================================================
// Domain Errors
// ============================================================
// Failures that come from the data itself rather than from the
// filesystem or the network. Everything else travels as
// anyhow::Error with context attached at the call site.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmotionError {
    /// A label appeared in validation/test data that the encoder never saw
    #[error("unknown label '{0}' (not present in the training split)")]
    UnknownLabel(String),

    /// A class id outside the encoder's range
    #[error("class id {id} out of range for {classes} classes")]
    UnknownClassId { id: usize, classes: usize },

    /// The label set does not form the expected number of classes
    #[error("expected {expected} emotion classes, found {found}: {labels:?}")]
    ClassCount {
        expected: usize,
        found:    usize,
        labels:   Vec<String>,
    },

    /// A line of a dataset file could not be parsed
    #[error("{file}:{line}: {reason}")]
    MalformedRecord {
        file:   String,
        line:   usize,
        reason: String,
    },

    /// The source does not provide a required split at all
    #[error("split '{0}' not found in the dataset source")]
    MissingSplit(&'static str),

    /// A split was required but has no records
    #[error("split '{0}' is empty")]
    EmptySplit(&'static str),

    /// Padded sequences and class ids must pair up one to one
    #[error("{sequences} sequences but {labels} labels")]
    LengthMismatch { sequences: usize, labels: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("tokenization failed: {0}")]
    Tokenization(String),
}

impl From<tokenizers::Error> for EmotionError {
    fn from(value: tokenizers::Error) -> Self {
        EmotionError::Tokenization(value.to_string())
    }
}
