// ============================================================
// Layer 3 - Core Traits
// ============================================================
// The application layer only talks to a TweetSource. Whether
// the records come from files on disk or from the Hugging Face
// Hub is decided once, when the CLI builds the source.
//
// Implementations:
//   - LocalSource -> split files in a local directory
//   - HubSource   -> split files downloaded by dataset identifier

use anyhow::Result;

use crate::domain::tweet::{Split, Tweet};

pub trait TweetSource {
    /// Load every record of one split.
    /// Returns Ok(None) when the source does not provide that split.
    fn load_split(&self, split: Split) -> Result<Option<Vec<Tweet>>>;

    /// Short human readable description used in log lines.
    fn describe(&self) -> String;
}
