// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between split files and tensor batches:
//
//   split files (local dir or hub)
//       │
//       ▼
//   loader / hub      → Vec<Tweet> per split
//       │
//       ▼
//   tokenizer (infra) → token ids per tweet
//       │
//       ▼
//   sequences         → pad / truncate to maxlen
//       │
//       ▼
//   TweetDataset      → Burn Dataset of (ids, class id)
//       │
//       ▼
//   TweetBatcher      → [batch, maxlen] tensors for the model
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Parses split files in JSONL, CSV or `text;label` form
pub mod loader;

/// Downloads split files from the Hugging Face Hub
pub mod hub;

/// Carves a validation split out of the training split
pub mod splitter;

/// Pads and truncates token sequences to a fixed length
pub mod sequences;

/// Burn Dataset over encoded tweets
pub mod dataset;

/// Burn Batcher producing token/target tensors
pub mod batcher;

/// Tweet length and class distribution summaries
pub mod stats;
