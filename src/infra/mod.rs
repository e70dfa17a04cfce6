// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting pieces used by several layers:
//
//   word_tokenizer.rs - frequency ranked word vocabulary built
//                       on the `tokenizers` crate, in memory
//
//   metrics.rs        - per-epoch history, confusion matrix and
//                       the optional CSV history logger
//
//   report.rs         - text renderings of curves, histograms
//                       and the confusion matrix

/// Word level tokenizer fitted on the training split
pub mod word_tokenizer;

/// Training history, confusion matrix, CSV logger
pub mod metrics;

/// Console renderings of metrics
pub mod report;
