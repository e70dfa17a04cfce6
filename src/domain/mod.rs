// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types describing the problem: a tweet with its
// emotion label, the dataset splits, and the mapping between
// emotion names and class ids.
//
// Nothing in here touches burn, the filesystem or the network,
// so all of it is testable without a GPU.

/// A labelled tweet and the dataset splits
pub mod tweet;

/// Bijection between emotion names and class ids
pub mod labels;

/// Abstraction over where tweets come from
pub mod traits;
