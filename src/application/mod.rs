// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Workflow coordination only: which data to load, in what order
// the pipeline steps run, and what gets shown to the user.
// No tensor code and no file parsing lives here.

/// Split loading and encoding shared by both use cases
pub mod prepare;

/// Full training pipeline: fit, evaluate, report
pub mod train_use_case;

/// Dataset exploration without training
pub mod inspect_use_case;
