// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All the neural network code lives here:
//
//   model.rs          - Embedding → BiLSTM → BiLSTM → Linear
//   trainer.rs        - epoch loop with Adam and validation
//   early_stopping.rs - stop once val_accuracy stops improving
//   evaluator.rs      - loss, accuracy and predictions on a split
//
// The code is generic over the Burn backend. The binary trains
// on WGPU; the unit tests use the NdArray CPU backend.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Hochreiter & Schmidhuber (1997) LSTM

/// Bidirectional LSTM emotion classifier
pub mod model;

/// Training loop with validation each epoch
pub mod trainer;

/// Patience based early stopping
pub mod early_stopping;

/// Evaluation and single sample prediction
pub mod evaluator;

/// Backend used for training (gradients enabled)
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

pub type Device = burn::backend::wgpu::WgpuDevice;
