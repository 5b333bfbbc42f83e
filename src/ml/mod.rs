// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network math lives here:
//
//   model.rs      — NetworkConfig + Network: a stack of Linear
//                   layers with ReLU and dropout, and a
//                   classifier (log-softmax) or autoencoder
//                   (sigmoid) head. Also converts the weights to
//                   and from a named ParameterBlob.
//
//   trainer.rs    — Adam training loop with periodic validation
//
//   evaluator.rs  — Loss / accuracy on a data loader, and
//                   single-sample prediction
//
//   backend.rs    — ndarray (CPU) or wgpu (GPU) selection

/// Feed-forward network architecture
pub mod model;

/// Training loop with validation
pub mod trainer;

/// Evaluation and prediction
pub mod evaluator;

/// Backend aliases and selection
pub mod backend;
