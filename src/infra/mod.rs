// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// other layers:
//
//   error.rs       — CheckpointError, the typed failure modes of
//                    reading and writing checkpoints
//
//   record.rs      — CheckpointRecord: architecture + weights and
//                    their safetensors encoding
//
//   checkpoint.rs  — Atomic save, load, load-into-existing, and
//                    the per-run CheckpointManager that also keeps
//                    the TrainConfig as JSON
//
//   metrics.rs     — Per-epoch CSV log of losses and accuracy

/// Typed checkpoint errors
pub mod error;

/// On-disk checkpoint encoding
pub mod record;

/// Saving and loading networks
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
