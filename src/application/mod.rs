// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: each use case asks the data, ml
// and infra layers to do the work and returns a result for the
// CLI to print.

// Training run: data → network → checkpoint
pub mod train_use_case;

// Measuring a saved checkpoint
pub mod evaluate_use_case;

// Inspecting and compatibility-checking checkpoint files
pub mod checkpoint_use_case;
