// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what the
// system works with. No burn types and no file I/O here.

// Layer widths and output head of a feed-forward network
pub mod architecture;

// Named parameter tensors and shape comparison
pub mod parameters;

// A labelled feature vector
pub mod sample;

// Abstractions other layers implement
pub mod traits;
