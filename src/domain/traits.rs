// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for samples without caring where
// they come from. Implementations:
//   - SyntheticBlobs   → seeded Gaussian clusters
//   - CsvSampleLoader  → a local `label,f1,...,fn` file

use anyhow::Result;
use crate::domain::sample::Sample;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any component that can produce a list of labelled samples.
pub trait SampleSource {
    /// Load every available sample.
    fn load_all(&self) -> Result<Vec<Sample>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}
