// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From a sample source all the way to tensor batches:
//
//   SyntheticBlobs / CsvSampleLoader   → Vec<Sample>
//       │
//       ▼
//   split_train_val                    → (train, validation)
//       │
//       ▼
//   SampleDataset                      → burn Dataset
//       │
//       ▼
//   SampleBatcher                      → inputs [N, D], targets [N]
//       │
//       ▼
//   DataLoader                         → batches for the training loop

/// Reads labelled samples from a local CSV file
pub mod loader;

/// Seeded Gaussian clusters, no download required
pub mod synthetic;

/// Implements burn's Dataset trait for samples
pub mod dataset;

/// Implements burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
