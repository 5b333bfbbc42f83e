// ============================================================
// Layer 4 — Synthetic Blob Generator
// ============================================================
// Produces labelled samples without any download: one random
// centre per class, and every sample is its class centre plus
// Gaussian noise, clamped to [0, 1] so a sigmoid autoencoder
// can reproduce it.
//
// Centres depend only on `seed`; the noise also depends on
// `draw`. Two generators with the same seed but different draws
// therefore sample the same distribution independently, which
// gives a held-out evaluation set for a trained checkpoint.

use anyhow::{ensure, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::domain::{sample::Sample, traits::SampleSource};

#[derive(Debug, Clone)]
pub struct SyntheticBlobs {
    pub samples:  usize,
    pub features: usize,
    pub classes:  usize,
    /// Standard deviation of the per-feature noise
    pub spread:   f32,
    pub seed:     u64,
    pub draw:     u64,
}

impl SyntheticBlobs {
    pub fn new(samples: usize, features: usize, classes: usize, seed: u64) -> Self {
        Self { samples, features, classes, spread: 0.1, seed, draw: 0 }
    }

    pub fn with_spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_draw(mut self, draw: u64) -> Self {
        self.draw = draw;
        self
    }

    fn centres(&self) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.classes)
            .map(|_| (0..self.features).map(|_| rng.gen_range(0.1..0.9)).collect())
            .collect()
    }
}

impl SampleSource for SyntheticBlobs {
    fn load_all(&self) -> Result<Vec<Sample>> {
        ensure!(self.features > 0, "synthetic data needs at least one feature");
        ensure!(self.classes  > 0, "synthetic data needs at least one class");

        let noise = Normal::new(0.0f32, self.spread)
            .map_err(|e| anyhow::anyhow!("invalid spread {}: {e}", self.spread))?;
        let centres = self.centres();
        let mut rng = StdRng::seed_from_u64(
            self.seed.wrapping_add(self.draw.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        );

        let samples = (0..self.samples)
            .map(|i| {
                let label    = i % self.classes;
                let features = centres[label]
                    .iter()
                    .map(|&c| (c + noise.sample(&mut rng)).clamp(0.0, 1.0))
                    .collect();
                Sample::new(features, label)
            })
            .collect();

        Ok(samples)
    }

    fn describe(&self) -> String {
        format!(
            "synthetic blobs ({} samples, {} features, {} classes, seed {}, draw {})",
            self.samples, self.features, self.classes, self.seed, self.draw
        )
    }
}
