// ============================================================
// Layer 3 — Sample Domain Type
// ============================================================
// One training example: a flat feature vector plus the class
// it belongs to. Autoencoders ignore the label and use the
// features as their own target.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Flat input vector, e.g. 784 pixel intensities in [0, 1]
    pub features: Vec<f32>,

    /// Class index in 0..num_classes
    pub label: usize,
}

impl Sample {
    pub fn new(features: Vec<f32>, label: usize) -> Self {
        Self { features, label }
    }

    /// Width of the feature vector
    pub fn dim(&self) -> usize {
        self.features.len()
    }
}
