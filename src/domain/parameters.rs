// ============================================================
// Layer 3 — Parameter Blob
// ============================================================
// Framework-free view of a network's trained values:
//
//   "hidden_layers.0.weight" → ParamTensor { shape: [784, 512], values: [...] }
//   "hidden_layers.0.bias"   → ParamTensor { shape: [512],      values: [...] }
//   ...
//
// The blob is what gets persisted. Before it is applied to a
// model, its shapes are diffed against the shapes the model
// expects; every disagreement is collected so the caller sees
// the whole picture at once.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// One named tensor: row-major f32 values plus their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamTensor {
    pub shape:  Vec<usize>,
    pub values: Vec<f32>,
}

impl ParamTensor {
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Self {
        Self { shape, values }
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// True when `values` holds exactly as many elements as `shape` describes.
    pub fn is_consistent(&self) -> bool {
        self.numel() == self.values.len()
    }

    /// Bit-level equality; unlike `==` this treats NaN payloads as data.
    #[cfg(test)]
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

/// Parameters keyed by layer name.
pub type ParameterBlob = BTreeMap<String, ParamTensor>;

// ─── ShapeMismatch ────────────────────────────────────────────────────────────
/// A single disagreement between a stored blob and a model.
///
/// `None` on one side means that side has no parameter of that name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub name:       String,
    pub checkpoint: Option<Vec<usize>>,
    pub model:      Option<Vec<usize>>,
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.checkpoint, &self.model) {
            (Some(stored), Some(expected)) => write!(
                f,
                "size mismatch for {}: copying a param with shape {:?} from checkpoint, \
                 the shape in current model is {:?}",
                self.name, stored, expected
            ),
            (None, Some(expected)) => write!(
                f,
                "missing key {}: the current model expects shape {:?}, the checkpoint has none",
                self.name, expected
            ),
            (Some(stored), None) => write!(
                f,
                "unexpected key {}: the checkpoint holds shape {:?}, the current model has no such parameter",
                self.name, stored
            ),
            (None, None) => write!(f, "unknown parameter {}", self.name),
        }
    }
}

/// Compare `blob` against the `(name, shape)` list a model expects.
///
/// Expected parameters are reported in the order given; blob entries the
/// model does not own follow, sorted by name. An empty result means every
/// expected parameter is present with an identical shape and nothing extra
/// is stored.
pub fn find_mismatches(expected: &[(String, Vec<usize>)], blob: &ParameterBlob) -> Vec<ShapeMismatch> {
    let mut mismatches: Vec<ShapeMismatch> = expected
        .iter()
        .filter_map(|(name, shape)| match blob.get(name) {
            Some(stored) if &stored.shape == shape => None,
            stored => Some(ShapeMismatch {
                name:       name.clone(),
                checkpoint: stored.map(|t| t.shape.clone()),
                model:      Some(shape.clone()),
            }),
        })
        .collect();

    mismatches.extend(
        blob.iter()
            .filter(|(name, _)| !expected.iter().any(|(n, _)| n == *name))
            .map(|(name, stored)| ShapeMismatch {
                name:       name.clone(),
                checkpoint: Some(stored.shape.clone()),
                model:      None,
            }),
    );

    mismatches
}
