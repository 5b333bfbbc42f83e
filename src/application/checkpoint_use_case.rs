// ============================================================
// Layer 2 — Checkpoint inspection
// ============================================================
//   inspect — what a checkpoint file contains, without building
//             a network
//   check   — would this checkpoint load into a network with
//             these hidden widths? Lists every incompatibility.

use anyhow::{Context, Result};
use std::{fmt, path::Path};

use crate::domain::{
    architecture::{Architecture, OutputHead},
    parameters::ShapeMismatch,
};
use crate::infra::checkpoint::{load_into, read_checkpoint};
use crate::ml::{backend::CpuBackend, model::{Network, NetworkConfig}};

/// Metadata and parameter table of one checkpoint file.
#[derive(Debug, Clone)]
pub struct CheckpointSummary {
    pub architecture: Architecture,
    pub head:         OutputHead,
    pub dropout:      f64,
    pub parameters:   Vec<(String, Vec<usize>)>,
}

impl CheckpointSummary {
    pub fn parameter_count(&self) -> usize {
        self.parameters.iter().map(|(_, shape)| shape.iter().product::<usize>()).sum()
    }
}

impl fmt::Display for CheckpointSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "architecture : {}", self.architecture)?;
        writeln!(f, "head         : {}", self.head)?;
        writeln!(f, "dropout      : {}", self.dropout)?;
        writeln!(f, "parameters   : {}", self.parameter_count())?;
        for (name, shape) in &self.parameters {
            writeln!(f, "  {name:<24} {shape:?}")?;
        }
        Ok(())
    }
}

pub fn inspect(path: &Path) -> Result<CheckpointSummary> {
    let record = read_checkpoint(path)
        .with_context(|| format!("Cannot read checkpoint '{}'", path.display()))?;
    if let Err(e) = record.validate() {
        tracing::warn!("Checkpoint '{}' is inconsistent: {e}", path.display());
    }

    Ok(CheckpointSummary {
        parameters: record
            .parameters
            .iter()
            .map(|(name, tensor)| (name.clone(), tensor.shape.clone()))
            .collect(),
        architecture: record.architecture,
        head:         record.head,
        dropout:      record.dropout,
    })
}

/// Build a network from the checkpoint's input/output widths and
/// the given hidden widths, then try to load the checkpoint into
/// it. Returns every mismatch; empty means compatible.
pub fn check(path: &Path, hidden_layers: &[usize]) -> Result<Vec<ShapeMismatch>> {
    let record = read_checkpoint(path)
        .with_context(|| format!("Cannot read checkpoint '{}'", path.display()))?;

    let config = NetworkConfig::new(
        record.architecture.input_size,
        record.architecture.output_size,
        hidden_layers.to_vec(),
    )
    .with_head(record.head);
    config.validate()?;

    let network: Network<CpuBackend> = config.init(&Default::default());
    match load_into(path, network) {
        Ok(_) => Ok(Vec::new()),
        Err(e) => match e.mismatches() {
            Some(mismatches) => Ok(mismatches.to_vec()),
            None => Err(e.into()),
        },
    }
}
