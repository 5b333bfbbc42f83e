//! Error types for checkpoint persistence.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{architecture::ArchitectureError, parameters::ShapeMismatch};

/// Everything that can go wrong writing, reading or applying a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Reading or writing the checkpoint file failed.
    #[error("I/O error on checkpoint '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a checkpoint this program understands.
    #[error("malformed checkpoint: {0}")]
    Format(String),

    /// A required metadata entry is absent.
    #[error("checkpoint metadata is missing '{0}'")]
    MissingMetadata(&'static str),

    /// A metadata entry is present but unparsable.
    #[error("checkpoint metadata '{key}' has invalid value '{value}'")]
    InvalidMetadata { key: &'static str, value: String },

    /// The stored architecture cannot describe a network.
    #[error("invalid architecture: {0}")]
    InvalidArchitecture(#[from] ArchitectureError),

    /// Stored parameters and model parameters disagree.
    #[error("{}", render_mismatches(.0))]
    ShapeMismatch(Vec<ShapeMismatch>),
}

impl CheckpointError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format(reason.into())
    }

    /// The individual mismatches, if this is a shape error.
    pub fn mismatches(&self) -> Option<&[ShapeMismatch]> {
        match self {
            Self::ShapeMismatch(list) => Some(list),
            _ => None,
        }
    }
}

fn render_mismatches(mismatches: &[ShapeMismatch]) -> String {
    let mut out = format!(
        "{} error(s) in loading parameters for network:",
        mismatches.len()
    );
    for m in mismatches {
        out.push_str("\n\t");
        out.push_str(&m.to_string());
    }
    out
}

pub type CheckpointResult<T> = std::result::Result<T, CheckpointError>;
