// ============================================================
// Layer 6 — Checkpoint Record
// ============================================================
// In-memory form of a checkpoint and its on-disk encoding.
//
//   CheckpointRecord
//     architecture  { input_size, output_size, hidden_layers }
//     head          classifier | autoencoder
//     dropout       training-time probability (informational)
//     parameters    "hidden_layers.0.weight" → [784, 512] f32 ...
//
// Encoding is a single safetensors buffer. Parameters become F32
// little-endian tensors; architecture and head are stored as
// strings in the `__metadata__` header:
//
//   format          = "ffn-checkpoint"
//   format_version  = "1"
//   input_size      = "784"
//   output_size     = "10"
//   hidden_layers   = "[512,256,128]"
//   head            = "classifier"
//   dropout         = "0.5"

use safetensors::{tensor::TensorView, Dtype, SafeTensors};
use std::collections::HashMap;

use burn::prelude::Backend;

use crate::domain::{
    architecture::{validate_dropout, Architecture, OutputHead},
    parameters::{find_mismatches, ParamTensor, ParameterBlob},
};
use crate::infra::error::{CheckpointError, CheckpointResult};
use crate::ml::model::{Network, NetworkConfig};

const FORMAT_NAME:    &str = "ffn-checkpoint";
const FORMAT_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointRecord {
    pub architecture: Architecture,
    pub head:         OutputHead,
    pub dropout:      f64,
    pub parameters:   ParameterBlob,
}

impl CheckpointRecord {
    /// Snapshot a network's architecture and current weights.
    pub fn from_network<B: Backend>(network: &Network<B>) -> Self {
        Self {
            architecture: network.architecture(),
            head:         network.head(),
            dropout:      network.dropout_prob(),
            parameters:   network.state_dict(),
        }
    }

    /// Config that rebuilds a network of the stored shape.
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig::from_architecture(&self.architecture, self.head).with_dropout(self.dropout)
    }

    /// The stored hidden-layer widths must be exactly the widths that
    /// produced the stored parameters.
    pub fn validate(&self) -> CheckpointResult<()> {
        self.architecture.validate_for(self.head)?;
        if validate_dropout(self.dropout).is_err() {
            return Err(CheckpointError::InvalidMetadata {
                key:   "dropout",
                value: self.dropout.to_string(),
            });
        }

        let mismatches = find_mismatches(&self.architecture.parameter_shapes(), &self.parameters);
        if !mismatches.is_empty() {
            return Err(CheckpointError::ShapeMismatch(mismatches));
        }
        if let Some((name, _)) = self.parameters.iter().find(|(_, t)| !t.is_consistent()) {
            return Err(CheckpointError::format(format!(
                "parameter '{name}' holds a different number of values than its shape implies"
            )));
        }
        Ok(())
    }

    /// Encode as a safetensors buffer.
    pub fn to_bytes(&self) -> CheckpointResult<Vec<u8>> {
        let raw: Vec<(&String, &ParamTensor, Vec<u8>)> = self
            .parameters
            .iter()
            .map(|(name, tensor)| {
                let bytes = tensor.values.iter().flat_map(|v| v.to_le_bytes()).collect();
                (name, tensor, bytes)
            })
            .collect();

        let views = raw
            .iter()
            .map(|(name, tensor, bytes)| {
                TensorView::new(Dtype::F32, tensor.shape.clone(), bytes)
                    .map(|view| (name.as_str(), view))
                    .map_err(|e| CheckpointError::format(format!("parameter '{name}': {e}")))
            })
            .collect::<CheckpointResult<Vec<_>>>()?;

        safetensors::serialize(views, &Some(self.metadata()?))
            .map_err(|e| CheckpointError::format(e.to_string()))
    }

    /// Decode a safetensors buffer written by [`to_bytes`](Self::to_bytes).
    ///
    /// Only decodes; call [`validate`](Self::validate) to check the
    /// parameters against the stored architecture.
    pub fn from_bytes(bytes: &[u8]) -> CheckpointResult<Self> {
        let (_, header) = SafeTensors::read_metadata(bytes)
            .map_err(|e| CheckpointError::format(e.to_string()))?;
        let meta = header
            .metadata()
            .clone()
            .ok_or(CheckpointError::MissingMetadata("__metadata__"))?;

        let format = required(&meta, "format")?;
        if format != FORMAT_NAME {
            return Err(CheckpointError::InvalidMetadata { key: "format", value: format.to_string() });
        }
        let version = required(&meta, "format_version")?;
        if version != FORMAT_VERSION {
            return Err(CheckpointError::InvalidMetadata {
                key:   "format_version",
                value: version.to_string(),
            });
        }

        let input_size:  usize = parse_meta(&meta, "input_size", |s| s.parse().ok())?;
        let output_size: usize = parse_meta(&meta, "output_size", |s| s.parse().ok())?;
        let hidden_layers: Vec<usize> =
            parse_meta(&meta, "hidden_layers", |s| serde_json::from_str(s).ok())?;
        let head: OutputHead = match meta.get("head") {
            Some(value) => value.parse().map_err(|_| CheckpointError::InvalidMetadata {
                key:   "head",
                value: value.clone(),
            })?,
            None => OutputHead::Classifier,
        };
        let dropout: f64 = match meta.get("dropout") {
            Some(value) => value
                .parse::<f64>()
                .ok()
                .filter(|&p| validate_dropout(p).is_ok())
                .ok_or_else(|| CheckpointError::InvalidMetadata {
                    key:   "dropout",
                    value: value.clone(),
                })?,
            None => 0.0,
        };

        let tensors = SafeTensors::deserialize(bytes)
            .map_err(|e| CheckpointError::format(e.to_string()))?;

        let mut parameters = ParameterBlob::new();
        for (name, view) in tensors.tensors() {
            if view.dtype() != Dtype::F32 {
                return Err(CheckpointError::format(format!(
                    "parameter '{name}' has dtype {:?}, expected F32",
                    view.dtype()
                )));
            }
            let values = view
                .data()
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
            parameters.insert(name, ParamTensor::new(view.shape().to_vec(), values));
        }

        Ok(Self {
            architecture: Architecture::new(input_size, output_size, hidden_layers),
            head,
            dropout,
            parameters,
        })
    }

    fn metadata(&self) -> CheckpointResult<HashMap<String, String>> {
        let hidden = serde_json::to_string(&self.architecture.hidden_layers)
            .map_err(|e| CheckpointError::format(format!("hidden_layers: {e}")))?;

        Ok(HashMap::from([
            ("format".to_string(),         FORMAT_NAME.to_string()),
            ("format_version".to_string(), FORMAT_VERSION.to_string()),
            ("input_size".to_string(),     self.architecture.input_size.to_string()),
            ("output_size".to_string(),    self.architecture.output_size.to_string()),
            ("hidden_layers".to_string(),  hidden),
            ("head".to_string(),           self.head.name().to_string()),
            ("dropout".to_string(),        self.dropout.to_string()),
        ]))
    }
}

fn required<'a>(meta: &'a HashMap<String, String>, key: &'static str) -> CheckpointResult<&'a str> {
    meta.get(key)
        .map(String::as_str)
        .ok_or(CheckpointError::MissingMetadata(key))
}

fn parse_meta<T>(
    meta:  &HashMap<String, String>,
    key:   &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> CheckpointResult<T> {
    let raw = required(meta, key)?;
    parse(raw).ok_or_else(|| CheckpointError::InvalidMetadata { key, value: raw.to_string() })
}
