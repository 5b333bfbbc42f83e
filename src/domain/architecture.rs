// ============================================================
// Layer 3 — Network Architecture
// ============================================================
// The minimal description needed to rebuild a feed-forward
// network: how wide the input is, how wide every hidden layer
// is (in order), and how wide the output is.
//
//   input_size ─► hidden_layers[0] ─► ... ─► hidden_layers[n-1] ─► output_size
//
// The same description also tells us the exact name and shape
// of every parameter such a network owns. That list is what a
// checkpoint's parameter blob is compared against on load.
//
// Weight shapes follow burn's Linear layout: [d_input, d_output].

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Problems with an architecture description itself,
/// independent of any stored parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArchitectureError {
    #[error("input size must be greater than zero")]
    ZeroInput,

    #[error("output size must be greater than zero")]
    ZeroOutput,

    #[error("hidden layer {0} has zero width")]
    ZeroWidthLayer(usize),

    #[error("an autoencoder must reconstruct its input: input size {input} != output size {output}")]
    AutoencoderShape { input: usize, output: usize },

    #[error("dropout probability must be within [0, 1], got {0}")]
    InvalidDropout(f64),
}

/// Dropout probabilities outside [0, 1], and NaN, cannot build a network.
pub fn validate_dropout(prob: f64) -> Result<(), ArchitectureError> {
    if (0.0..=1.0).contains(&prob) {
        Ok(())
    } else {
        Err(ArchitectureError::InvalidDropout(prob))
    }
}

// ─── OutputHead ───────────────────────────────────────────────────────────────
/// What the last layer's activations are turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputHead {
    /// Log-probabilities over `output_size` classes.
    #[default]
    Classifier,

    /// A sigmoid reconstruction of the input vector.
    Autoencoder,
}

impl OutputHead {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Classifier  => "classifier",
            Self::Autoencoder => "autoencoder",
        }
    }
}

impl fmt::Display for OutputHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputHead {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classifier"  | "classify" => Ok(Self::Classifier),
            "autoencoder" | "ae"       => Ok(Self::Autoencoder),
            other => Err(format!(
                "unknown head '{other}' (expected 'classifier' or 'autoencoder')"
            )),
        }
    }
}

// ─── Architecture ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Architecture {
    pub input_size:    usize,
    pub output_size:   usize,
    pub hidden_layers: Vec<usize>,
}

impl Architecture {
    pub fn new(input_size: usize, output_size: usize, hidden_layers: Vec<usize>) -> Self {
        Self { input_size, output_size, hidden_layers }
    }

    /// Reject descriptions no network could be built from.
    pub fn validate(&self) -> Result<(), ArchitectureError> {
        if self.input_size == 0 {
            return Err(ArchitectureError::ZeroInput);
        }
        if self.output_size == 0 {
            return Err(ArchitectureError::ZeroOutput);
        }
        if let Some(index) = self.hidden_layers.iter().position(|&w| w == 0) {
            return Err(ArchitectureError::ZeroWidthLayer(index));
        }
        Ok(())
    }

    /// Same as [`validate`](Self::validate), plus the constraints a head adds.
    pub fn validate_for(&self, head: OutputHead) -> Result<(), ArchitectureError> {
        self.validate()?;
        if head == OutputHead::Autoencoder && self.input_size != self.output_size {
            return Err(ArchitectureError::AutoencoderShape {
                input:  self.input_size,
                output: self.output_size,
            });
        }
        Ok(())
    }

    /// Every layer width from input to output, inclusive.
    pub fn layer_widths(&self) -> Vec<usize> {
        let mut widths = Vec::with_capacity(self.hidden_layers.len() + 2);
        widths.push(self.input_size);
        widths.extend_from_slice(&self.hidden_layers);
        widths.push(self.output_size);
        widths
    }

    /// Names and shapes of every parameter, in layer order.
    pub fn parameter_shapes(&self) -> Vec<(String, Vec<usize>)> {
        let widths = self.layer_widths();
        let last   = widths.len() - 2;

        widths
            .windows(2)
            .enumerate()
            .flat_map(|(i, pair)| {
                let prefix = if i == last {
                    "output".to_string()
                } else {
                    format!("hidden_layers.{i}")
                };
                [
                    (format!("{prefix}.weight"), vec![pair[0], pair[1]]),
                    (format!("{prefix}.bias"),   vec![pair[1]]),
                ]
            })
            .collect()
    }

    /// Total number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.layer_widths()
            .windows(2)
            .map(|pair| pair[0] * pair[1] + pair[1])
            .sum()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {:?} -> {}", self.input_size, self.hidden_layers, self.output_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_widths() {
        let arch = Architecture::new(784, 10, vec![512, 256, 128]);
        assert_eq!(arch.layer_widths(), vec![784, 512, 256, 128, 10]);
    }

    #[test]
    fn test_parameter_shapes_are_ordered() {
        let arch   = Architecture::new(4, 3, vec![8, 6]);
        let shapes = arch.parameter_shapes();
        let names: Vec<&str> = shapes.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "hidden_layers.0.weight", "hidden_layers.0.bias",
                "hidden_layers.1.weight", "hidden_layers.1.bias",
                "output.weight", "output.bias",
            ]
        );
        assert_eq!(shapes[0].1, vec![4, 8]);
        assert_eq!(shapes[2].1, vec![8, 6]);
        assert_eq!(shapes[4].1, vec![6, 3]);
        assert_eq!(shapes[5].1, vec![3]);
    }

    #[test]
    fn test_no_hidden_layers() {
        let arch = Architecture::new(5, 2, Vec::new());
        assert!(arch.validate().is_ok());
        let shapes = arch.parameter_shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0], ("output.weight".to_string(), vec![5, 2]));
    }

    #[test]
    fn test_parameter_count() {
        // (4*8 + 8) + (8*3 + 3)
        let arch = Architecture::new(4, 3, vec![8]);
        assert_eq!(arch.parameter_count(), 40 + 27);
    }

    #[test]
    fn test_validate_rejects_zero_widths() {
        assert_eq!(
            Architecture::new(0, 2, vec![3]).validate(),
            Err(ArchitectureError::ZeroInput)
        );
        assert_eq!(
            Architecture::new(2, 0, vec![3]).validate(),
            Err(ArchitectureError::ZeroOutput)
        );
        assert_eq!(
            Architecture::new(2, 2, vec![3, 0]).validate(),
            Err(ArchitectureError::ZeroWidthLayer(1))
        );
    }

    #[test]
    fn test_autoencoder_needs_matching_sizes() {
        let arch = Architecture::new(16, 10, vec![8]);
        assert!(arch.validate_for(OutputHead::Classifier).is_ok());
        assert_eq!(
            arch.validate_for(OutputHead::Autoencoder),
            Err(ArchitectureError::AutoencoderShape { input: 16, output: 10 })
        );
    }

    #[test]
    fn test_validate_dropout_range() {
        assert!(validate_dropout(0.0).is_ok());
        assert!(validate_dropout(1.0).is_ok());
        assert_eq!(validate_dropout(1.5), Err(ArchitectureError::InvalidDropout(1.5)));
        assert!(validate_dropout(-0.1).is_err());
        assert!(validate_dropout(f64::NAN).is_err());
    }

    #[test]
    fn test_head_from_str() {
        assert_eq!("classifier".parse::<OutputHead>(), Ok(OutputHead::Classifier));
        assert_eq!("Autoencoder".parse::<OutputHead>(), Ok(OutputHead::Autoencoder));
        assert!("gan".parse::<OutputHead>().is_err());
    }

    #[test]
    fn test_display() {
        let arch = Architecture::new(784, 10, vec![400, 200]);
        assert_eq!(arch.to_string(), "784 -> [400, 200] -> 10");
    }
}
