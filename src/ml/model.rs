// ============================================================
// Layer 5 — Feed-Forward Network
// ============================================================
//   input ─► [Linear ─► ReLU ─► Dropout] × n ─► Linear ─► head
//
// head = log_softmax for classifiers, sigmoid for autoencoders.
//
// Besides the forward pass, the network can export its weights
// as a framework-free ParameterBlob and re-import one. Import
// diffs every shape first and applies nothing unless all match.

use burn::{
    module::Param,
    nn::{
        loss::{CrossEntropyLossConfig, MseLoss, Reduction},
        Dropout, DropoutConfig, Linear, LinearConfig,
    },
    prelude::*,
    tensor::{
        activation::{log_softmax, relu, sigmoid},
        TensorData,
    },
};

use crate::domain::{
    architecture::{validate_dropout, Architecture, ArchitectureError, OutputHead},
    parameters::{find_mismatches, ParamTensor, ParameterBlob},
};
use crate::infra::error::{CheckpointError, CheckpointResult};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct NetworkConfig {
    pub input_size:    usize,
    pub output_size:   usize,
    pub hidden_layers: Vec<usize>,
    #[config(default = 0.5)]
    pub dropout:       f64,
    #[config(default = "OutputHead::Classifier")]
    pub head:          OutputHead,
}

impl NetworkConfig {
    pub fn from_architecture(arch: &Architecture, head: OutputHead) -> Self {
        Self::new(arch.input_size, arch.output_size, arch.hidden_layers.clone()).with_head(head)
    }

    pub fn architecture(&self) -> Architecture {
        Architecture::new(self.input_size, self.output_size, self.hidden_layers.clone())
    }

    pub fn validate(&self) -> Result<(), ArchitectureError> {
        self.architecture().validate_for(self.head)?;
        validate_dropout(self.dropout)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Network<B> {
        let mut fan_in = self.input_size;
        let hidden_layers: Vec<Linear<B>> = self
            .hidden_layers
            .iter()
            .map(|&width| {
                let layer = LinearConfig::new(fan_in, width).init(device);
                fan_in = width;
                layer
            })
            .collect();
        let output  = LinearConfig::new(fan_in, self.output_size).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();

        Network {
            hidden_layers,
            output,
            dropout,
            autoencoder: self.head == OutputHead::Autoencoder,
        }
    }
}

#[derive(Module, Debug)]
pub struct Network<B: Backend> {
    pub hidden_layers: Vec<Linear<B>>,
    pub output:        Linear<B>,
    pub dropout:       Dropout,
    pub autoencoder:   bool,
}

impl<B: Backend> Network<B> {
    pub fn head(&self) -> OutputHead {
        if self.autoencoder { OutputHead::Autoencoder } else { OutputHead::Classifier }
    }

    /// Output-layer activations before the head is applied: [batch, output_size]
    pub fn forward_logits(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for layer in &self.hidden_layers {
            x = self.dropout.forward(relu(layer.forward(x)));
        }
        self.output.forward(x)
    }

    /// input: [batch, input_size] → log-probabilities or reconstruction
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let logits = self.forward_logits(input);
        match self.head() {
            OutputHead::Classifier  => log_softmax(logits, 1),
            OutputHead::Autoencoder => sigmoid(logits),
        }
    }

    /// Mean loss over the batch, plus the head output.
    ///
    /// Classifier: cross entropy against `targets` (NLL of the log-softmax).
    /// Autoencoder: MSE between the reconstruction and `inputs`; `targets` unused.
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 2>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        match self.head() {
            OutputHead::Classifier => {
                let logits = self.forward_logits(inputs);
                let ce = CrossEntropyLossConfig::new().init(&logits.device());
                let loss = ce.forward(logits.clone(), targets);
                (loss, log_softmax(logits, 1))
            }
            OutputHead::Autoencoder => {
                let reconstruction = sigmoid(self.forward_logits(inputs.clone()));
                let loss = MseLoss::new().forward(reconstruction.clone(), inputs, Reduction::Mean);
                (loss, reconstruction)
            }
        }
    }

    /// Rebuild the architecture description from the actual layer shapes.
    pub fn architecture(&self) -> Architecture {
        let [output_in, output_size] = self.output.weight.val().dims();
        let input_size = self
            .hidden_layers
            .first()
            .map(|layer| layer.weight.val().dims()[0])
            .unwrap_or(output_in);
        let hidden_layers = self
            .hidden_layers
            .iter()
            .map(|layer| layer.weight.val().dims()[1])
            .collect();
        Architecture::new(input_size, output_size, hidden_layers)
    }

    pub fn dropout_prob(&self) -> f64 {
        self.dropout.prob
    }

    /// Names and shapes of the parameters this instance owns.
    pub fn parameter_shapes(&self) -> Vec<(String, Vec<usize>)> {
        self.named_layers()
            .into_iter()
            .flat_map(|(prefix, layer)| {
                let mut shapes = vec![(format!("{prefix}.weight"), layer.weight.val().dims().to_vec())];
                if let Some(bias) = &layer.bias {
                    shapes.push((format!("{prefix}.bias"), bias.val().dims().to_vec()));
                }
                shapes
            })
            .collect()
    }

    /// Export every weight and bias, keyed by layer name.
    pub fn state_dict(&self) -> ParameterBlob {
        let mut blob = ParameterBlob::new();
        for (prefix, layer) in self.named_layers() {
            blob.insert(format!("{prefix}.weight"), to_param_tensor(layer.weight.val()));
            if let Some(bias) = &layer.bias {
                blob.insert(format!("{prefix}.bias"), to_param_tensor(bias.val()));
            }
        }
        blob
    }

    /// Replace every weight and bias with the values in `blob`.
    ///
    /// Fails with [`CheckpointError::ShapeMismatch`] listing every offending
    /// parameter if the blob does not fit this network exactly; `self` is
    /// consumed either way and nothing partial is returned.
    pub fn load_state_dict(mut self, blob: &ParameterBlob) -> CheckpointResult<Self> {
        let mismatches = find_mismatches(&self.parameter_shapes(), blob);
        if !mismatches.is_empty() {
            return Err(CheckpointError::ShapeMismatch(mismatches));
        }
        if let Some((name, _)) = blob.iter().find(|(_, t)| !t.is_consistent()) {
            return Err(CheckpointError::format(format!(
                "parameter '{name}' holds a different number of values than its shape implies"
            )));
        }

        let device = self.output.weight.val().device();
        for (i, layer) in self.hidden_layers.iter_mut().enumerate() {
            apply_linear(layer, &format!("hidden_layers.{i}"), blob, &device)?;
        }
        apply_linear(&mut self.output, "output", blob, &device)?;

        Ok(self)
    }

    fn named_layers(&self) -> Vec<(String, &Linear<B>)> {
        self.hidden_layers
            .iter()
            .enumerate()
            .map(|(i, layer)| (format!("hidden_layers.{i}"), layer))
            .chain(std::iter::once(("output".to_string(), &self.output)))
            .collect()
    }
}

fn to_param_tensor<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> ParamTensor {
    let shape  = tensor.dims().to_vec();
    let values = tensor.into_data().iter::<f32>().collect();
    ParamTensor::new(shape, values)
}

fn lookup<'a>(blob: &'a ParameterBlob, name: &str) -> CheckpointResult<&'a ParamTensor> {
    blob.get(name)
        .ok_or_else(|| CheckpointError::format(format!("parameter '{name}' disappeared while loading")))
}

fn apply_linear<B: Backend>(
    layer:  &mut Linear<B>,
    prefix: &str,
    blob:   &ParameterBlob,
    device: &B::Device,
) -> CheckpointResult<()> {
    let weight = lookup(blob, &format!("{prefix}.weight"))?;
    layer.weight = Param::from_tensor(Tensor::<B, 2>::from_data(
        TensorData::new(weight.values.clone(), weight.shape.clone()),
        device,
    ));

    if layer.bias.is_some() {
        let bias = lookup(blob, &format!("{prefix}.bias"))?;
        layer.bias = Some(Param::from_tensor(Tensor::<B, 1>::from_data(
            TensorData::new(bias.values.clone(), bias.shape.clone()),
            device,
        )));
    }
    Ok(())
}
