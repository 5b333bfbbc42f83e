// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Loads a checkpoint on the chosen backend and measures it on
// data it was not trained on:
//
//   - CSV input      → the given file as-is
//   - synthetic data → a fresh draw from the same seeded
//                      distribution as training
//
// `predict_one` runs a single feature vector through the same
// loaded network.

use anyhow::{ensure, Context, Result};
use burn::{data::dataloader::DataLoaderBuilder, prelude::Backend};
use std::path::{Path, PathBuf};

use crate::application::train_use_case::DataConfig;
use crate::data::{batcher::SampleBatcher, dataset::SampleDataset};
use crate::domain::architecture::OutputHead;
use crate::infra::checkpoint::load_network;
use crate::ml::{
    backend::{BackendKind, CpuBackend, GpuBackend},
    evaluator::{evaluate, predict, Evaluation},
    model::Network,
};

/// Synthetic draw used for evaluation; training uses draw 0.
const HELD_OUT_DRAW: u64 = 1;

#[derive(Debug, Clone)]
pub struct EvaluateRequest {
    pub checkpoint: PathBuf,
    pub data:       DataConfig,
    pub seed:       u64,
    pub batch_size: usize,
    pub backend:    BackendKind,
}

pub struct EvaluateUseCase {
    request: EvaluateRequest,
}

impl EvaluateUseCase {
    pub fn new(request: EvaluateRequest) -> Self {
        Self { request }
    }

    pub fn execute(&self) -> Result<Evaluation> {
        match self.request.backend {
            BackendKind::NdArray => self.evaluate_on::<CpuBackend>(BackendKind::cpu_device()),
            BackendKind::Wgpu    => self.evaluate_on::<GpuBackend>(BackendKind::gpu_device()),
        }
    }

    fn evaluate_on<B: Backend>(&self, device: B::Device) -> Result<Evaluation> {
        let req = &self.request;
        ensure!(req.batch_size > 0, "batch size must be greater than zero");

        let model: Network<B> = load_network(&req.checkpoint, &device)
            .with_context(|| format!("Cannot load checkpoint '{}'", req.checkpoint.display()))?;
        let arch = model.architecture();

        // Synthetic data must have the width the network was built for.
        let mut data = req.data.clone();
        if data.csv.is_none() {
            data.input_size = arch.input_size;
            if model.head() == OutputHead::Classifier {
                data.classes = arch.output_size;
            }
        }

        let label_limit = match model.head() {
            OutputHead::Classifier  => arch.output_size,
            OutputHead::Autoencoder => usize::MAX,
        };
        let samples = data.load(req.seed, HELD_OUT_DRAW, label_limit)?;
        ensure!(
            samples[0].dim() == arch.input_size,
            "samples have {} features but the checkpoint expects {}",
            samples[0].dim(),
            arch.input_size
        );

        let loader = DataLoaderBuilder::new(SampleBatcher::<B>::new(device))
            .batch_size(req.batch_size)
            .num_workers(1)
            .build(SampleDataset::new(samples));

        let evaluation = evaluate(&model, loader.as_ref());
        tracing::info!("Evaluated '{}': {}", req.checkpoint.display(), evaluation.summary());
        Ok(evaluation)
    }
}

// ─── Single-sample prediction ────────────────────────────────────────────────
/// Class probabilities (classifier) or reconstruction (autoencoder).
#[derive(Debug, Clone)]
pub struct Prediction {
    pub head:   OutputHead,
    pub values: Vec<f32>,
}

impl Prediction {
    /// Most probable class and its probability; None for autoencoders.
    pub fn class(&self) -> Option<(usize, f32)> {
        match self.head {
            OutputHead::Classifier => self
                .values
                .iter()
                .copied()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(&b.1)),
            OutputHead::Autoencoder => None,
        }
    }
}

pub fn predict_one(checkpoint: &Path, features: &[f32], backend: BackendKind) -> Result<Prediction> {
    match backend {
        BackendKind::NdArray => predict_on::<CpuBackend>(checkpoint, features, BackendKind::cpu_device()),
        BackendKind::Wgpu    => predict_on::<GpuBackend>(checkpoint, features, BackendKind::gpu_device()),
    }
}

fn predict_on<B: Backend>(checkpoint: &Path, features: &[f32], device: B::Device) -> Result<Prediction> {
    let model: Network<B> = load_network(checkpoint, &device)
        .with_context(|| format!("Cannot load checkpoint '{}'", checkpoint.display()))?;
    let input_size = model.architecture().input_size;
    ensure!(
        features.len() == input_size,
        "got {} features but the checkpoint expects {}",
        features.len(),
        input_size
    );

    Ok(Prediction { head: model.head(), values: predict(&model, features, &device) })
}
