// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run in order:
//
//   Step 1: Load samples              (Layer 4 - data)
//   Step 2: Derive the architecture   (Layer 3 - domain)
//   Step 3: Split train/validation    (Layer 4 - data)
//   Step 4: Save config               (Layer 6 - infra)
//   Step 5: Run training loop         (Layer 5 - ml)
//   Step 6: Write the checkpoint      (Layer 6 - infra)
//
// The checkpoint is written exactly once, after the last epoch.

use anyhow::{ensure, Result};
use burn::{module::AutodiffModule, tensor::backend::AutodiffBackend};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    dataset::SampleDataset,
    loader::CsvSampleLoader,
    splitter::split_train_val,
    synthetic::SyntheticBlobs,
};
use crate::domain::{architecture::OutputHead, sample::Sample, traits::SampleSource};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    backend::{BackendKind, CpuAutodiff, GpuAutodiff},
    evaluator::Evaluation,
    model::NetworkConfig,
    trainer::run_training,
};

// ─── Data Configuration ──────────────────────────────────────────────────────
// Where samples come from: a local CSV file when `csv` is set,
// otherwise seeded synthetic blobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub csv:        Option<String>,
    /// Every CSV feature is divided by this
    pub scale:      f32,
    pub samples:    usize,
    pub input_size: usize,
    pub classes:    usize,
    pub spread:     f32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv:        None,
            scale:      1.0,
            samples:    2000,
            input_size: 784,
            classes:    10,
            spread:     0.1,
        }
    }
}

impl DataConfig {
    /// `draw` selects an independent synthetic sample of the same
    /// distribution; it is ignored for CSV files.
    pub fn source(&self, seed: u64, draw: u64) -> Box<dyn SampleSource> {
        match &self.csv {
            Some(path) => Box::new(CsvSampleLoader::new(path).with_scale(self.scale)),
            None => Box::new(
                SyntheticBlobs::new(self.samples, self.input_size, self.classes, seed)
                    .with_spread(self.spread)
                    .with_draw(draw),
            ),
        }
    }

    /// Load and check that every label names one of `classes`.
    pub fn load(&self, seed: u64, draw: u64, classes: usize) -> Result<Vec<Sample>> {
        let source = self.source(seed, draw);
        tracing::info!("Loading samples from {}", source.describe());
        let samples = source.load_all()?;
        ensure!(!samples.is_empty(), "{} produced no samples", source.describe());

        if let Some(bad) = samples.iter().find(|s| s.label >= classes) {
            anyhow::bail!("label {} is out of range for {} classes", bad.label, classes);
        }
        tracing::info!("Loaded {} samples of width {}", samples.len(), samples[0].dim());
        Ok(samples)
    }
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings of a training run. Saved next to the checkpoint as
// train_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub task:           OutputHead,
    #[serde(flatten)]
    pub data:           DataConfig,
    pub seed:           u64,
    pub hidden_layers:  Vec<usize>,
    pub dropout:        f64,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub print_every:    usize,
    pub train_fraction: f64,
    pub output_dir:     String,
    pub backend:        BackendKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            task:           OutputHead::Classifier,
            data:           DataConfig::default(),
            seed:           42,
            hidden_layers:  vec![512, 256, 128],
            dropout:        0.5,
            epochs:         5,
            batch_size:     64,
            lr:             1e-3,
            print_every:    40,
            train_fraction: 0.8,
            output_dir:     "checkpoints".to_string(),
            backend:        BackendKind::NdArray,
        }
    }
}

impl TrainConfig {
    /// Network shape for samples of width `input_size`.
    pub fn network_config(&self, input_size: usize) -> NetworkConfig {
        let output_size = match self.task {
            OutputHead::Classifier  => self.data.classes,
            OutputHead::Autoencoder => input_size,
        };
        NetworkConfig::new(input_size, output_size, self.hidden_layers.clone())
            .with_dropout(self.dropout)
            .with_head(self.task)
    }
}

/// Where a finished run left its artifacts.
#[derive(Debug)]
pub struct TrainReport {
    pub checkpoint: PathBuf,
    pub metrics:    PathBuf,
    pub validation: Evaluation,
    pub steps:      usize,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;
        ensure!(
            cfg.train_fraction > 0.0 && cfg.train_fraction < 1.0,
            "train fraction must be between 0 and 1, got {}",
            cfg.train_fraction
        );

        // ── Step 1: Load samples ──────────────────────────────────────────────
        // Autoencoder labels are never used, so any label is accepted.
        let label_limit = match cfg.task {
            OutputHead::Classifier  => cfg.data.classes,
            OutputHead::Autoencoder => usize::MAX,
        };
        let samples    = cfg.data.load(cfg.seed, 0, label_limit)?;
        let input_size = samples[0].dim();

        // ── Step 2: Architecture ──────────────────────────────────────────────
        let network_cfg = cfg.network_config(input_size);
        network_cfg.validate()?;
        tracing::info!("Architecture: {}", network_cfg.architecture());

        // ── Step 3: Train / validation split ──────────────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, cfg.train_fraction, cfg.seed);
        ensure!(
            !train_samples.is_empty() && !val_samples.is_empty(),
            "not enough samples for a train/validation split ({} train, {} validation)",
            train_samples.len(),
            val_samples.len()
        );
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );
        let train_dataset = SampleDataset::new(train_samples);
        let val_dataset   = SampleDataset::new(val_samples);

        // ── Step 4: Save config ───────────────────────────────────────────────
        let manager = CheckpointManager::new(&cfg.output_dir);
        manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.output_dir)?;

        // ── Step 5 + 6: Train, then checkpoint ────────────────────────────────
        tracing::info!("Training on backend '{}'", cfg.backend);
        let run = TrainRun { cfg, network_cfg: &network_cfg, manager: &manager, metrics: &metrics };
        match cfg.backend {
            BackendKind::NdArray => run.train_on::<CpuAutodiff>(train_dataset, val_dataset, BackendKind::cpu_device()),
            BackendKind::Wgpu    => run.train_on::<GpuAutodiff>(train_dataset, val_dataset, BackendKind::gpu_device()),
        }
    }
}

struct TrainRun<'a> {
    cfg:         &'a TrainConfig,
    network_cfg: &'a NetworkConfig,
    manager:     &'a CheckpointManager,
    metrics:     &'a MetricsLogger,
}

impl TrainRun<'_> {
    fn train_on<B: AutodiffBackend>(
        &self,
        train:  SampleDataset,
        val:    SampleDataset,
        device: B::Device,
    ) -> Result<TrainReport> {
        let outcome = run_training::<B>(
            self.cfg,
            self.network_cfg,
            train,
            val,
            Some(self.metrics),
            device,
        )?;

        let checkpoint = self.manager.save_model(&outcome.model.valid())?;

        Ok(TrainReport {
            checkpoint,
            metrics:    self.metrics.csv_path().to_path_buf(),
            validation: outcome.validation,
            steps:      outcome.steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::checkpoint::{read_checkpoint, CHECKPOINT_FILE, CONFIG_FILE};

    fn small_config(dir: &std::path::Path, task: OutputHead) -> TrainConfig {
        TrainConfig {
            task,
            data: DataConfig { samples: 64, input_size: 6, classes: 3, ..DataConfig::default() },
            hidden_layers: vec![8, 4],
            dropout:       0.0,
            epochs:        1,
            batch_size:    16,
            print_every:   0,
            output_dir:    dir.to_string_lossy().into_owned(),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_execute_writes_checkpoint_config_and_metrics() {
        let dir = tempfile::tempdir().expect("tempdir");
        let report = TrainUseCase::new(small_config(dir.path(), OutputHead::Classifier))
            .execute()
            .expect("training succeeds");

        assert_eq!(report.checkpoint, dir.path().join(CHECKPOINT_FILE));
        assert!(report.metrics.exists());
        assert!(report.steps > 0);

        let record = read_checkpoint(&report.checkpoint).expect("readable");
        assert_eq!(record.architecture.input_size, 6);
        assert_eq!(record.architecture.output_size, 3);
        assert_eq!(record.architecture.hidden_layers, vec![8, 4]);

        let json  = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).expect("config saved");
        let saved: TrainConfig = serde_json::from_str(&json).expect("valid json");
        assert_eq!(saved.hidden_layers, vec![8, 4]);
        assert_eq!(saved.data.input_size, 6);
    }

    #[test]
    fn test_autoencoder_output_matches_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = small_config(dir.path(), OutputHead::Autoencoder);
        assert_eq!(cfg.network_config(6).output_size, 6);

        let report = TrainUseCase::new(cfg).execute().expect("training succeeds");
        let record = read_checkpoint(&report.checkpoint).expect("readable");
        assert_eq!(record.head, OutputHead::Autoencoder);
        assert_eq!(record.architecture.output_size, 6);
    }

    #[test]
    fn test_out_of_range_labels_are_rejected() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let csv  = dir.path().join("data.csv");
        std::fs::write(&csv, "0,0.1,0.2\n5,0.3,0.4\n").expect("write csv");

        let mut cfg = small_config(dir.path(), OutputHead::Classifier);
        cfg.data.csv = Some(csv.to_string_lossy().into_owned());
        let err = TrainUseCase::new(cfg).execute().expect_err("label 5 with 3 classes");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_out_of_range_dropout_fails_without_checkpoint() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = TrainConfig { dropout: 1.5, ..small_config(dir.path(), OutputHead::Classifier) };

        let err = TrainUseCase::new(cfg).execute().expect_err("dropout 1.5");
        assert!(err.to_string().contains("dropout"));
        assert!(!dir.path().join(CHECKPOINT_FILE).exists());
    }

    #[test]
    fn test_bad_train_fraction_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = TrainConfig { train_fraction: 1.0, ..small_config(dir.path(), OutputHead::Classifier) };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }
}
