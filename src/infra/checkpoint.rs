// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores trained networks.
//
// What gets saved per training run:
//   1. checkpoint.safetensors — architecture metadata + weights
//   2. train_config.json      — the hyperparameters of the run
//   3. metrics.csv            — written by MetricsLogger
//
// Writing is all-or-nothing: the encoded record goes to a
// sibling `<name>.tmp` file, is flushed, and is then renamed
// over the destination. A reader never sees a half-written
// checkpoint.
//
// Loading comes in two flavours:
//   - load_network: rebuild the network from the stored
//     architecture, then apply the stored weights
//   - load_into:    apply the stored weights onto a network the
//     caller built from its own (current) configuration; any
//     shape disagreement fails the load and lists every
//     offending parameter

use anyhow::{Context, Result};
use burn::prelude::*;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::infra::{
    error::{CheckpointError, CheckpointResult},
    record::CheckpointRecord,
};
use crate::ml::model::Network;

pub const CHECKPOINT_FILE: &str = "checkpoint.safetensors";
pub const CONFIG_FILE:     &str = "train_config.json";

// ─── Free functions over a single checkpoint file ────────────────────────────

/// Validate `record` and write it atomically to `path`.
///
/// Missing parent directories are created. Any I/O failure is returned
/// immediately; no retry is attempted.
pub fn write_checkpoint(record: &CheckpointRecord, path: &Path) -> CheckpointResult<()> {
    record.validate()?;
    let bytes = record.to_bytes()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CheckpointError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(&bytes)?;
        file.sync_all()
    });
    if let Err(e) = written {
        fs::remove_file(&tmp).ok();
        return Err(CheckpointError::io(&tmp, e));
    }

    if let Err(e) = fs::rename(&tmp, path) {
        fs::remove_file(&tmp).ok();
        return Err(CheckpointError::io(path, e));
    }

    tracing::debug!(
        "Wrote checkpoint '{}' ({} bytes, {} parameters)",
        path.display(),
        bytes.len(),
        record.parameters.len()
    );
    Ok(())
}

/// Read and decode the record at `path` without building a model.
pub fn read_checkpoint(path: &Path) -> CheckpointResult<CheckpointRecord> {
    let bytes = fs::read(path).map_err(|e| CheckpointError::io(path, e))?;
    CheckpointRecord::from_bytes(&bytes)
}

/// Snapshot `network` and write it to `path`.
pub fn save_network<B: Backend>(network: &Network<B>, path: &Path) -> CheckpointResult<()> {
    write_checkpoint(&CheckpointRecord::from_network(network), path)
}

/// Rebuild a network from the stored architecture and apply the stored weights.
pub fn load_network<B: Backend>(path: &Path, device: &B::Device) -> CheckpointResult<Network<B>> {
    let record = read_checkpoint(path)?;
    record.validate()?;

    let network: Network<B> = record.network_config().init(device);
    let network = network.load_state_dict(&record.parameters)?;

    tracing::info!(
        "Loaded {} network {} from '{}'",
        record.head,
        record.architecture,
        path.display()
    );
    Ok(network)
}

/// Apply the weights stored at `path` onto `network`.
///
/// `network` comes from the caller's current configuration; if its
/// parameter shapes differ from the stored ones the load fails with
/// [`CheckpointError::ShapeMismatch`] naming every offending parameter.
pub fn load_into<B: Backend>(path: &Path, network: Network<B>) -> CheckpointResult<Network<B>> {
    let record = read_checkpoint(path)?;
    network.load_state_dict(&record.parameters)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

// ─── CheckpointManager ───────────────────────────────────────────────────────
/// Owns the output directory of one training run.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.dir.join(CHECKPOINT_FILE)
    }

    /// Write the trained network to `<dir>/checkpoint.safetensors`.
    pub fn save_model<B: Backend>(&self, network: &Network<B>) -> Result<PathBuf> {
        let path = self.checkpoint_path();
        save_network(network, &path)
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        tracing::info!("Saved checkpoint: '{}'", path.display());
        Ok(path)
    }

    /// Save the training configuration next to the checkpoint.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create directory '{}'", self.dir.display()))?;
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::architecture::OutputHead;
    use crate::ml::model::NetworkConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn network(hidden: Vec<usize>) -> Network<TestBackend> {
        NetworkConfig::new(12, 4, hidden).init(&Default::default())
    }

    #[test]
    fn test_save_then_load_is_bit_identical() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.safetensors");
        let original = network(vec![10, 8, 6]);

        save_network(&original, &path).expect("save");
        let loaded: Network<TestBackend> = load_network(&path, &Default::default()).expect("load");

        assert_eq!(loaded.architecture(), original.architecture());
        let saved  = original.state_dict();
        let reload = loaded.state_dict();
        assert_eq!(saved.len(), reload.len());
        for (name, tensor) in &saved {
            assert!(tensor.bit_eq(&reload[name]), "{name} changed");
        }
    }

    #[test]
    fn test_load_twice_gives_identical_models() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.safetensors");
        save_network(&network(vec![5]), &path).expect("save");

        let a = load_into(&path, network(vec![5])).expect("first load");
        let b = load_into(&path, network(vec![5])).expect("second load");

        let (a, b) = (a.state_dict(), b.state_dict());
        for (name, tensor) in &a {
            assert!(tensor.bit_eq(&b[name]), "{name} differs");
        }
    }

    #[test]
    fn test_load_into_different_hidden_sizes_lists_every_layer() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.safetensors");
        save_network(&network(vec![10, 8, 6]), &path).expect("save");

        let err = load_into(&path, network(vec![9, 7, 5])).expect_err("widths differ");
        let mismatches = err.mismatches().expect("shape error");
        let names: Vec<&str> = mismatches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "hidden_layers.0.weight", "hidden_layers.0.bias",
                "hidden_layers.1.weight", "hidden_layers.1.bias",
                "hidden_layers.2.weight", "hidden_layers.2.bias",
                "output.weight",
            ]
        );
        assert!(mismatches.iter().all(|m| m.checkpoint.is_some() && m.model.is_some()));

        // deterministic
        let again = load_into(&path, network(vec![9, 7, 5])).expect_err("widths differ");
        assert_eq!(again.mismatches(), Some(mismatches));
    }

    #[test]
    fn test_load_into_fewer_layers_reports_unexpected_keys() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.safetensors");
        save_network(&network(vec![6, 6]), &path).expect("save");

        let err = load_into(&path, network(vec![6])).expect_err("depth differs");
        let mismatches = err.mismatches().expect("shape error");
        assert!(mismatches.iter().any(|m| m.name == "hidden_layers.1.weight" && m.model.is_none()));
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("model.safetensors");
        save_network(&network(vec![3]), &path).expect("save");
        save_network(&network(vec![3]), &path).expect("overwrite");

        let names: Vec<String> = fs::read_dir(path.parent().expect("parent"))
            .expect("list dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["model.safetensors".to_string()]);
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir     = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"file").expect("write blocker");

        let err = save_network(&network(vec![3]), &blocker.join("model.safetensors"))
            .expect_err("parent is a file");
        assert!(matches!(err, CheckpointError::Io { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_checkpoint(&dir.path().join("absent.safetensors")).expect_err("absent");
        assert!(matches!(err, CheckpointError::Io { .. }));
    }

    #[test]
    fn test_corrupt_file_is_format_error() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.safetensors");
        fs::write(&path, b"definitely not a checkpoint").expect("write");
        let err = read_checkpoint(&path).expect_err("garbage");
        assert!(matches!(err, CheckpointError::Format(_)));
    }

    #[test]
    fn test_inconsistent_record_is_not_written() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.safetensors");
        let mut record = CheckpointRecord::from_network(&network(vec![4]));
        record.architecture.hidden_layers = vec![5];

        assert!(write_checkpoint(&record, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_autoencoder_head_survives_round_trip() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ae.safetensors");
        let ae: Network<TestBackend> = NetworkConfig::new(8, 8, vec![3])
            .with_head(OutputHead::Autoencoder)
            .init(&Default::default());
        save_network(&ae, &path).expect("save");

        let loaded: Network<TestBackend> = load_network(&path, &Default::default()).expect("load");
        assert_eq!(loaded.head(), OutputHead::Autoencoder);
    }

    #[test]
    fn test_out_of_range_dropout_never_reaches_disk_or_panics_on_load() {
        let dir  = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.safetensors");
        let mut record = CheckpointRecord::from_network(&network(vec![4]));
        record.dropout = 1.5;

        let err = write_checkpoint(&record, &path).expect_err("dropout 1.5");
        assert!(matches!(err, CheckpointError::InvalidMetadata { key: "dropout", .. }));
        assert!(!path.exists());

        // a file produced elsewhere with the same value
        fs::write(&path, record.to_bytes().expect("encode")).expect("write");
        let err = load_network::<TestBackend>(&path, &Default::default()).expect_err("dropout 1.5");
        assert!(matches!(err, CheckpointError::InvalidMetadata { key: "dropout", .. }));
    }

    #[test]
    fn test_manager_writes_model_and_config() {
        let dir     = tempfile::tempdir().expect("tempdir");
        let manager = CheckpointManager::new(dir.path().join("run"));
        let cfg     = TrainConfig { hidden_layers: vec![32, 16], epochs: 3, ..TrainConfig::default() };
        manager.save_config(&cfg).expect("save config");

        let saved = manager.save_model(&network(vec![4])).expect("save");
        assert_eq!(saved, dir.path().join("run").join(CHECKPOINT_FILE));
        let loaded: Network<TestBackend> = load_network(&saved, &Default::default()).expect("load");
        assert_eq!(loaded.architecture().hidden_layers, vec![4]);

        let json = fs::read_to_string(dir.path().join("run").join(CONFIG_FILE)).expect("config");
        let loaded: TrainConfig = serde_json::from_str(&json).expect("valid json");
        assert_eq!(loaded.hidden_layers, vec![32, 16]);
        assert_eq!(loaded.epochs, 3);
        assert_eq!(loaded.task, cfg.task);
    }
}
