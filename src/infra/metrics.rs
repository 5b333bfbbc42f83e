// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per training epoch:
//
//   epoch,train_loss,val_loss,val_accuracy
//   1,0.693100,0.652400,0.812500
//   2,0.601200,0.574800,0.906250
//
// val_accuracy is left blank for autoencoders.
//
// Output file: <output_dir>/metrics.csv

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

pub const METRICS_FILE: &str = "metrics.csv";
const HEADER: &str = "epoch,train_loss,val_loss,val_accuracy";

/// One row of metrics for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Starts at 1
    pub epoch: usize,

    /// Mean loss over the epoch's training batches
    pub train_loss: f64,

    /// Mean loss on the validation set after the epoch
    pub val_loss: f64,

    /// Range [0.0, 1.0]; None when the head has no classes
    pub val_accuracy: Option<f64>,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_accuracy: Option<f64>) -> Self {
        Self { epoch, train_loss, val_loss, val_accuracy }
    }

    fn csv_row(&self) -> String {
        let accuracy = self
            .val_accuracy
            .map(|a| format!("{a:.6}"))
            .unwrap_or_default();
        format!("{},{:.6},{:.6},{}", self.epoch, self.train_loss, self.val_loss, accuracy)
    }
}

/// Logs epoch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet, so
    /// repeated runs into the same directory append.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create directory '{}'", dir.display()))?;

        let csv_path = dir.join(METRICS_FILE);
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
