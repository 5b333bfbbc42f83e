// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Five subcommands: `train`, `evaluate`, `predict`, `inspect`, `check`.
// Data flags are shared by `train` and `evaluate` through a
// flattened DataArgs.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    evaluate_use_case::EvaluateRequest,
    train_use_case::{DataConfig, TrainConfig},
};
use crate::domain::architecture::OutputHead;
use crate::ml::backend::BackendKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a network and write its checkpoint
    Train(TrainArgs),

    /// Measure a saved checkpoint on held-out data
    Evaluate(EvaluateArgs),

    /// Run one feature vector through a saved checkpoint
    Predict(PredictArgs),

    /// Print a checkpoint's metadata and parameter shapes
    Inspect(InspectArgs),

    /// Test whether a checkpoint loads into other hidden widths
    Check(CheckArgs),
}

/// Where samples come from. Without `--data`, seeded synthetic
/// clusters are generated.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// CSV file with `label,f1,...,fn` rows
    #[arg(long)]
    pub data: Option<String>,

    /// Divide every CSV feature by this (255 for raw pixels)
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// Number of synthetic samples
    #[arg(long, default_value_t = 2000)]
    pub samples: usize,

    /// Features per synthetic sample
    #[arg(long, default_value_t = 784)]
    pub input_size: usize,

    /// Number of classes
    #[arg(long, default_value_t = 10)]
    pub classes: usize,

    /// Standard deviation of the synthetic noise
    #[arg(long, default_value_t = 0.1)]
    pub spread: f32,

    /// Seed for synthetic data, weight init and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<DataArgs> for DataConfig {
    fn from(a: DataArgs) -> Self {
        DataConfig {
            csv:        a.data,
            scale:      a.scale,
            samples:    a.samples,
            input_size: a.input_size,
            classes:    a.classes,
            spread:     a.spread,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// classifier or autoencoder
    #[arg(long, default_value = "classifier")]
    pub task: OutputHead,

    #[command(flatten)]
    pub data: DataArgs,

    /// Hidden layer widths, comma separated; `--hidden` alone means none
    #[arg(long, value_delimiter = ',', num_args = 0.., default_value = "512,256,128")]
    pub hidden: Vec<usize>,

    /// Dropout probability after every hidden layer
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Run a validation pass every N steps (0 disables)
    #[arg(long, default_value_t = 40)]
    pub print_every: usize,

    /// Share of samples used for training; the rest validates
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Directory for checkpoint.safetensors, metrics.csv and train_config.json
    #[arg(long, default_value = "checkpoints")]
    pub output_dir: String,

    /// ndarray (CPU) or wgpu (GPU)
    #[arg(long, default_value = "ndarray")]
    pub backend: BackendKind,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            task:           a.task,
            seed:           a.data.seed,
            data:           a.data.into(),
            hidden_layers:  a.hidden,
            dropout:        a.dropout,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            print_every:    a.print_every,
            train_fraction: a.train_fraction,
            output_dir:     a.output_dir,
            backend:        a.backend,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long, default_value = "checkpoints/checkpoint.safetensors")]
    pub checkpoint: PathBuf,

    #[command(flatten)]
    pub data: DataArgs,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, default_value = "ndarray")]
    pub backend: BackendKind,
}

impl From<EvaluateArgs> for EvaluateRequest {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateRequest {
            checkpoint: a.checkpoint,
            seed:       a.data.seed,
            data:       a.data.into(),
            batch_size: a.batch_size,
            backend:    a.backend,
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[arg(long, default_value = "checkpoints/checkpoint.safetensors")]
    pub checkpoint: PathBuf,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[arg(long, default_value = "checkpoints/checkpoint.safetensors")]
    pub checkpoint: PathBuf,

    /// Hidden layer widths of the network to load into; `--hidden` alone means none
    #[arg(long, value_delimiter = ',', num_args = 0.., required = true)]
    pub hidden: Vec<usize>,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long, default_value = "checkpoints/checkpoint.safetensors")]
    pub checkpoint: PathBuf,

    /// Feature values, comma separated
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub features: Vec<f32>,

    #[arg(long, default_value = "ndarray")]
    pub backend: BackendKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_args_become_config() {
        let cli = Cli::try_parse_from([
            "ffn-checkpoint", "train",
            "--task", "autoencoder",
            "--hidden", "64,32",
            "--input-size", "16",
            "--seed", "7",
            "--backend", "cpu",
        ])
        .expect("valid arguments");

        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.task, OutputHead::Autoencoder);
        assert_eq!(cfg.hidden_layers, vec![64, 32]);
        assert_eq!(cfg.data.input_size, 16);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.backend, BackendKind::NdArray);
        assert_eq!(cfg.data.csv, None);
    }

    #[test]
    fn test_check_requires_hidden() {
        assert!(Cli::try_parse_from(["ffn-checkpoint", "check"]).is_err());
        assert!(Cli::try_parse_from(["ffn-checkpoint", "check", "--hidden", "8,4"]).is_ok());
    }

    #[test]
    fn test_bare_hidden_means_no_hidden_layers() {
        let cli = Cli::try_parse_from(["ffn-checkpoint", "train", "--hidden", "--epochs", "3"])
            .expect("valid arguments");
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert!(args.hidden.is_empty());
        assert_eq!(args.epochs, 3);
    }

    #[test]
    fn test_predict_parses_negative_features() {
        let cli = Cli::try_parse_from(["ffn-checkpoint", "predict", "--features", "-0.5,1,2.25"])
            .expect("valid arguments");
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };
        assert_eq!(args.features, vec![-0.5, 1.0, 2.25]);
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        assert!(Cli::try_parse_from(["ffn-checkpoint", "train", "--task", "gan"]).is_err());
    }
}
