// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case. Results are printed here; nothing is computed here.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CheckArgs, Commands, EvaluateArgs, InspectArgs, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "ffn-checkpoint",
    version,
    about = "Train feed-forward networks and save, load and check their checkpoints."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Predict(args)  => run_predict(args),
            Commands::Inspect(args)  => run_inspect(args),
            Commands::Check(args)    => run_check(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting {} training into '{}'", args.task, args.output_dir);

    let report = TrainUseCase::new(args.into()).execute()?;

    println!("Training complete after {} steps.", report.steps);
    println!("  Validation : {}", report.validation.summary());
    println!("  Checkpoint : {}", report.checkpoint.display());
    println!("  Metrics    : {}", report.metrics.display());
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let evaluation = EvaluateUseCase::new(args.into()).execute()?;
    println!("{}", evaluation.summary());
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::evaluate_use_case::predict_one;

    let prediction = predict_one(&args.checkpoint, &args.features, args.backend)?;
    if let Some((class, prob)) = prediction.class() {
        println!("class {class} (p={prob:.4})");
    }
    let values: Vec<String> = prediction.values.iter().map(|v| format!("{v:.4}")).collect();
    println!("{}", values.join(","));
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::checkpoint_use_case::inspect;

    let summary = inspect(&args.checkpoint)?;
    print!("{summary}");
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<()> {
    use crate::application::checkpoint_use_case::check;

    let mismatches = check(&args.checkpoint, &args.hidden)?;
    if mismatches.is_empty() {
        println!("compatible");
    } else {
        println!("{} incompatible parameter(s):", mismatches.len());
        for m in &mismatches {
            println!("  {m}");
        }
    }
    Ok(())
}
