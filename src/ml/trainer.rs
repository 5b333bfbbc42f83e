// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + periodic validation using burn's DataLoader and Adam.
//
//   for each epoch:
//     for each shuffled batch:
//       forward → loss → backward → Adam step
//       every `print_every` steps: validate on model.valid()
//     append one metrics row per epoch
//
// The model on the autodiff backend B is what gets updated;
// model.valid() returns the same weights on B::InnerBackend,
// with dropout disabled, for validation.

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::SampleBatcher, dataset::SampleDataset};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::evaluator::{evaluate, Evaluation};
use crate::ml::model::{Network, NetworkConfig};

/// Outcome of a full training run.
pub struct TrainingOutcome<B: AutodiffBackend> {
    pub model:      Network<B>,
    pub validation: Evaluation,
    pub steps:      usize,
}

pub fn run_training<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    network_cfg:   &NetworkConfig,
    train_dataset: SampleDataset,
    val_dataset:   SampleDataset,
    metrics:       Option<&MetricsLogger>,
    device:        B::Device,
) -> Result<TrainingOutcome<B>> {
    ensure!(cfg.batch_size > 0, "batch size must be greater than zero");
    network_cfg.validate()?;
    ensure!(
        train_dataset.feature_dim() == Some(network_cfg.input_size),
        "training samples have width {:?}, the network expects {}",
        train_dataset.feature_dim(),
        network_cfg.input_size
    );

    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: Network<B> = network_cfg.init(&device);
    tracing::info!(
        "Model ready: {} {} ({} parameters)",
        network_cfg.head,
        network_cfg.architecture(),
        network_cfg.architecture().parameter_count()
    );

    let mut optim = AdamConfig::new().init();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(SampleBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    let val_loader = DataLoaderBuilder::new(SampleBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut steps        = 0usize;
    let mut running_loss = 0.0f64;
    let mut running_n    = 0usize;
    let mut validation   = evaluate(&model.valid(), val_loader.as_ref());

    for epoch in 1..=cfg.epochs {
        let mut epoch_loss_sum = 0.0f64;
        let mut epoch_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.inputs, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            epoch_loss_sum += loss_val;
            epoch_batches  += 1;
            running_loss   += loss_val;
            running_n      += 1;
            steps          += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);

            if cfg.print_every > 0 && steps % cfg.print_every == 0 {
                validation = evaluate(&model.valid(), val_loader.as_ref());
                println!(
                    "Epoch: {}/{}.. Training Loss: {:.3}.. Validation: {}",
                    epoch,
                    cfg.epochs,
                    running_loss / running_n as f64,
                    validation.summary(),
                );
                running_loss = 0.0;
                running_n    = 0;
            }
        }

        let train_loss = if epoch_batches > 0 {
            epoch_loss_sum / epoch_batches as f64
        } else { f64::NAN };

        validation = evaluate(&model.valid(), val_loader.as_ref());
        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.4} | {}",
            epoch, cfg.epochs, train_loss, validation.summary()
        );

        if let Some(logger) = metrics {
            logger.log(&EpochMetrics::new(epoch, train_loss, validation.loss, validation.accuracy))?;
        }
    }

    tracing::info!("Training complete after {} steps", steps);
    Ok(TrainingOutcome { model, validation, steps })
}
