// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Measures a network on a data loader without touching its
// weights: mean loss per batch and, for classifiers, the share
// of samples whose arg-max class equals the label.
//
// Callers pass a model on a non-autodiff backend (model.valid()
// during training, or a freshly loaded checkpoint), so dropout
// is inactive and no graph is recorded.

use burn::{data::dataloader::DataLoader, prelude::*, tensor::TensorData};

use crate::data::batcher::SampleBatch;
use crate::domain::architecture::OutputHead;
use crate::ml::model::Network;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Mean of the per-batch losses; NaN when there was no data
    pub loss: f64,

    /// Fraction of correct predictions; None for autoencoders
    pub accuracy: Option<f64>,

    pub samples: usize,
}

impl Evaluation {
    pub fn summary(&self) -> String {
        match self.accuracy {
            Some(acc) => format!(
                "loss={:.4} | accuracy={:.1}% | samples={}",
                self.loss, acc * 100.0, self.samples
            ),
            None => format!("reconstruction_loss={:.6} | samples={}", self.loss, self.samples),
        }
    }
}

pub fn evaluate<B: Backend>(model: &Network<B>, loader: &dyn DataLoader<SampleBatch<B>>) -> Evaluation {
    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;
    let mut correct  = 0usize;
    let mut samples  = 0usize;

    for batch in loader.iter() {
        let batch_size = batch.targets.dims()[0];
        let (loss, output) = model.forward_loss(batch.inputs, batch.targets.clone());

        loss_sum += loss.into_scalar().elem::<f64>();
        batches  += 1;
        samples  += batch_size;

        if model.head() == OutputHead::Classifier {
            // argmax(1) returns [batch, 1]
            let predicted = output.argmax(1).flatten::<1>(0, 1);
            let hits: i64 = predicted
                .equal(batch.targets)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            correct += hits as usize;
        }
    }

    let loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
    let accuracy = match model.head() {
        OutputHead::Classifier if samples > 0 => Some(correct as f64 / samples as f64),
        OutputHead::Classifier                => Some(0.0),
        OutputHead::Autoencoder               => None,
    };

    Evaluation { loss, accuracy, samples }
}

/// Run one feature vector through the network.
///
/// Returns class probabilities for classifiers and the
/// reconstruction for autoencoders.
pub fn predict<B: Backend>(model: &Network<B>, features: &[f32], device: &B::Device) -> Vec<f32> {
    let input = Tensor::<B, 2>::from_data(
        TensorData::new(features.to_vec(), [1, features.len()]),
        device,
    );
    let output = model.forward(input);
    let output = match model.head() {
        OutputHead::Classifier  => output.exp(),
        OutputHead::Autoencoder => output,
    };
    output.into_data().iter::<f32>().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, data::dataloader::DataLoaderBuilder};

    use crate::data::{batcher::SampleBatcher, dataset::SampleDataset};
    use crate::domain::sample::Sample;
    use crate::ml::model::NetworkConfig;

    type TestBackend = NdArray<f32>;

    fn loader(samples: Vec<Sample>) -> std::sync::Arc<dyn DataLoader<SampleBatch<TestBackend>>> {
        DataLoaderBuilder::new(SampleBatcher::<TestBackend>::new(Default::default()))
            .batch_size(4)
            .num_workers(1)
            .build(SampleDataset::new(samples))
    }

    #[test]
    fn test_classifier_evaluation_counts_samples() {
        let model: Network<TestBackend> = NetworkConfig::new(3, 2, vec![4])
            .with_dropout(0.0)
            .init(&Default::default());
        let samples = (0..10).map(|i| Sample::new(vec![0.1, 0.2, 0.3], i % 2)).collect();

        let eval = evaluate(&model, loader(samples).as_ref());
        assert_eq!(eval.samples, 10);
        assert!(eval.loss.is_finite());
        let acc = eval.accuracy.expect("classifier accuracy");
        // identical inputs → identical predictions → exactly half are right
        assert!((acc - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_autoencoder_has_no_accuracy() {
        let model: Network<TestBackend> = NetworkConfig::new(3, 3, vec![2])
            .with_head(OutputHead::Autoencoder)
            .init(&Default::default());
        let samples = (0..5).map(|_| Sample::new(vec![0.5, 0.5, 0.5], 0)).collect();

        let eval = evaluate(&model, loader(samples).as_ref());
        assert_eq!(eval.accuracy, None);
        assert!(eval.loss >= 0.0);
    }

    #[test]
    fn test_empty_loader_gives_nan_loss() {
        let model: Network<TestBackend> = NetworkConfig::new(3, 2, vec![4]).init(&Default::default());
        let eval = evaluate(&model, loader(Vec::new()).as_ref());
        assert!(eval.loss.is_nan());
        assert_eq!(eval.samples, 0);
    }

    #[test]
    fn test_predict_returns_probabilities() {
        let device = Default::default();
        let model: Network<TestBackend> = NetworkConfig::new(3, 4, vec![5])
            .with_dropout(0.0)
            .init(&device);
        let probs = predict(&model, &[0.1, 0.5, 0.9], &device);
        assert_eq!(probs.len(), 4);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }
}
