// ============================================================
// Layer 4 — Sample Batcher
// ============================================================
// Implements burn's Batcher trait to stack a Vec<Sample> into
// tensors:
//
//   Input:  N samples, each with D features
//   Output: inputs [N, D] (float), targets [N] (int)
//
// All samples in a dataset share the same width, so the
// features are flattened row by row and reshaped in one go.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::domain::sample::Sample;

// ─── SampleBatch ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SampleBatch<B: Backend> {
    /// Feature rows — shape: [batch_size, feature_dim]
    pub inputs: Tensor<B, 2>,

    /// Class indices — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── SampleBatcher ────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created where the model lives.
#[derive(Clone, Debug)]
pub struct SampleBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SampleBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<Sample, SampleBatch<B>> for SampleBatcher<B> {
    fn batch(&self, items: Vec<Sample>) -> SampleBatch<B> {
        let batch_size  = items.len();
        let feature_dim = items.first().map(Sample::dim).unwrap_or(0);

        let features: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let labels: Vec<i64> = items
            .iter()
            .map(|s| s.label as i64)
            .collect();

        let inputs = Tensor::<B, 2>::from_data(
            TensorData::new(features, [batch_size, feature_dim]),
            &self.device,
        );
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]),
            &self.device,
        );

        SampleBatch { inputs, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_batch_shapes_and_values() {
        let batcher = SampleBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![
            Sample::new(vec![1.0, 2.0, 3.0], 2),
            Sample::new(vec![4.0, 5.0, 6.0], 0),
        ]);

        assert_eq!(batch.inputs.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2]);

        let values: Vec<f32> = batch.inputs.into_data().iter::<f32>().collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let labels: Vec<i64> = batch.targets.into_data().iter::<i64>().collect();
        assert_eq!(labels, vec![2, 0]);
    }
}
