use burn::data::dataset::Dataset;

use crate::domain::sample::Sample;

/// In-memory list of samples exposed through burn's `Dataset` trait.
pub struct SampleDataset {
    samples: Vec<Sample>,
}

impl SampleDataset {
    pub fn new(samples: Vec<Sample>) -> Self { Self { samples } }

    /// Feature width of the first sample, if any.
    pub fn feature_dim(&self) -> Option<usize> {
        self.samples.first().map(Sample::dim)
    }
}

impl Dataset<Sample> for SampleDataset {
    fn get(&self, index: usize) -> Option<Sample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
