//! Burn Dataset Integration
//!
//! Exposes a [`LabelPartitionedSampler`] through Burn's `Dataset` trait and
//! stacks [`ImageTensor`] pairs into `[N, C, H, W]` tensors for a dataloader.
//!
//! Burn's dataloader stops at the first `None` from `Dataset::get`, so a pair
//! that fails to load is served as a [`PairFailure`] item instead. The batcher
//! keeps failures next to the stacked tensors so the training loop sees them.

use std::fmt;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use tracing::warn;

use super::sampler::{LabelPartitionedSampler, PairedSample};
use super::transform::{ImageTensor, ItemTransform, TensorTransform};

/// A pair that could not be loaded or transformed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairFailure {
    /// Index passed to `Dataset::get`
    pub index: usize,
    /// Rendered `SamplerError`
    pub reason: String,
}

impl fmt::Display for PairFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pair {}: {}", self.index, self.reason)
    }
}

/// Item served by the Burn dataset adapter
pub type PairedItem<T> = std::result::Result<PairedSample<T>, PairFailure>;

impl<F: ItemTransform> Dataset<PairedItem<F::Output>> for LabelPartitionedSampler<F> {
    fn get(&self, index: usize) -> Option<PairedItem<F::Output>> {
        if index >= self.size() {
            return None;
        }

        Some(self.sample(index).map_err(|e| {
            warn!("Failed to load pair {}: {}", index, e);
            PairFailure {
                index,
                reason: e.to_string(),
            }
        }))
    }

    fn len(&self) -> usize {
        self.size()
    }
}

/// A batch of A and B images, each with shape [batch_size, channels, height, width]
///
/// `batch_size` counts loaded pairs only; it is zero when every item failed.
#[derive(Clone, Debug)]
pub struct PairedBatch<B: Backend> {
    pub a: Tensor<B, 4>,
    pub b: Tensor<B, 4>,
    /// Items of this batch that could not be loaded
    pub failures: Vec<PairFailure>,
}

/// Batcher stacking paired image tensors, scaled from [0, 1] to [-1, 1]
#[derive(Clone, Debug)]
pub struct PairedBatcher {
    channels: usize,
    image_size: usize,
}

impl PairedBatcher {
    /// Batcher matching the output shape of `transform`
    pub fn new(transform: &TensorTransform) -> Self {
        Self {
            channels: transform.channels(),
            image_size: transform.image_size,
        }
    }

    fn stack<B: Backend>(&self, images: Vec<f32>, batch_size: usize, device: &B::Device) -> Tensor<B, 4> {
        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(
                images,
                [batch_size, self.channels, self.image_size, self.image_size],
            ),
            device,
        );

        images.mul_scalar(2.0).sub_scalar(1.0)
    }
}

impl<B: Backend> Batcher<B, PairedItem<ImageTensor>, PairedBatch<B>> for PairedBatcher {
    fn batch(&self, items: Vec<PairedItem<ImageTensor>>, device: &B::Device) -> PairedBatch<B> {
        let per_image = self.channels * self.image_size * self.image_size;

        let mut a_data = Vec::with_capacity(items.len() * per_image);
        let mut b_data = Vec::with_capacity(items.len() * per_image);
        let mut failures = Vec::new();
        let mut batch_size = 0;
        for item in items {
            match item {
                Ok(pair) => {
                    a_data.extend(pair.a.data);
                    b_data.extend(pair.b.data);
                    batch_size += 1;
                }
                Err(failure) => failures.push(failure),
            }
        }

        PairedBatch {
            a: self.stack::<B>(a_data, batch_size, device),
            b: self.stack::<B>(b_data, batch_size, device),
            failures,
        }
    }
}
