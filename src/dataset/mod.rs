//! Dataset module for paired chest X-ray data
//!
//! This module provides functionality for:
//! - Loading the label table (one image per row, `|`-joined findings)
//! - Partitioning image identifiers into label groups
//! - Serving A/B image pairs for image-to-image translation training
//! - Burn `Dataset` and `Batcher` integration

pub mod burn_dataset;
pub mod partition;
pub mod resolver;
pub mod sampler;
pub mod table;
pub mod transform;

// Re-export main types for convenience
pub use burn_dataset::{PairFailure, PairedBatch, PairedBatcher, PairedItem};
pub use partition::{partition, GroupIndex, Partition, LABEL_SEPARATOR};
pub use resolver::ImageResolver;
pub use sampler::{
    GroupCount, GroupSummary, LabelPartitionedSampler, PairedIdentifiers, PairedSample,
};
pub use table::{LabelTable, Record};
pub use transform::{ImageTensor, ItemTransform, TensorTransform};
