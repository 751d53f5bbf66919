//! # Chest X-ray Pairs
//!
//! A Rust library serving paired images from two label groups of a chest
//! X-ray label table, for unpaired image-to-image translation (CycleGAN-style)
//! training with the Burn framework.
//!
//! ## Modules
//!
//! - `config`: Sampler configuration (keys, pairing and partition modes, TOML loading)
//! - `dataset`: Label table loading, partitioning, pair sampling and Burn integration
//! - `utils`: Logging and error types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chest_xray_pairs::{LabelPartitionedSampler, SamplerConfig, TensorTransform};
//!
//! let config = SamplerConfig::new("data/Data_toy.csv", "data/images");
//! let sampler = LabelPartitionedSampler::new(config, TensorTransform::grayscale(256))?;
//!
//! let pair = sampler.sample(0)?;
//! println!("{} pairs per epoch", sampler.size());
//! ```

pub mod config;
pub mod dataset;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::{AlignmentMode, PartitionMode, SamplerConfig, TableColumns};
pub use dataset::{
    GroupIndex, GroupSummary, ImageResolver, ImageTensor, ItemTransform, LabelPartitionedSampler,
    LabelTable, PairFailure, PairedBatch, PairedBatcher, PairedIdentifiers, PairedItem,
    PairedSample, Record, TensorTransform,
};
pub use utils::error::{Result, SamplerError};

/// Default label of group A
pub const DEFAULT_KEY_A: &str = "No Finding";

/// Default label of group B
pub const DEFAULT_KEY_B: &str = "Pneumonia";

/// Default square image size produced by `TensorTransform`
pub const IMAGE_SIZE: usize = 256;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
