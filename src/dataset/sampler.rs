//! Label-Partitioned Paired Sampler
//!
//! Serves `(A, B)` image pairs drawn from two label groups of a table, for
//! unpaired image-to-image translation training.
//!
//! ## Pairing
//!
//! For `sample(index)` the A side is always `A[index mod |A|]`. The B side
//! depends on [`AlignmentMode`]:
//! - `Unaligned`: `B[index mod |B|]`, fully deterministic
//! - `Aligned` (default): a uniform draw from B on every call
//!
//! `size()` is `max(|A|, |B|)` so one pass over the dataset visits every
//! image of the larger group.

use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::partition::{partition, GroupIndex};
use super::resolver::ImageResolver;
use super::table::LabelTable;
use super::transform::ItemTransform;
use crate::config::{AlignmentMode, PartitionMode, SamplerConfig};
use crate::utils::error::{Result, SamplerError};

/// Transformed A and B images of one pair
#[derive(Clone, Debug, PartialEq)]
pub struct PairedSample<T> {
    pub a: T,
    pub b: T,
}

/// Identifiers chosen for one pair, before any I/O
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedIdentifiers<'a> {
    pub a: &'a str,
    pub b: &'a str,
    /// Position of `a` inside group A
    pub a_index: usize,
    /// Position of `b` inside group B
    pub b_index: usize,
}

/// Source of random B indices
enum PairingRng {
    ThreadLocal,
    Seeded(Mutex<ChaCha8Rng>),
}

impl PairingRng {
    fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => PairingRng::Seeded(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
            None => PairingRng::ThreadLocal,
        }
    }

    /// Uniform index in `0..len`; `len` must be non-zero
    fn index(&self, len: usize) -> usize {
        match self {
            PairingRng::ThreadLocal => rand::thread_rng().gen_range(0..len),
            PairingRng::Seeded(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|e| e.into_inner());
                rng.gen_range(0..len)
            }
        }
    }
}

/// Size of one discovered group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub name: String,
    pub members: usize,
    /// Rows carrying this label alone (exhaustive mode only)
    pub single_label: Option<usize>,
}

/// Overview of a built sampler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub key_a: String,
    pub key_b: String,
    pub size_a: usize,
    pub size_b: usize,
    pub length: usize,
    pub total_rows: usize,
    pub alignment_mode: AlignmentMode,
    pub partition_mode: PartitionMode,
    pub groups: Vec<GroupCount>,
}

/// Paired dataset over two label groups of a label table
pub struct LabelPartitionedSampler<F> {
    config: SamplerConfig,
    groups: GroupIndex,
    /// Identifier projection of the table; labels are dropped after partitioning
    identifiers: Vec<String>,
    single_label_counts: std::collections::HashMap<String, usize>,
    resolver: ImageResolver,
    transform: F,
    length: usize,
    rng: PairingRng,
}

impl<F> std::fmt::Debug for LabelPartitionedSampler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelPartitionedSampler")
            .field("key_a", &self.config.key_a)
            .field("key_b", &self.config.key_b)
            .field("alignment_mode", &self.config.alignment_mode)
            .field("partition_mode", &self.config.partition_mode)
            .field("length", &self.length)
            .finish()
    }
}

impl<F: ItemTransform> LabelPartitionedSampler<F> {
    /// Load the label table named by `config` and build the sampler
    pub fn new(config: SamplerConfig, transform: F) -> Result<Self> {
        config.validate()?;
        let table = LabelTable::from_csv(&config.table_path, &config.columns)?;
        Self::from_table(table, config, transform)
    }

    /// Build the sampler from an already loaded table
    pub fn from_table(table: LabelTable, config: SamplerConfig, transform: F) -> Result<Self> {
        config.validate()?;

        let partition = partition(
            table,
            config.partition_mode,
            &config.key_a,
            &config.key_b,
        );

        for key in [&config.key_a, &config.key_b] {
            if partition.groups.group_len(key) == 0 {
                return Err(SamplerError::EmptyGroup(key.clone()));
            }
        }

        let length = partition
            .groups
            .group_len(&config.key_a)
            .max(partition.groups.group_len(&config.key_b));

        Ok(Self {
            resolver: ImageResolver::new(config.image_root.clone()),
            rng: PairingRng::new(config.seed),
            groups: partition.groups,
            identifiers: partition.identifiers,
            single_label_counts: partition.single_label_counts,
            transform,
            length,
            config,
        })
    }

    /// `max(|A|, |B|)`, fixed at construction
    pub fn size(&self) -> usize {
        self.length
    }

    /// Choose the identifiers for `index` without touching the file system
    pub fn sample_identifiers(&self, index: usize) -> PairedIdentifiers<'_> {
        let group_a = self.group_a();
        let group_b = self.group_b();

        let a_index = index % group_a.len();
        let b_index = match self.config.alignment_mode {
            AlignmentMode::Unaligned => index % group_b.len(),
            AlignmentMode::Aligned => self.rng.index(group_b.len()),
        };

        PairedIdentifiers {
            a: &group_a[a_index],
            b: &group_b[b_index],
            a_index,
            b_index,
        }
    }

    /// Load and transform the pair for `index`. Nothing is cached.
    pub fn sample(&self, index: usize) -> Result<PairedSample<F::Output>> {
        let pair = self.sample_identifiers(index);
        debug!(
            "Pair {}: A = {:?}, B = {:?}",
            index,
            self.resolver.resolve(pair.a),
            self.resolver.resolve(pair.b)
        );

        let a = self.transform.apply(self.resolver.load(pair.a)?)?;
        let b = self.transform.apply(self.resolver.load(pair.b)?)?;

        Ok(PairedSample { a, b })
    }
}

impl<F> LabelPartitionedSampler<F> {
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    pub fn transform(&self) -> &F {
        &self.transform
    }

    /// Identifiers of group A in table order
    pub fn group_a(&self) -> &[String] {
        self.groups.get(&self.config.key_a).unwrap_or_default()
    }

    /// Identifiers of group B in table order
    pub fn group_b(&self) -> &[String] {
        self.groups.get(&self.config.key_b).unwrap_or_default()
    }

    /// Every materialized group (all labels in exhaustive mode)
    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }

    /// Identifier column of the source table
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn summary(&self) -> GroupSummary {
        let groups = self
            .groups
            .names()
            .map(|name| GroupCount {
                name: name.to_string(),
                members: self.groups.group_len(name),
                single_label: match self.config.partition_mode {
                    PartitionMode::Exact => None,
                    PartitionMode::Exhaustive => {
                        Some(self.single_label_counts.get(name).copied().unwrap_or(0))
                    }
                },
            })
            .collect();

        GroupSummary {
            key_a: self.config.key_a.clone(),
            key_b: self.config.key_b.clone(),
            size_a: self.group_a().len(),
            size_b: self.group_b().len(),
            length: self.length,
            total_rows: self.identifiers.len(),
            alignment_mode: self.config.alignment_mode,
            partition_mode: self.config.partition_mode,
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::table::Record;
    use crate::DEFAULT_KEY_A;
    use image::DynamicImage;
    use std::fs;
    use tempfile::TempDir;

    /// Transform that keeps only the image width, enough to tell images apart
    fn width(img: DynamicImage) -> Result<u32> {
        Ok(img.width())
    }

    type WidthFn = fn(DynamicImage) -> Result<u32>;

    fn toy_table() -> LabelTable {
        LabelTable::from_records(vec![
            Record::new("img1.png", Some("No Finding")),
            Record::new("img2.png", Some("Pneumonia")),
            Record::new("img3.png", Some("Pneumonia|Edema")),
        ])
    }

    /// 3 rows in A, 5 rows in B, interleaved with noise
    fn larger_table() -> LabelTable {
        let mut records = Vec::new();
        for i in 0..5 {
            if i < 3 {
                records.push(Record::new(format!("a{i}.png"), Some("No Finding")));
            }
            records.push(Record::new(format!("b{i}.png"), Some("Pneumonia")));
            records.push(Record::new(format!("n{i}.png"), Some("Effusion|Mass")));
        }
        LabelTable::from_records(records)
    }

    fn build(table: LabelTable, config: SamplerConfig) -> Result<LabelPartitionedSampler<WidthFn>> {
        LabelPartitionedSampler::from_table(table, config, width as WidthFn)
    }

    #[test]
    fn test_toy_table_exact_unaligned() {
        let config = SamplerConfig::default().with_alignment(AlignmentMode::Unaligned);
        let sampler = build(toy_table(), config).unwrap();

        assert_eq!(sampler.group_a(), ["img1.png".to_string()]);
        assert_eq!(sampler.group_b(), ["img2.png".to_string()]);
        assert_eq!(sampler.size(), 1);

        let pair = sampler.sample_identifiers(0);
        assert_eq!(pair.a, "img1.png");
        assert_eq!(pair.b, "img2.png");
    }

    #[test]
    fn test_size_is_max_of_groups() {
        let sampler = build(larger_table(), SamplerConfig::default()).unwrap();

        assert_eq!(sampler.group_a().len(), 3);
        assert_eq!(sampler.group_b().len(), 5);
        assert_eq!(sampler.size(), 5);
        for _ in 0..10 {
            sampler.sample_identifiers(2);
            assert_eq!(sampler.size(), 5);
        }
    }

    #[test]
    fn test_a_side_cycles_in_both_modes() {
        for mode in [AlignmentMode::Aligned, AlignmentMode::Unaligned] {
            let config = SamplerConfig::default().with_alignment(mode).with_seed(3);
            let sampler = build(larger_table(), config).unwrap();

            for index in 0..20 {
                let pair = sampler.sample_identifiers(index);
                assert_eq!(pair.a_index, index % 3);
                assert_eq!(pair.a, format!("a{}.png", index % 3));
            }
        }
    }

    #[test]
    fn test_unaligned_b_is_deterministic() {
        let config = SamplerConfig::default().with_alignment(AlignmentMode::Unaligned);
        let sampler = build(larger_table(), config).unwrap();

        for index in [0, 4, 5, 7, 1_000_003] {
            let first = sampler.sample_identifiers(index);
            let second = sampler.sample_identifiers(index);
            assert_eq!(first, second);
            assert_eq!(first.b_index, index % 5);
        }
    }

    #[test]
    fn test_aligned_b_varies_between_calls() {
        let sampler = build(larger_table(), SamplerConfig::default()).unwrap();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(sampler.sample_identifiers(0).b_index);
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_aligned_draws_are_roughly_uniform() {
        let config = SamplerConfig::default().with_seed(42);
        let sampler = build(larger_table(), config).unwrap();

        let draws = 5000;
        let mut counts = [0usize; 5];
        for i in 0..draws {
            counts[sampler.sample_identifiers(i).b_index] += 1;
        }

        // Expected 1000 per bucket
        for count in counts {
            assert!((850..=1150).contains(&count), "counts: {:?}", counts);
        }
    }

    #[test]
    fn test_seeded_sampler_is_reproducible() {
        let config = SamplerConfig::default().with_seed(11);
        let first = build(larger_table(), config.clone()).unwrap();
        let second = build(larger_table(), config).unwrap();

        let draws_a: Vec<usize> = (0..50).map(|i| first.sample_identifiers(i).b_index).collect();
        let draws_b: Vec<usize> = (0..50).map(|i| second.sample_identifiers(i).b_index).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_empty_group_a_fails_construction() {
        let config = SamplerConfig::default().with_keys("Hernia", "Pneumonia");
        let err = build(toy_table(), config).unwrap_err();
        assert!(matches!(err, SamplerError::EmptyGroup(ref key) if key == "Hernia"));
    }

    #[test]
    fn test_empty_group_b_fails_construction() {
        // "Edema" only appears inside a compound label
        let config = SamplerConfig::default().with_keys(DEFAULT_KEY_A, "Edema");
        assert!(matches!(
            build(toy_table(), config),
            Err(SamplerError::EmptyGroup(_))
        ));
    }

    #[test]
    fn test_exhaustive_mode_uses_constituent_labels() {
        let config = SamplerConfig::default()
            .with_keys(DEFAULT_KEY_A, "Edema")
            .with_partition(PartitionMode::Exhaustive)
            .with_alignment(AlignmentMode::Unaligned);
        let sampler = build(toy_table(), config).unwrap();

        assert_eq!(sampler.group_b(), ["img3.png".to_string()]);
        assert_eq!(sampler.groups().group_len("Pneumonia"), 2);
        assert_eq!(sampler.groups().num_groups(), 3);
        assert_eq!(sampler.size(), 1);
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let config = SamplerConfig::default().with_keys("Pneumonia", "Pneumonia");
        assert!(matches!(
            build(toy_table(), config),
            Err(SamplerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_summary() {
        let config = SamplerConfig::default().with_partition(PartitionMode::Exhaustive);
        let summary = build(toy_table(), config).unwrap().summary();

        assert_eq!(summary.size_a, 1);
        assert_eq!(summary.size_b, 2);
        assert_eq!(summary.length, 2);
        assert_eq!(summary.total_rows, 3);

        let pneumonia = summary.groups.iter().find(|g| g.name == "Pneumonia").unwrap();
        assert_eq!(pneumonia.members, 2);
        assert_eq!(pneumonia.single_label, Some(1));
    }

    #[test]
    fn test_sample_loads_and_transforms_both_images() {
        let temp_dir = TempDir::new().unwrap();
        image::GrayImage::new(11, 4)
            .save(temp_dir.path().join("img1.png"))
            .unwrap();
        image::GrayImage::new(22, 4)
            .save(temp_dir.path().join("img2.png"))
            .unwrap();

        let mut config = SamplerConfig::default().with_alignment(AlignmentMode::Unaligned);
        config.image_root = temp_dir.path().to_path_buf();
        let sampler = build(toy_table(), config).unwrap();

        let sample = sampler.sample(0).unwrap();
        assert_eq!(sample, PairedSample { a: 11, b: 22 });
        // Repeated indices reload from disk
        assert_eq!(sampler.sample(1).unwrap(), sample);
    }

    #[test]
    fn test_sample_missing_image_leaves_sampler_usable() {
        let temp_dir = TempDir::new().unwrap();
        image::GrayImage::new(11, 4)
            .save(temp_dir.path().join("img1.png"))
            .unwrap();

        let mut config = SamplerConfig::default();
        config.image_root = temp_dir.path().to_path_buf();
        let sampler = build(toy_table(), config).unwrap();

        assert!(matches!(
            sampler.sample(0),
            Err(SamplerError::ResourceLoad { .. })
        ));

        image::GrayImage::new(22, 4)
            .save(temp_dir.path().join("img2.png"))
            .unwrap();
        assert_eq!(sampler.sample(0).unwrap(), PairedSample { a: 11, b: 22 });
        assert_eq!(sampler.size(), 1);
    }

    #[test]
    fn test_new_reads_table_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let table_path = temp_dir.path().join("Data_toy.csv");
        fs::write(
            &table_path,
            "Image Index,Finding Labels\nimg1.png,No Finding\nimg2.png,Pneumonia\nimg3.png,Pneumonia|Edema\n",
        )
        .unwrap();

        let config = SamplerConfig::new(&table_path, temp_dir.path());
        let sampler = LabelPartitionedSampler::new(config, width as WidthFn).unwrap();
        assert_eq!(sampler.size(), 1);
        assert_eq!(sampler.identifiers().len(), 3);
    }

    #[test]
    fn test_new_missing_table() {
        let config = SamplerConfig::new("/nonexistent/labels.csv", "/nonexistent");
        assert!(matches!(
            LabelPartitionedSampler::new(config, width as WidthFn),
            Err(SamplerError::ResourceLoad { .. })
        ));
    }

    #[test]
    fn test_concurrent_sampling() {
        let config = SamplerConfig::default().with_seed(5);
        let sampler = build(larger_table(), config).unwrap();

        std::thread::scope(|s| {
            for t in 0..4 {
                let sampler = &sampler;
                s.spawn(move || {
                    for i in 0..100 {
                        let pair = sampler.sample_identifiers(t * 100 + i);
                        assert!(pair.b_index < 5);
                    }
                });
            }
        });
    }
}
