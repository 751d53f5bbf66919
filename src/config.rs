//! Sampler Configuration Module
//!
//! Construction parameters for a [`LabelPartitionedSampler`](crate::LabelPartitionedSampler):
//! where the label table and images live, which two labels form groups A and B,
//! and how groups are built and paired.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::error::{Result, SamplerError};
use crate::{DEFAULT_KEY_A, DEFAULT_KEY_B};

/// How the B side of a pair is chosen
///
/// The names follow the original dataset flag: the default `Aligned` mode draws
/// B uniformly at random on every call, while `Unaligned` walks both groups with
/// the same index modulo each group's length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// B drawn uniformly at random per call
    #[default]
    Aligned,
    /// B taken at `index mod |B|`
    Unaligned,
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentMode::Aligned => write!(f, "aligned"),
            AlignmentMode::Unaligned => write!(f, "unaligned"),
        }
    }
}

impl FromStr for AlignmentMode {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "aligned" => Ok(AlignmentMode::Aligned),
            "unaligned" => Ok(AlignmentMode::Unaligned),
            other => Err(SamplerError::InvalidConfiguration(format!(
                "unknown alignment mode '{}' (expected 'aligned' or 'unaligned')",
                other
            ))),
        }
    }
}

/// How rows are partitioned into groups
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PartitionMode {
    /// Only the two configured keys, matched against the whole label
    #[default]
    Exact,
    /// Every constituent label of every row becomes its own group
    Exhaustive,
}

impl fmt::Display for PartitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionMode::Exact => write!(f, "exact"),
            PartitionMode::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

impl FromStr for PartitionMode {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(PartitionMode::Exact),
            "exhaustive" => Ok(PartitionMode::Exhaustive),
            other => Err(SamplerError::InvalidConfiguration(format!(
                "unknown partition mode '{}' (expected 'exact' or 'exhaustive')",
                other
            ))),
        }
    }
}

/// Column layout of the label table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableColumns {
    /// Header of the column holding image filenames
    pub identifier: String,
    /// Header of the column holding (possibly `|`-joined) labels
    pub label: String,
    /// Field delimiter, must be a single ASCII character
    pub delimiter: char,
}

impl Default for TableColumns {
    fn default() -> Self {
        Self {
            identifier: "Image Index".to_string(),
            label: "Finding Labels".to_string(),
            delimiter: ',',
        }
    }
}

/// Full sampler configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SamplerConfig {
    /// Path to the CSV label table
    pub table_path: PathBuf,
    /// Directory that image identifiers are resolved against
    pub image_root: PathBuf,
    /// Label of group A
    pub key_a: String,
    /// Label of group B
    pub key_b: String,
    /// Pairing policy for the B side
    pub alignment_mode: AlignmentMode,
    /// Group construction policy
    pub partition_mode: PartitionMode,
    /// Table column layout
    pub columns: TableColumns,
    /// Seed for reproducible random pairing (thread-local RNG when absent)
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from("data/Data_toy.csv"),
            image_root: PathBuf::from("data/images"),
            key_a: DEFAULT_KEY_A.to_string(),
            key_b: DEFAULT_KEY_B.to_string(),
            alignment_mode: AlignmentMode::default(),
            partition_mode: PartitionMode::default(),
            columns: TableColumns::default(),
            seed: None,
        }
    }
}

impl SamplerConfig {
    /// Create a config for the given table and image root with default keys and modes
    pub fn new(table_path: impl Into<PathBuf>, image_root: impl Into<PathBuf>) -> Self {
        Self {
            table_path: table_path.into(),
            image_root: image_root.into(),
            ..Default::default()
        }
    }

    /// Set the two group keys
    pub fn with_keys(mut self, key_a: impl Into<String>, key_b: impl Into<String>) -> Self {
        self.key_a = key_a.into();
        self.key_b = key_b.into();
        self
    }

    pub fn with_alignment(mut self, mode: AlignmentMode) -> Self {
        self.alignment_mode = mode;
        self
    }

    pub fn with_partition(mut self, mode: PartitionMode) -> Self {
        self.partition_mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the configuration before any resource is touched
    pub fn validate(&self) -> Result<()> {
        if self.key_a.is_empty() || self.key_b.is_empty() {
            return Err(SamplerError::InvalidConfiguration(
                "group keys must not be empty".to_string(),
            ));
        }

        if self.key_a == self.key_b {
            return Err(SamplerError::InvalidConfiguration(format!(
                "group keys must differ, both are '{}'",
                self.key_a
            )));
        }

        let columns = &self.columns;
        if columns.identifier.is_empty() || columns.label.is_empty() {
            return Err(SamplerError::InvalidConfiguration(
                "column names must not be empty".to_string(),
            ));
        }

        if columns.identifier == columns.label {
            return Err(SamplerError::InvalidConfiguration(format!(
                "identifier and label columns must differ, both are '{}'",
                columns.identifier
            )));
        }

        if !columns.delimiter.is_ascii() {
            return Err(SamplerError::InvalidConfiguration(format!(
                "delimiter '{}' is not a single ASCII character",
                columns.delimiter
            )));
        }

        Ok(())
    }

    /// Parse a TOML document; missing fields take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            SamplerError::InvalidConfiguration(format!("Failed to parse config: {e}"))
        })
    }

    /// Load a TOML config file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SamplerError::resource(path, format!("Failed to read config: {e}")))?;

        Self::from_toml_str(&content)
    }
}
