//! Label Table Loader
//!
//! Reads the row-oriented label file (one image per row) into an immutable
//! [`LabelTable`]. Only the identifier and label columns are kept.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::TableColumns;
use crate::utils::error::{Result, ResultExt, SamplerError};

/// One row of the label table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Image filename, relative to the image root
    pub identifier: String,
    /// Raw label cell, `None` when the cell is empty
    pub label: Option<String>,
}

impl Record {
    pub fn new(identifier: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            identifier: identifier.into(),
            label: label.filter(|l| !l.is_empty()).map(str::to_string),
        }
    }
}

/// Ordered, read-only sequence of records
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    /// Where the table was read from (empty for in-memory tables)
    source: PathBuf,
    records: Vec<Record>,
}

impl LabelTable {
    /// Build a table from records already in memory
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            source: PathBuf::new(),
            records,
        }
    }

    /// Load a CSV label table from disk
    pub fn from_csv(path: &Path, columns: &TableColumns) -> Result<Self> {
        info!("Loading label table from: {:?}", path);

        let file = std::fs::File::open(path).resource_context(path)?;
        let mut table = Self::from_reader(file, columns, path)?;
        table.source = path.to_path_buf();

        info!("Loaded {} records", table.len());
        Ok(table)
    }

    /// Parse CSV from any reader; `source` is only used in error messages
    pub fn from_reader<R: Read>(reader: R, columns: &TableColumns, source: &Path) -> Result<Self> {
        let delimiter = u8::try_from(columns.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                SamplerError::InvalidConfiguration(format!(
                    "delimiter '{}' is not a single ASCII character",
                    columns.delimiter
                ))
            })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers().resource_context(source)?.clone();
        let column_index = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                SamplerError::resource(source, format!("missing column '{}'", name))
            })
        };
        let id_idx = column_index(&columns.identifier)?;
        let label_idx = column_index(&columns.label)?;
        debug!(
            "Identifier column '{}' at {}, label column '{}' at {}",
            columns.identifier, id_idx, columns.label, label_idx
        );

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let row_data = result.resource_context(source)?;

            let identifier = row_data.get(id_idx).unwrap_or_default();
            if identifier.is_empty() {
                // +2: header line and 1-based numbering
                return Err(SamplerError::resource(
                    source,
                    format!("line {} has an empty identifier", row + 2),
                ));
            }

            records.push(Record::new(identifier, row_data.get(label_idx)));
        }

        Ok(Self {
            source: PathBuf::new(),
            records,
        })
    }

    /// Path the table was read from
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
