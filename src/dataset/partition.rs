//! Label Partitioning
//!
//! Turns a [`LabelTable`] into a [`GroupIndex`]: for each group label, the
//! identifiers of the rows that belong to it, in table order.
//!
//! ## Modes
//!
//! - **Exact**: only the two configured keys are materialized. A row belongs
//!   to a group when its whole label equals the key, so `"Pneumonia|Edema"`
//!   is in neither `"Pneumonia"` nor `"Edema"`.
//! - **Exhaustive**: labels are split on `|` and every distinct constituent
//!   becomes a group. Multi-label rows join every one of their groups.
//!
//! Both modes consume the table and hand back an identifier-only projection;
//! the label column does not survive partitioning.

use std::collections::HashMap;

use tracing::{debug, info};

use super::table::{LabelTable, Record};
use crate::config::PartitionMode;

/// Separator between labels in a compound label cell
pub const LABEL_SEPARATOR: char = '|';

/// Group name → ordered identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndex {
    groups: HashMap<String, Vec<String>>,
    /// Group names in the order they were first seen
    order: Vec<String>,
}

impl GroupIndex {
    fn insert_group(&mut self, name: &str) -> &mut Vec<String> {
        if !self.groups.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.groups.entry(name.to_string()).or_default()
    }

    /// Identifiers of a group, `None` if the group was never materialized
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Number of identifiers in a group (0 when absent)
    pub fn group_len(&self, name: &str) -> usize {
        self.groups.get(name).map_or(0, Vec::len)
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Group names in discovery order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn num_groups(&self) -> usize {
        self.order.len()
    }
}

/// Output of partitioning a table
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub groups: GroupIndex,
    /// Identifier column of the consumed table, in row order
    pub identifiers: Vec<String>,
    /// Rows whose label is exactly one (non-compound) value, per label.
    /// Only filled in exhaustive mode.
    pub single_label_counts: HashMap<String, usize>,
}

/// Partition `table` according to `mode`
pub fn partition(table: LabelTable, mode: PartitionMode, key_a: &str, key_b: &str) -> Partition {
    let mut partition = match mode {
        PartitionMode::Exact => Partition {
            groups: partition_exact(table.records(), key_a, key_b),
            ..Default::default()
        },
        PartitionMode::Exhaustive => {
            let (groups, single_label_counts) = partition_exhaustive(table.records());
            Partition {
                groups,
                single_label_counts,
                ..Default::default()
            }
        }
    };

    partition.identifiers = table
        .records()
        .iter()
        .map(|r| r.identifier.clone())
        .collect();

    info!(
        "Partitioned {} rows ({} mode) into {} groups: '{}' = {}, '{}' = {}",
        partition.identifiers.len(),
        mode,
        partition.groups.num_groups(),
        key_a,
        partition.groups.group_len(key_a),
        key_b,
        partition.groups.group_len(key_b)
    );

    partition
}

/// Single pass, two comparisons per row. Both keys are always present in the
/// result, possibly empty.
pub fn partition_exact(records: &[Record], key_a: &str, key_b: &str) -> GroupIndex {
    let mut index = GroupIndex::default();
    index.insert_group(key_a);
    index.insert_group(key_b);

    for record in records {
        let Some(label) = record.label.as_deref() else {
            continue;
        };

        if label == key_a {
            index.insert_group(key_a).push(record.identifier.clone());
        } else if label == key_b {
            index.insert_group(key_b).push(record.identifier.clone());
        }
    }

    index
}

/// Single read-only pass building every group present in the data
pub fn partition_exhaustive(records: &[Record]) -> (GroupIndex, HashMap<String, usize>) {
    let mut index = GroupIndex::default();
    let mut single_label_counts: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(label) = record.label.as_deref() else {
            continue;
        };

        if !label.contains(LABEL_SEPARATOR) {
            *single_label_counts.entry(label.to_string()).or_default() += 1;
            index.insert_group(label).push(record.identifier.clone());
            continue;
        }

        let mut seen: Vec<&str> = Vec::new();
        for part in label.split(LABEL_SEPARATOR).filter(|p| !p.is_empty()) {
            // "X|X" joins group X once
            if seen.contains(&part) {
                continue;
            }
            seen.push(part);
            index.insert_group(part).push(record.identifier.clone());
        }
    }

    debug!("Discovered {} distinct labels", index.num_groups());

    (index, single_label_counts)
}
