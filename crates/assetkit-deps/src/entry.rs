//! Display snapshots of dependency lists.

use std::fmt;

use serde::{Deserialize, Serialize};

use assetkit_types::{ContainerId, DependencyRecord};

/// One row of a dependency list snapshot.
///
/// Rows are numbered the way foreign-file indices count: row 0 is the
/// container itself and row `n` is dependency `n - 1`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub index: usize,
    pub label: EntryLabel,
}

/// What a snapshot row shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryLabel {
    /// The synthetic self row at position 0.
    SelfFile { name: String },
    /// A real dependency record.
    Dependency(DependencyRecord),
    /// A loaded container, listed when the scope is the whole workspace.
    Container { id: ContainerId, name: String },
}

impl DependencyEntry {
    /// Returns `true` if this row is a real dependency record.
    pub fn is_dependency(&self) -> bool {
        matches!(self.label, EntryLabel::Dependency(_))
    }

    /// The record behind this row, if any.
    pub fn record(&self) -> Option<&DependencyRecord> {
        match &self.label {
            EntryLabel::Dependency(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Display for DependencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            EntryLabel::SelfFile { name } | EntryLabel::Container { name, .. } => {
                write!(f, "{} - {}", self.index, name)
            }
            EntryLabel::Dependency(record) => write!(f, "{} - {}", self.index, record),
        }
    }
}
