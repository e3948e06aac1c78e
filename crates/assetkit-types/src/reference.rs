use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::PathId;

/// A pointer embedded in object data: a foreign-file index and a path id.
///
/// `file_id` 0 means the container holding the referencing object; any
/// other value is a 1-based index into that container's dependency list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectReference {
    pub file_id: i32,
    pub path_id: PathId,
}

impl ObjectReference {
    pub fn new(file_id: i32, path_id: impl Into<PathId>) -> Self {
        Self {
            file_id,
            path_id: path_id.into(),
        }
    }

    /// A reference into the same container.
    pub fn local(path_id: impl Into<PathId>) -> Self {
        Self::new(0, path_id)
    }

    /// Returns `true` if this reference points at nothing.
    pub fn is_null(&self) -> bool {
        self.path_id.is_null()
    }

    /// Returns `true` if this reference stays within its own container.
    pub fn is_local(&self) -> bool {
        self.file_id == 0
    }

    /// Position of the targeted record in the dependency list, if the
    /// reference is foreign.
    pub fn dependency_index(&self) -> Option<usize> {
        if self.file_id > 0 {
            Some(self.file_id as usize - 1)
        } else {
            None
        }
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(file {}, path {})", self.file_id, self.path_id)
    }
}
