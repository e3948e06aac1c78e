use std::fmt;

use serde::{Deserialize, Serialize};

use assetkit_types::{ClassId, ContainerId, DependencyRecord, Guid128, ObjectKey, PathId};

/// Snapshot of a loaded container's identity and dependency list.
///
/// Snapshots are owned copies: mutating one never touches the workspace.
/// The only way to change a container's dependency list is
/// [`Workspace::replace_dependencies`](crate::Workspace::replace_dependencies).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    /// Display name, usually the file name the container was loaded from.
    pub name: String,
    /// Path the container was loaded from.
    pub path: String,
    pub guid: Option<Guid128>,
    /// Ordered dependency list. Foreign-file index `n` names entry `n - 1`.
    pub dependencies: Vec<DependencyRecord>,
    /// Dependency count as recorded in the container header.
    pub dependency_count: usize,
}

impl Container {
    /// Final component of the container's path, falling back to its name.
    pub fn file_name(&self) -> &str {
        let source = if self.path.is_empty() {
            &self.name
        } else {
            &self.path
        };
        source.rsplit(['/', '\\']).next().unwrap_or(source)
    }

    /// Returns `true` if a dependency record names this container.
    ///
    /// GUID records match the container's GUID. Path records match the
    /// container's file name, ignoring ASCII case.
    pub fn matches(&self, record: &DependencyRecord) -> bool {
        match record {
            DependencyRecord::Guid(guid) => self.guid.as_ref() == Some(guid),
            DependencyRecord::Path(_) => record
                .file_name()
                .map(|name| {
                    name.eq_ignore_ascii_case(self.file_name())
                        || name.eq_ignore_ascii_case(&self.name)
                })
                .unwrap_or(false),
        }
    }
}

/// Lightweight handle to a loaded object.
///
/// The value tree is fetched separately through
/// [`Workspace::base_field`](crate::Workspace::base_field).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle {
    pub key: ObjectKey,
    pub class_id: ClassId,
}

impl ObjectHandle {
    pub fn new(key: ObjectKey, class_id: ClassId) -> Self {
        Self { key, class_id }
    }

    pub fn container(&self) -> ContainerId {
        self.key.container
    }

    pub fn path_id(&self) -> PathId {
        self.key.path_id
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.class_id, self.key)
    }
}
