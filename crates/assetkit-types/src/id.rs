use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a container within a workspace.
///
/// Containers are numbered in load order. The number is stable for the
/// lifetime of the workspace and never reused while the container is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(pub u32);

impl ContainerId {
    /// Position of this container in the workspace's load order.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an object, unique within its container.
///
/// A `PathId` of zero is the null object: references carrying it point at
/// nothing.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PathId(pub i64);

impl PathId {
    /// The null path id.
    pub const NULL: PathId = PathId(0);

    /// Returns `true` if this is the null path id.
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PathId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Identity of a loaded object: its owning container and its path id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub container: ContainerId,
    pub path_id: PathId,
}

impl ObjectKey {
    pub fn new(container: ContainerId, path_id: impl Into<PathId>) -> Self {
        Self {
            container,
            path_id: path_id.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.container, self.path_id)
    }
}

/// Selection scope for operations that can target one container or the
/// whole workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerScope {
    /// Every loaded container.
    All,
    /// A single container.
    Container(ContainerId),
}

impl ContainerScope {
    /// The single container this scope names, if any.
    pub fn container(&self) -> Option<ContainerId> {
        match self {
            Self::All => None,
            Self::Container(id) => Some(*id),
        }
    }
}

impl From<ContainerId> for ContainerScope {
    fn from(id: ContainerId) -> Self {
        Self::Container(id)
    }
}
