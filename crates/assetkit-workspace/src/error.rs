use assetkit_types::{ContainerId, ObjectReference, PathId};

/// Errors from workspace operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// No container with this id is loaded.
    #[error("container not loaded: {0}")]
    ContainerNotFound(ContainerId),

    /// The container holds no object with this path id.
    #[error("object {path_id} not found in container {container}")]
    ObjectNotFound {
        container: ContainerId,
        path_id: PathId,
    },

    /// An object reference could not be resolved to a loaded object.
    #[error("unresolved reference {reference} from container {from}")]
    UnresolvedReference {
        from: ContainerId,
        reference: ObjectReference,
    },

    /// A value tree lacks a field the caller required.
    #[error("missing field: {0}")]
    MissingField(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error while reading or writing a manifest.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding workspace state was poisoned.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
