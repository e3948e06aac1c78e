//! Error types for hierarchy building and export.

use std::path::PathBuf;

use assetkit_types::ObjectKey;
use assetkit_workspace::WorkspaceError;

/// Errors that can occur while building or exporting a hierarchy.
///
/// Per-node problems during a build are recorded in the forest instead of
/// being returned; these errors cover whole-operation failures.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    /// The workspace failed outside of per-node resolution.
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// The object does not own a component list.
    #[error("not a display object: {0}")]
    NotDisplayObject(ObjectKey),

    /// Writing an export artifact or directory failed.
    #[error("failed to write {path:?}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value tree could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for hierarchy results.
pub type HierarchyResult<T> = Result<T, HierarchyError>;
