//! Error types for dependency editing.

use thiserror::Error;

use assetkit_types::ContainerId;
use assetkit_workspace::WorkspaceError;

/// Errors that can occur while editing a dependency list.
///
/// All of these are local and recoverable: the session stays usable and
/// nothing has been modified.
#[derive(Debug, Error)]
pub enum DepsError {
    /// The selected position cannot be edited this way.
    #[error("invalid selection at position {index}: {reason}")]
    InvalidSelection { index: usize, reason: String },

    /// The operation targeted every container instead of a single one.
    #[error("{operation} needs a single container, not the entire workspace")]
    InvalidTarget { operation: &'static str },

    /// The container is not part of this editing session.
    #[error("container not in session: {0}")]
    UnknownContainer(ContainerId),

    /// The workspace failed while loading or committing.
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
}

impl DepsError {
    pub(crate) fn selection(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSelection {
            index,
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for editing operations.
pub type Result<T> = std::result::Result<T, DepsError>;
