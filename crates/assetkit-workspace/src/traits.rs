//! The [`Workspace`] trait defining the loaded-container interface.
//!
//! Any backend (in-memory, a binary container parser, a remote session)
//! implements this trait to expose its containers to dependency editing and
//! hierarchy reconstruction.

use assetkit_types::{ContainerId, DependencyRecord, ObjectReference};

use crate::container::{Container, ObjectHandle};
use crate::error::WorkspaceResult;
use crate::value::ValueField;

/// Access to a set of loaded containers.
///
/// Implementations must be thread-safe (`Send + Sync`). Reads return owned
/// snapshots so callers never alias workspace state; the only mutation is
/// [`replace_dependencies`](Workspace::replace_dependencies).
pub trait Workspace: Send + Sync {
    /// Every loaded container, in load order.
    fn loaded_containers(&self) -> WorkspaceResult<Vec<Container>>;

    /// Snapshot of a single container.
    fn container(&self, id: ContainerId) -> WorkspaceResult<Container>;

    /// Every object in a container, in ascending path id order.
    fn objects(&self, id: ContainerId) -> WorkspaceResult<Vec<ObjectHandle>>;

    /// The value tree of an object.
    ///
    /// Backends that parse lazily may do so here.
    fn base_field(&self, object: &ObjectHandle) -> WorkspaceResult<ValueField>;

    /// Resolve a reference found in data owned by container `from`.
    ///
    /// Fails with [`UnresolvedReference`](crate::WorkspaceError::UnresolvedReference)
    /// when the reference is null, its file index is out of range, its
    /// dependency names no loaded container, or the target object is absent.
    fn resolve_reference(
        &self,
        from: ContainerId,
        reference: &ObjectReference,
    ) -> WorkspaceResult<ObjectHandle>;

    /// Replace a container's dependency list and set its recorded count to
    /// the new length.
    fn replace_dependencies(
        &self,
        id: ContainerId,
        dependencies: Vec<DependencyRecord>,
    ) -> WorkspaceResult<()>;

    /// Resolve a reference and fetch the target's value tree.
    fn resolve_field(
        &self,
        from: ContainerId,
        reference: &ObjectReference,
    ) -> WorkspaceResult<(ObjectHandle, ValueField)> {
        let handle = self.resolve_reference(from, reference)?;
        let field = self.base_field(&handle)?;
        Ok((handle, field))
    }

    /// Find a loaded container by name or file name, ignoring ASCII case.
    fn find_container(&self, name: &str) -> WorkspaceResult<Option<Container>> {
        Ok(self.loaded_containers()?.into_iter().find(|c| {
            c.name.eq_ignore_ascii_case(name) || c.file_name().eq_ignore_ascii_case(name)
        }))
    }
}
