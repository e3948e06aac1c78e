//! In-memory workspace for tests, manifests, and embedding.
//!
//! [`InMemoryWorkspace`] keeps every container in a `Vec` behind a
//! `RwLock`. Containers are appended in load order and their position is
//! their [`ContainerId`].

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use assetkit_types::{
    ClassId, ContainerId, DependencyRecord, Guid128, ObjectKey, ObjectReference, PathId,
};

use crate::container::{Container, ObjectHandle};
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::traits::Workspace;
use crate::value::ValueField;

#[derive(Clone, Debug)]
struct StoredObject {
    class_id: ClassId,
    fields: ValueField,
}

#[derive(Clone, Debug)]
struct StoredContainer {
    info: Container,
    objects: BTreeMap<PathId, StoredObject>,
}

/// An in-memory implementation of [`Workspace`].
#[derive(Debug, Default)]
pub struct InMemoryWorkspace {
    containers: RwLock<Vec<StoredContainer>>,
}

impl InMemoryWorkspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> WorkspaceResult<RwLockReadGuard<'_, Vec<StoredContainer>>> {
        self.containers
            .read()
            .map_err(|e| WorkspaceError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> WorkspaceResult<RwLockWriteGuard<'_, Vec<StoredContainer>>> {
        self.containers
            .write()
            .map_err(|e| WorkspaceError::LockPoisoned(e.to_string()))
    }

    /// Load an empty container and return its id.
    pub fn add_container(
        &self,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> WorkspaceResult<ContainerId> {
        let mut containers = self.write()?;
        let id = ContainerId(containers.len() as u32);
        containers.push(StoredContainer {
            info: Container {
                id,
                name: name.into(),
                path: path.into(),
                guid: None,
                dependencies: Vec::new(),
                dependency_count: 0,
            },
            objects: BTreeMap::new(),
        });
        Ok(id)
    }

    /// Assign a GUID to a loaded container.
    pub fn set_guid(&self, id: ContainerId, guid: Option<Guid128>) -> WorkspaceResult<()> {
        let mut containers = self.write()?;
        let stored = containers
            .get_mut(id.index())
            .ok_or(WorkspaceError::ContainerNotFound(id))?;
        stored.info.guid = guid;
        Ok(())
    }

    /// Set a container's dependency list together with its recorded count,
    /// as a parser would when loading the container header.
    pub fn load_dependencies(
        &self,
        id: ContainerId,
        dependencies: Vec<DependencyRecord>,
        dependency_count: usize,
    ) -> WorkspaceResult<()> {
        let mut containers = self.write()?;
        let stored = containers
            .get_mut(id.index())
            .ok_or(WorkspaceError::ContainerNotFound(id))?;
        stored.info.dependencies = dependencies;
        stored.info.dependency_count = dependency_count;
        Ok(())
    }

    /// Insert (or overwrite) an object.
    pub fn insert_object(
        &self,
        id: ContainerId,
        path_id: impl Into<PathId>,
        class_id: ClassId,
        fields: ValueField,
    ) -> WorkspaceResult<ObjectHandle> {
        let path_id = path_id.into();
        let mut containers = self.write()?;
        let stored = containers
            .get_mut(id.index())
            .ok_or(WorkspaceError::ContainerNotFound(id))?;
        stored
            .objects
            .insert(path_id, StoredObject { class_id, fields });
        Ok(ObjectHandle::new(ObjectKey::new(id, path_id), class_id))
    }

    /// Every object of a container with its value tree, in path id order.
    pub fn objects_with_fields(
        &self,
        id: ContainerId,
    ) -> WorkspaceResult<Vec<(ObjectHandle, ValueField)>> {
        let containers = self.read()?;
        let stored = containers
            .get(id.index())
            .ok_or(WorkspaceError::ContainerNotFound(id))?;
        Ok(stored
            .objects
            .iter()
            .map(|(path_id, obj)| {
                (
                    ObjectHandle::new(ObjectKey::new(id, *path_id), obj.class_id),
                    obj.fields.clone(),
                )
            })
            .collect())
    }

    /// Number of loaded containers.
    pub fn len(&self) -> WorkspaceResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns `true` if no container is loaded.
    pub fn is_empty(&self) -> WorkspaceResult<bool> {
        Ok(self.read()?.is_empty())
    }
}

impl Workspace for InMemoryWorkspace {
    fn loaded_containers(&self) -> WorkspaceResult<Vec<Container>> {
        Ok(self.read()?.iter().map(|c| c.info.clone()).collect())
    }

    fn container(&self, id: ContainerId) -> WorkspaceResult<Container> {
        self.read()?
            .get(id.index())
            .map(|c| c.info.clone())
            .ok_or(WorkspaceError::ContainerNotFound(id))
    }

    fn objects(&self, id: ContainerId) -> WorkspaceResult<Vec<ObjectHandle>> {
        let containers = self.read()?;
        let stored = containers
            .get(id.index())
            .ok_or(WorkspaceError::ContainerNotFound(id))?;
        Ok(stored
            .objects
            .iter()
            .map(|(path_id, obj)| ObjectHandle::new(ObjectKey::new(id, *path_id), obj.class_id))
            .collect())
    }

    fn base_field(&self, object: &ObjectHandle) -> WorkspaceResult<ValueField> {
        let containers = self.read()?;
        let stored = containers
            .get(object.container().index())
            .ok_or(WorkspaceError::ContainerNotFound(object.container()))?;
        stored
            .objects
            .get(&object.path_id())
            .map(|obj| obj.fields.clone())
            .ok_or(WorkspaceError::ObjectNotFound {
                container: object.container(),
                path_id: object.path_id(),
            })
    }

    fn resolve_reference(
        &self,
        from: ContainerId,
        reference: &ObjectReference,
    ) -> WorkspaceResult<ObjectHandle> {
        let unresolved = || WorkspaceError::UnresolvedReference {
            from,
            reference: *reference,
        };

        let containers = self.read()?;
        let source = containers
            .get(from.index())
            .ok_or(WorkspaceError::ContainerNotFound(from))?;
        if reference.is_null() || reference.file_id < 0 {
            return Err(unresolved());
        }

        let target = match reference.dependency_index() {
            None => source,
            Some(index) => {
                let record = source.info.dependencies.get(index).ok_or_else(unresolved)?;
                containers
                    .iter()
                    .find(|c| c.info.matches(record))
                    .ok_or_else(unresolved)?
            }
        };

        let object = target.objects.get(&reference.path_id).ok_or_else(unresolved)?;
        debug!(
            from = %from,
            %reference,
            target = %target.info.id,
            "resolved reference"
        );
        Ok(ObjectHandle::new(
            ObjectKey::new(target.info.id, reference.path_id),
            object.class_id,
        ))
    }

    fn replace_dependencies(
        &self,
        id: ContainerId,
        dependencies: Vec<DependencyRecord>,
    ) -> WorkspaceResult<()> {
        let mut containers = self.write()?;
        let stored = containers
            .get_mut(id.index())
            .ok_or(WorkspaceError::ContainerNotFound(id))?;
        stored.info.dependency_count = dependencies.len();
        stored.info.dependencies = dependencies;
        debug!(container = %id, count = stored.info.dependency_count, "replaced dependencies");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two containers: `level0` depends on `sharedassets0.assets`.
    fn two_files() -> (InMemoryWorkspace, ContainerId, ContainerId) {
        let ws = InMemoryWorkspace::new();
        let level = ws.add_container("level0", "Data/level0").unwrap();
        let shared = ws
            .add_container("sharedassets0.assets", "Data/sharedassets0.assets")
            .unwrap();
        ws.load_dependencies(
            level,
            vec![DependencyRecord::path("sharedassets0.assets")],
            1,
        )
        .unwrap();
        ws.insert_object(level, 1, ClassId::GAME_OBJECT, ValueField::from("go"))
            .unwrap();
        ws.insert_object(shared, 77, ClassId::MATERIAL, ValueField::from("mat"))
            .unwrap();
        (ws, level, shared)
    }

    #[test]
    fn add_container_assigns_load_order_ids() {
        let (ws, level, shared) = two_files();
        assert_eq!(level, ContainerId(0));
        assert_eq!(shared, ContainerId(1));
        assert_eq!(ws.len().unwrap(), 2);
        assert!(!ws.is_empty().unwrap());
        let names: Vec<String> = ws
            .loaded_containers()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["level0", "sharedassets0.assets"]);
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let ws = std::sync::Arc::new(InMemoryWorkspace::new());
        let holder = std::sync::Arc::clone(&ws);
        let _ = std::thread::spawn(move || {
            let _guard = holder.containers.write().unwrap();
            panic!("writer died");
        })
        .join();

        assert!(matches!(ws.len(), Err(WorkspaceError::LockPoisoned(_))));
        assert!(matches!(ws.is_empty(), Err(WorkspaceError::LockPoisoned(_))));
        assert!(ws.loaded_containers().is_err());
    }

    #[test]
    fn resolve_local_reference() {
        let (ws, level, _) = two_files();
        let handle = ws
            .resolve_reference(level, &ObjectReference::local(1))
            .unwrap();
        assert_eq!(handle.key, ObjectKey::new(level, 1));
        assert_eq!(handle.class_id, ClassId::GAME_OBJECT);
    }

    #[test]
    fn resolve_foreign_reference_through_dependency_list() {
        let (ws, level, shared) = two_files();
        let (handle, field) = ws
            .resolve_field(level, &ObjectReference::new(1, 77))
            .unwrap();
        assert_eq!(handle.key, ObjectKey::new(shared, 77));
        assert_eq!(field.as_str(), Some("mat"));
    }

    #[test]
    fn resolve_foreign_reference_by_guid() {
        let (ws, level, shared) = two_files();
        let guid = Guid128::new(0xab, 0xcd);
        ws.set_guid(shared, Some(guid)).unwrap();
        ws.load_dependencies(level, vec![DependencyRecord::guid(guid)], 1)
            .unwrap();
        let handle = ws
            .resolve_reference(level, &ObjectReference::new(1, 77))
            .unwrap();
        assert_eq!(handle.container(), shared);
    }

    #[test]
    fn unresolved_references() {
        let (ws, level, _) = two_files();
        for reference in [
            ObjectReference::local(0),
            ObjectReference::local(999),
            ObjectReference::new(2, 77),
            ObjectReference::new(-1, 77),
        ] {
            let err = ws.resolve_reference(level, &reference).unwrap_err();
            assert!(
                matches!(err, WorkspaceError::UnresolvedReference { .. }),
                "expected UnresolvedReference for {reference}, got: {err}"
            );
        }
    }

    #[test]
    fn dependency_on_unloaded_file_is_unresolved() {
        let (ws, level, _) = two_files();
        ws.load_dependencies(level, vec![DependencyRecord::path("missing.assets")], 1)
            .unwrap();
        assert!(ws
            .resolve_reference(level, &ObjectReference::new(1, 77))
            .is_err());
    }

    #[test]
    fn replace_dependencies_updates_count() {
        let (ws, level, _) = two_files();
        ws.replace_dependencies(
            level,
            vec![
                DependencyRecord::path("a.assets"),
                DependencyRecord::path("b.assets"),
            ],
        )
        .unwrap();
        let c = ws.container(level).unwrap();
        assert_eq!(c.dependencies.len(), 2);
        assert_eq!(c.dependency_count, 2);
    }

    #[test]
    fn objects_are_listed_in_path_id_order() {
        let ws = InMemoryWorkspace::new();
        let id = ws.add_container("f", "f").unwrap();
        for path_id in [30, -2, 10] {
            ws.insert_object(id, path_id, ClassId::TRANSFORM, ValueField::Null)
                .unwrap();
        }
        let ids: Vec<i64> = ws.objects(id).unwrap().iter().map(|h| h.path_id().0).collect();
        assert_eq!(ids, vec![-2, 10, 30]);
    }

    #[test]
    fn unknown_container_errors() {
        let ws = InMemoryWorkspace::new();
        assert!(matches!(
            ws.container(ContainerId(4)),
            Err(WorkspaceError::ContainerNotFound(ContainerId(4)))
        ));
        assert!(ws.objects(ContainerId(0)).is_err());
    }
}
