//! JSON workspace manifests.
//!
//! A manifest is an already-parsed snapshot of a set of containers: their
//! identity, dependency lists, and object value trees. It is the exchange
//! format between a container parser and the rest of assetkit.
//!
//! ```text
//! {
//!   "containers": [
//!     {
//!       "name": "level0",
//!       "path": "Data/level0",
//!       "dependencies": [ {"path": "sharedassets0.assets"} ],
//!       "objects": [ {"path_id": 1, "class_id": 1, "fields": {"m_Name": "Root"}} ]
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use assetkit_types::{ClassId, DependencyRecord, Guid128, PathId};

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::memory::InMemoryWorkspace;
use crate::traits::Workspace;
use crate::value::ValueField;

/// A serialized set of containers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceManifest {
    pub containers: Vec<ContainerManifest>,
}

/// One container in a manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContainerManifest {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid128>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
    /// Recorded dependency count; the list length when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_count: Option<usize>,
    #[serde(default)]
    pub objects: Vec<ObjectManifest>,
}

/// One object in a manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectManifest {
    pub path_id: PathId,
    pub class_id: ClassId,
    pub fields: ValueField,
}

impl WorkspaceManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> WorkspaceResult<Self> {
        serde_json::from_str(json).map_err(|e| WorkspaceError::Serialization(e.to_string()))
    }

    /// Render the manifest as pretty-printed JSON.
    pub fn to_json(&self) -> WorkspaceResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| WorkspaceError::Serialization(e.to_string()))
    }

    /// Read a manifest file.
    pub fn load(path: &Path) -> WorkspaceResult<Self> {
        let text = fs::read_to_string(path)?;
        let manifest = Self::from_json(&text)?;
        debug!(path = %path.display(), containers = manifest.containers.len(), "loaded manifest");
        Ok(manifest)
    }

    /// Write a manifest file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> WorkspaceResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), "saved manifest");
        Ok(())
    }
}

impl InMemoryWorkspace {
    /// Load every container of a manifest, in manifest order.
    pub fn from_manifest(manifest: &WorkspaceManifest) -> WorkspaceResult<Self> {
        let workspace = InMemoryWorkspace::new();
        for entry in &manifest.containers {
            let id = workspace.add_container(entry.name.clone(), entry.path.clone())?;
            workspace.set_guid(id, entry.guid)?;
            let count = entry.dependency_count.unwrap_or(entry.dependencies.len());
            workspace.load_dependencies(id, entry.dependencies.clone(), count)?;
            for object in &entry.objects {
                workspace.insert_object(id, object.path_id, object.class_id, object.fields.clone())?;
            }
        }
        Ok(workspace)
    }

    /// Snapshot the workspace as a manifest.
    pub fn to_manifest(&self) -> WorkspaceResult<WorkspaceManifest> {
        let mut containers = Vec::new();
        for container in self.loaded_containers()? {
            let objects = self
                .objects_with_fields(container.id)?
                .into_iter()
                .map(|(handle, fields)| ObjectManifest {
                    path_id: handle.path_id(),
                    class_id: handle.class_id,
                    fields,
                })
                .collect();
            let dependency_count = (container.dependency_count != container.dependencies.len())
                .then_some(container.dependency_count);
            containers.push(ContainerManifest {
                name: container.name,
                path: container.path,
                guid: container.guid,
                dependencies: container.dependencies,
                dependency_count,
                objects,
            });
        }
        Ok(WorkspaceManifest { containers })
    }

    /// Read a manifest file into a new workspace.
    pub fn load_manifest(path: &Path) -> WorkspaceResult<Self> {
        Self::from_manifest(&WorkspaceManifest::load(path)?)
    }

    /// Write the workspace to a manifest file.
    pub fn save_manifest(&self, path: &Path) -> WorkspaceResult<()> {
        self.to_manifest()?.save(path)
    }
}
