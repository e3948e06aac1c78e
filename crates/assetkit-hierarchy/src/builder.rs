//! Hierarchy reconstruction from spatial parent/child links.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use assetkit_types::{Capabilities, ContainerId, ContainerScope, ObjectKey, ObjectReference};
use assetkit_workspace::{ObjectHandle, ValueField, Workspace, WorkspaceError};

use crate::error::{HierarchyError, HierarchyResult};
use crate::node::{HierarchyForest, HierarchyNode, SkipReason, SkippedLink};

const FATHER_FIELD: &str = "m_Father";
const CHILDREN_FIELD: &str = "m_Children.Array";
const OWNER_FIELD: &str = "m_GameObject";
const NAME_FIELD: &str = "m_Name";
const COMPONENTS_FIELD: &str = "m_Component.Array";

/// Options controlling a hierarchy build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Deepest level to descend to. Roots are level 0.
    pub max_depth: Option<usize>,
}

/// Rebuilds object trees from a [`Workspace`].
pub struct HierarchyBuilder<'a> {
    workspace: &'a dyn Workspace,
    options: BuildOptions,
}

struct BuildState {
    visited: HashSet<ObjectKey>,
    /// Spatial keys from the current root down to the node being built.
    ancestors: Vec<ObjectKey>,
    skipped: Vec<SkippedLink>,
}

impl BuildState {
    fn skip(&mut self, from: ObjectKey, reference: ObjectReference, reason: SkipReason) {
        warn!(%from, %reference, ?reason, "omitting hierarchy link");
        self.skipped.push(SkippedLink {
            from,
            reference,
            reason,
        });
    }
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(workspace: &'a dyn Workspace) -> Self {
        Self::with_options(workspace, BuildOptions::default())
    }

    pub fn with_options(workspace: &'a dyn Workspace, options: BuildOptions) -> Self {
        Self { workspace, options }
    }

    /// Build the forest of every spatial root in `scope`.
    ///
    /// Roots are spatial objects whose father reference is null, visited in
    /// ascending path id order per container. Links that cannot be followed
    /// are left out and listed in [`HierarchyForest::skipped`], including
    /// non-root objects whose father does not resolve. Only failures to
    /// enumerate containers or read scanned objects are returned as errors.
    pub fn build(&self, scope: ContainerScope) -> HierarchyResult<HierarchyForest> {
        let containers: Vec<ContainerId> = match scope {
            ContainerScope::All => self
                .workspace
                .loaded_containers()?
                .into_iter()
                .map(|c| c.id)
                .collect(),
            ContainerScope::Container(id) => vec![self.workspace.container(id)?.id],
        };

        let mut state = BuildState {
            visited: HashSet::new(),
            ancestors: Vec::new(),
            skipped: Vec::new(),
        };
        let mut roots = Vec::new();

        for id in containers {
            for handle in self.workspace.objects(id)? {
                if !handle.class_id.is_spatial() {
                    continue;
                }
                let field = self.workspace.base_field(&handle)?;
                let father = field
                    .get(FATHER_FIELD)
                    .and_then(ValueField::as_reference)
                    .unwrap_or_default();
                if !father.path_id.is_null() {
                    if try_resolve(self.workspace, id, &father)?.is_none() {
                        state.skip(handle.key, father, SkipReason::MissingParent);
                    }
                    continue;
                }
                if state.visited.contains(&handle.key) {
                    debug!(key = %handle.key, "root already placed");
                    continue;
                }
                if let Some(node) = self.build_node(handle, &field, 0, &mut state)? {
                    roots.push(node);
                }
            }
        }

        debug!(
            roots = roots.len(),
            skipped = state.skipped.len(),
            "built hierarchy"
        );
        Ok(HierarchyForest {
            roots,
            skipped: state.skipped,
        })
    }

    fn build_node(
        &self,
        spatial: ObjectHandle,
        field: &ValueField,
        depth: usize,
        state: &mut BuildState,
    ) -> HierarchyResult<Option<HierarchyNode>> {
        state.visited.insert(spatial.key);
        state.ancestors.push(spatial.key);
        let node = self.build_links(spatial, field, depth, state);
        state.ancestors.pop();
        node
    }

    fn build_links(
        &self,
        spatial: ObjectHandle,
        field: &ValueField,
        depth: usize,
        state: &mut BuildState,
    ) -> HierarchyResult<Option<HierarchyNode>> {
        let owner_ref = field
            .get(OWNER_FIELD)
            .and_then(ValueField::as_reference)
            .unwrap_or_default();
        let (display, display_field) =
            match try_resolve(self.workspace, spatial.container(), &owner_ref)? {
                Some((handle, f)) if handle.class_id.is_display() => (handle, f),
                _ => {
                    state.skip(spatial.key, owner_ref, SkipReason::MissingOwner);
                    return Ok(None);
                }
            };
        let name = display_field
            .get(NAME_FIELD)
            .and_then(ValueField::as_str)
            .unwrap_or_default()
            .to_string();

        let child_refs: Vec<ObjectReference> = field
            .get_path(CHILDREN_FIELD)
            .and_then(ValueField::as_array)
            .unwrap_or_default()
            .iter()
            .filter_map(ValueField::as_reference)
            .collect();

        let mut children = Vec::with_capacity(child_refs.len());
        for child_ref in child_refs {
            if self.options.max_depth.is_some_and(|max| depth >= max) {
                state.skip(spatial.key, child_ref, SkipReason::DepthLimit);
                continue;
            }
            let Some((child, child_field)) =
                try_resolve(self.workspace, spatial.container(), &child_ref)?
            else {
                state.skip(spatial.key, child_ref, SkipReason::Unresolved);
                continue;
            };
            if !child.class_id.is_spatial() {
                state.skip(spatial.key, child_ref, SkipReason::NotSpatial);
                continue;
            }
            if state.ancestors.contains(&child.key) {
                state.skip(spatial.key, child_ref, SkipReason::Cycle);
                continue;
            }
            if state.visited.contains(&child.key) {
                state.skip(spatial.key, child_ref, SkipReason::AlreadyPlaced);
                continue;
            }
            if let Some(node) = self.build_node(child, &child_field, depth + 1, state)? {
                children.push(node);
            }
        }

        Ok(Some(HierarchyNode {
            spatial,
            display,
            name,
            children,
        }))
    }
}

/// Resolve a reference, mapping "not there" to `None`.
///
/// Workspace failures other than a missing target are returned as errors.
pub fn try_resolve(
    workspace: &dyn Workspace,
    from: ContainerId,
    reference: &ObjectReference,
) -> HierarchyResult<Option<(ObjectHandle, ValueField)>> {
    match workspace.resolve_field(from, reference) {
        Ok(found) => Ok(Some(found)),
        Err(
            WorkspaceError::UnresolvedReference { .. }
            | WorkspaceError::ObjectNotFound { .. }
            | WorkspaceError::ContainerNotFound(_),
        ) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Component references of a display object, in on-disk order.
///
/// Entries are read from `component`, or from `second` in the older
/// pair layout. Entries with neither are ignored.
pub fn components_of(
    workspace: &dyn Workspace,
    owner: &ObjectHandle,
) -> HierarchyResult<Vec<ObjectReference>> {
    if !owner
        .class_id
        .capabilities()
        .contains(Capabilities::COMPONENTS)
    {
        return Err(HierarchyError::NotDisplayObject(owner.key));
    }

    let field = workspace.base_field(owner)?;
    let entries = field
        .get_path(COMPONENTS_FIELD)
        .and_then(ValueField::as_array)
        .unwrap_or_default();

    let mut components = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        match entry
            .get("component")
            .or_else(|| entry.get("second"))
            .and_then(ValueField::as_reference)
        {
            Some(reference) => components.push(reference),
            None => warn!(owner = %owner.key, index = i, "malformed component entry"),
        }
    }
    Ok(components)
}
