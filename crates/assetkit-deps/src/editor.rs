//! The dependency editing session.
//!
//! [`DependencyEditor`] snapshots every loaded container's dependency list
//! into a private buffer when opened. Edits touch only those buffers and
//! mark the container dirty; [`commit`](DependencyEditor::commit) writes the
//! dirty buffers back and [`discard`](DependencyEditor::discard) throws them
//! away.
//!
//! # Positions
//!
//! Positions follow foreign-file index numbering. Position 0 is the
//! container itself and can never be edited; position `n` is dependency
//! `n - 1`.
//!
//! # Confirmation gate
//!
//! A removal at position `<= original_count`, or a move at position
//! `<= original_count` (`<= original_count + 1` when moving up, since the
//! slot above is displaced too), can desynchronize references already
//! encoded in object data. The first such edit in a session asks the host
//! through [`Confirm`]; once accepted, later edits in the same session go
//! through without asking.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use assetkit_types::{ContainerId, ContainerScope, DependencyRecord};
use assetkit_workspace::Workspace;

use crate::confirm::{Confirm, MOVE_WARNING};
use crate::entry::{DependencyEntry, EntryLabel};
use crate::error::{DepsError, Result};

/// Direction of a dependency move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Toward position 1.
    Up,
    /// Toward the end of the list.
    Down,
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Result of an edit that may need confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit was applied to the session buffer.
    Applied,
    /// The user declined the confirmation gate; nothing changed.
    Declined,
}

/// Private copy of one container's dependency list.
#[derive(Clone, Debug)]
struct EditBuffer {
    name: String,
    /// Recorded count at load (or last commit); gates destructive edits.
    original_count: usize,
    records: Vec<DependencyRecord>,
}

/// An editing session over a workspace's dependency lists.
pub struct DependencyEditor {
    workspace: Arc<dyn Workspace>,
    buffers: BTreeMap<ContainerId, EditBuffer>,
    dirty: BTreeSet<ContainerId>,
    /// Whether the user already accepted the warning this session.
    confirmed: bool,
}

impl fmt::Debug for DependencyEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyEditor")
            .field("containers", &self.buffers.len())
            .field("dirty", &self.dirty)
            .field("confirmed", &self.confirmed)
            .finish()
    }
}

impl DependencyEditor {
    /// Open a session, snapshotting every loaded container.
    pub fn open(workspace: Arc<dyn Workspace>) -> Result<Self> {
        let buffers = Self::load_buffers(workspace.as_ref())?;
        debug!(containers = buffers.len(), "opened dependency editor");
        Ok(Self {
            workspace,
            buffers,
            dirty: BTreeSet::new(),
            confirmed: false,
        })
    }

    fn load_buffers(workspace: &dyn Workspace) -> Result<BTreeMap<ContainerId, EditBuffer>> {
        Ok(workspace
            .loaded_containers()?
            .into_iter()
            .map(|c| {
                (
                    c.id,
                    EditBuffer {
                        name: c.name,
                        original_count: c.dependency_count,
                        records: c.dependencies,
                    },
                )
            })
            .collect())
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Snapshot of the list shown for `scope`.
    ///
    /// For a single container the snapshot starts with the synthetic self
    /// row. For the whole workspace it lists every loaded container.
    pub fn list(&self, scope: ContainerScope) -> Result<Vec<DependencyEntry>> {
        match scope {
            ContainerScope::All => Ok(self
                .buffers
                .iter()
                .map(|(id, buffer)| DependencyEntry {
                    index: id.index(),
                    label: EntryLabel::Container {
                        id: *id,
                        name: buffer.name.clone(),
                    },
                })
                .collect()),
            ContainerScope::Container(id) => {
                let buffer = self.buffer(id)?;
                let mut entries = Vec::with_capacity(buffer.records.len() + 1);
                entries.push(DependencyEntry {
                    index: 0,
                    label: EntryLabel::SelfFile {
                        name: buffer.name.clone(),
                    },
                });
                entries.extend(buffer.records.iter().enumerate().map(|(i, record)| {
                    DependencyEntry {
                        index: i + 1,
                        label: EntryLabel::Dependency(record.clone()),
                    }
                }));
                Ok(entries)
            }
        }
    }

    /// The current (edited) records of a container.
    pub fn records(&self, id: ContainerId) -> Result<&[DependencyRecord]> {
        Ok(&self.buffer(id)?.records)
    }

    /// Dependency count recorded when the session loaded (or last committed)
    /// the container.
    pub fn original_count(&self, id: ContainerId) -> Option<usize> {
        self.buffers.get(&id).map(|b| b.original_count)
    }

    /// Returns `true` if any container has uncommitted edits.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Containers with uncommitted edits, in id order.
    pub fn dirty(&self) -> Vec<ContainerId> {
        self.dirty.iter().copied().collect()
    }

    /// Returns `true` once the user has accepted the warning this session.
    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Append a record to a container's list.
    pub fn add(&mut self, scope: ContainerScope, record: DependencyRecord) -> Result<()> {
        let id = Self::target(scope, "add")?;
        let buffer = self.buffer_mut(id)?;
        buffer.records.push(record);
        let position = buffer.records.len();
        self.dirty.insert(id);
        debug!(container = %id, position, "added dependency");
        Ok(())
    }

    /// Remove the record at `index`.
    pub fn remove(
        &mut self,
        scope: ContainerScope,
        index: usize,
        confirm: &mut dyn Confirm,
    ) -> Result<EditOutcome> {
        let id = Self::target(scope, "remove")?;
        let buffer = self.buffer(id)?;
        if index == 0 {
            return Err(DepsError::selection(index, "the base file cannot be removed"));
        }
        if index > buffer.records.len() {
            return Err(DepsError::selection(index, "no dependency at this position"));
        }

        let touches_original = index <= buffer.original_count;
        if !self.pass_gate(touches_original, confirm) {
            debug!(container = %id, index, "remove declined");
            return Ok(EditOutcome::Declined);
        }

        let buffer = self.buffer_mut(id)?;
        let removed = buffer.records.remove(index - 1);
        self.dirty.insert(id);
        debug!(container = %id, index, record = %removed, "removed dependency");
        Ok(EditOutcome::Applied)
    }

    /// Swap the record at `index` with its neighbour in `direction`.
    pub fn move_dependency(
        &mut self,
        scope: ContainerScope,
        index: usize,
        direction: MoveDirection,
        confirm: &mut dyn Confirm,
    ) -> Result<EditOutcome> {
        let id = Self::target(scope, "move")?;
        let buffer = self.buffer(id)?;
        let len = buffer.records.len();
        if index == 0 {
            return Err(DepsError::selection(index, "the base file cannot be moved"));
        }
        if index > len {
            return Err(DepsError::selection(index, "no dependency at this position"));
        }
        if direction == MoveDirection::Up && index == 1 {
            return Err(DepsError::selection(index, "cannot move above the base file"));
        }
        if direction == MoveDirection::Down && index == len {
            return Err(DepsError::selection(index, "cannot move down any further"));
        }

        let reach = match direction {
            MoveDirection::Up => buffer.original_count + 1,
            MoveDirection::Down => buffer.original_count,
        };
        if !self.pass_gate(index <= reach, confirm) {
            debug!(container = %id, index, %direction, "move declined");
            return Ok(EditOutcome::Declined);
        }

        let buffer = self.buffer_mut(id)?;
        let slot = index - 1;
        let record = buffer.records.remove(slot);
        let target = match direction {
            MoveDirection::Up => slot - 1,
            MoveDirection::Down => slot + 1,
        };
        buffer.records.insert(target, record);
        self.dirty.insert(id);
        debug!(container = %id, index, %direction, "moved dependency");
        Ok(EditOutcome::Applied)
    }

    /// Write every dirty buffer back to the workspace.
    ///
    /// Returns the containers that were written, then clears the dirty set.
    /// Committed containers adopt their new length as the original count.
    pub fn commit(&mut self) -> Result<Vec<ContainerId>> {
        let pending: Vec<ContainerId> = self.dirty.iter().copied().collect();
        for id in &pending {
            let buffer = self
                .buffers
                .get_mut(id)
                .ok_or(DepsError::UnknownContainer(*id))?;
            self.workspace
                .replace_dependencies(*id, buffer.records.clone())?;
            buffer.original_count = buffer.records.len();
            self.dirty.remove(id);
        }
        if !pending.is_empty() {
            info!(containers = pending.len(), "committed dependency edits");
        }
        Ok(pending)
    }

    /// Drop every uncommitted edit and reload the buffers from the workspace.
    pub fn discard(&mut self) -> Result<()> {
        self.buffers = Self::load_buffers(self.workspace.as_ref())?;
        let dropped = std::mem::take(&mut self.dirty);
        debug!(containers = dropped.len(), "discarded dependency edits");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn target(scope: ContainerScope, operation: &'static str) -> Result<ContainerId> {
        scope
            .container()
            .ok_or(DepsError::InvalidTarget { operation })
    }

    fn buffer(&self, id: ContainerId) -> Result<&EditBuffer> {
        self.buffers.get(&id).ok_or(DepsError::UnknownContainer(id))
    }

    fn buffer_mut(&mut self, id: ContainerId) -> Result<&mut EditBuffer> {
        self.buffers
            .get_mut(&id)
            .ok_or(DepsError::UnknownContainer(id))
    }

    /// Returns `true` if the edit may proceed.
    fn pass_gate(&mut self, touches_original: bool, confirm: &mut dyn Confirm) -> bool {
        if self.confirmed || !touches_original {
            return true;
        }
        if confirm.confirm(MOVE_WARNING) {
            self.confirmed = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetkit_workspace::InMemoryWorkspace;
    use proptest::prelude::*;

    /// Prompt that records how often it was asked and answers `answer`.
    struct Prompt {
        asked: usize,
        answer: bool,
    }

    impl Prompt {
        fn yes() -> Self {
            Self { asked: 0, answer: true }
        }

        fn no() -> Self {
            Self { asked: 0, answer: false }
        }
    }

    impl Confirm for Prompt {
        fn confirm(&mut self, warning: &str) -> bool {
            assert_eq!(warning, MOVE_WARNING);
            self.asked += 1;
            self.answer
        }
    }

    fn record(i: usize) -> DependencyRecord {
        DependencyRecord::path(format!("dep{i}.assets"))
    }

    /// One container with `count` on-disk dependencies, plus a second,
    /// dependency-free container.
    fn workspace(count: usize) -> (Arc<InMemoryWorkspace>, ContainerId) {
        let ws = InMemoryWorkspace::new();
        let id = ws.add_container("level0", "Data/level0").unwrap();
        ws.add_container("level1", "Data/level1").unwrap();
        ws.load_dependencies(id, (0..count).map(record).collect(), count)
            .unwrap();
        (Arc::new(ws), id)
    }

    fn editor(count: usize) -> (DependencyEditor, Arc<InMemoryWorkspace>, ContainerId) {
        let (ws, id) = workspace(count);
        let editor = DependencyEditor::open(ws.clone()).unwrap();
        (editor, ws, id)
    }

    fn scope(id: ContainerId) -> ContainerScope {
        ContainerScope::Container(id)
    }

    #[test]
    fn list_starts_with_self_row() {
        let (editor, _, id) = editor(2);
        let rows: Vec<String> = editor
            .list(scope(id))
            .unwrap()
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(rows, vec!["0 - level0", "1 - dep0.assets", "2 - dep1.assets"]);
    }

    #[test]
    fn list_all_shows_loaded_containers() {
        let (editor, _, _) = editor(2);
        let rows: Vec<String> = editor
            .list(ContainerScope::All)
            .unwrap()
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(rows, vec!["0 - level0", "1 - level1"]);
    }

    #[test]
    fn add_to_whole_workspace_is_invalid_target() {
        let (mut editor, _, _) = editor(0);
        let err = editor.add(ContainerScope::All, record(9)).unwrap_err();
        assert!(matches!(err, DepsError::InvalidTarget { operation: "add" }));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn add_appends_and_marks_dirty() {
        let (mut editor, ws, id) = editor(1);
        editor.add(scope(id), record(5)).unwrap();
        assert_eq!(editor.records(id).unwrap(), &[record(0), record(5)]);
        assert_eq!(editor.dirty(), vec![id]);
        // Nothing reaches the workspace before commit.
        assert_eq!(ws.container(id).unwrap().dependencies.len(), 1);
    }

    #[test]
    fn remove_self_row_is_invalid_selection() {
        let (mut editor, _, id) = editor(3);
        let mut prompt = Prompt::yes();
        let err = editor.remove(scope(id), 0, &mut prompt).unwrap_err();
        assert!(matches!(err, DepsError::InvalidSelection { index: 0, .. }));
        assert_eq!(prompt.asked, 0);

        let (mut empty, _, empty_id) = editor_with_no_deps();
        assert!(matches!(
            empty.remove(scope(empty_id), 0, &mut prompt),
            Err(DepsError::InvalidSelection { .. })
        ));
    }

    fn editor_with_no_deps() -> (DependencyEditor, Arc<InMemoryWorkspace>, ContainerId) {
        editor(0)
    }

    #[test]
    fn remove_out_of_range_is_invalid_selection() {
        let (mut editor, _, id) = editor(2);
        let err = editor.remove(scope(id), 3, &mut Prompt::yes()).unwrap_err();
        assert!(matches!(err, DepsError::InvalidSelection { index: 3, .. }));
    }

    #[test]
    fn remove_original_slot_asks_once_per_session() {
        let (mut editor, _, id) = editor(3);
        let mut prompt = Prompt::yes();

        assert_eq!(
            editor.remove(scope(id), 1, &mut prompt).unwrap(),
            EditOutcome::Applied
        );
        assert_eq!(prompt.asked, 1);
        assert!(editor.confirmed());

        assert_eq!(
            editor.remove(scope(id), 1, &mut prompt).unwrap(),
            EditOutcome::Applied
        );
        editor
            .move_dependency(scope(id), 1, MoveDirection::Down, &mut prompt)
            .unwrap_err();
        assert_eq!(prompt.asked, 1);
        assert_eq!(editor.records(id).unwrap(), &[record(2)]);
    }

    #[test]
    fn declined_gate_changes_nothing() {
        let (mut editor, _, id) = editor(2);
        let mut prompt = Prompt::no();
        assert_eq!(
            editor.remove(scope(id), 2, &mut prompt).unwrap(),
            EditOutcome::Declined
        );
        assert_eq!(
            editor
                .move_dependency(scope(id), 1, MoveDirection::Down, &mut prompt)
                .unwrap(),
            EditOutcome::Declined
        );
        assert_eq!(prompt.asked, 2);
        assert!(!editor.confirmed());
        assert!(!editor.is_dirty());
        assert_eq!(editor.records(id).unwrap(), &[record(0), record(1)]);
    }

    #[test]
    fn freshly_added_entries_edit_without_asking() {
        let (mut editor, _, id) = editor(1);
        editor.add(scope(id), record(1)).unwrap();
        editor.add(scope(id), record(2)).unwrap();
        let mut prompt = Prompt::no();

        // Position 3 is beyond original_count + 1.
        assert_eq!(
            editor
                .move_dependency(scope(id), 3, MoveDirection::Up, &mut prompt)
                .unwrap(),
            EditOutcome::Applied
        );
        assert_eq!(
            editor.remove(scope(id), 3, &mut prompt).unwrap(),
            EditOutcome::Applied
        );
        assert_eq!(prompt.asked, 0);
        assert_eq!(editor.records(id).unwrap(), &[record(0), record(2)]);
    }

    #[test]
    fn moving_up_into_original_slot_asks() {
        let (mut editor, _, id) = editor(1);
        editor.add(scope(id), record(1)).unwrap();
        let mut prompt = Prompt::no();
        // Position 2 == original_count + 1: moving up displaces slot 1.
        assert_eq!(
            editor
                .move_dependency(scope(id), 2, MoveDirection::Up, &mut prompt)
                .unwrap(),
            EditOutcome::Declined
        );
        assert_eq!(prompt.asked, 1);
    }

    #[test]
    fn move_guards() {
        let (mut editor, _, id) = editor(3);
        let mut prompt = Prompt::yes();
        for (index, direction) in [
            (0, MoveDirection::Up),
            (0, MoveDirection::Down),
            (1, MoveDirection::Up),
            (3, MoveDirection::Down),
            (4, MoveDirection::Up),
        ] {
            let err = editor
                .move_dependency(scope(id), index, direction, &mut prompt)
                .unwrap_err();
            assert!(
                matches!(err, DepsError::InvalidSelection { .. }),
                "expected InvalidSelection for {index} {direction}, got: {err}"
            );
        }
        assert_eq!(prompt.asked, 0);
        let err = editor
            .move_dependency(ContainerScope::All, 2, MoveDirection::Up, &mut prompt)
            .unwrap_err();
        assert!(matches!(err, DepsError::InvalidTarget { .. }));
    }

    #[test]
    fn move_swaps_neighbours() {
        let (mut editor, _, id) = editor(3);
        let mut prompt = Prompt::yes();
        editor
            .move_dependency(scope(id), 2, MoveDirection::Up, &mut prompt)
            .unwrap();
        assert_eq!(editor.records(id).unwrap(), &[record(1), record(0), record(2)]);
        editor
            .move_dependency(scope(id), 2, MoveDirection::Down, &mut prompt)
            .unwrap();
        assert_eq!(editor.records(id).unwrap(), &[record(1), record(2), record(0)]);
    }

    #[test]
    fn commit_without_edits_is_a_no_op() {
        let (mut editor, ws, id) = editor(2);
        let before = ws.container(id).unwrap();
        assert!(editor.commit().unwrap().is_empty());
        assert_eq!(ws.container(id).unwrap(), before);
    }

    #[test]
    fn commit_writes_dirty_containers_and_updates_count() {
        let (mut editor, ws, id) = editor(2);
        editor.add(scope(id), record(7)).unwrap();
        editor.remove(scope(id), 1, &mut Prompt::yes()).unwrap();

        assert_eq!(editor.commit().unwrap(), vec![id]);
        assert!(!editor.is_dirty());

        let container = ws.container(id).unwrap();
        assert_eq!(container.dependencies, vec![record(1), record(7)]);
        assert_eq!(container.dependency_count, 2);
        assert_eq!(editor.original_count(id), Some(2));
        assert!(editor.commit().unwrap().is_empty());
    }

    #[test]
    fn discard_restores_pre_edit_sequence() {
        let (mut editor, ws, id) = editor(3);
        let mut prompt = Prompt::yes();
        editor.add(scope(id), record(8)).unwrap();
        editor.remove(scope(id), 2, &mut prompt).unwrap();
        editor
            .move_dependency(scope(id), 1, MoveDirection::Down, &mut prompt)
            .unwrap();

        editor.discard().unwrap();
        assert!(!editor.is_dirty());
        assert_eq!(
            editor.records(id).unwrap(),
            ws.container(id).unwrap().dependencies.as_slice()
        );
        assert_eq!(editor.records(id).unwrap(), &[record(0), record(1), record(2)]);
    }

    #[test]
    fn sessions_do_not_share_the_gate() {
        let (ws, id) = workspace(2);
        let mut first = DependencyEditor::open(ws.clone()).unwrap();
        let mut second = DependencyEditor::open(ws).unwrap();
        let mut prompt = Prompt::yes();

        first.remove(scope(id), 1, &mut prompt).unwrap();
        second.remove(scope(id), 1, &mut prompt).unwrap();
        assert_eq!(prompt.asked, 2);
    }

    #[test]
    fn closures_are_confirmations() {
        let (mut editor, _, id) = editor(1);
        let mut asked = Vec::new();
        let mut confirm = |warning: &str| {
            asked.push(warning.to_string());
            true
        };
        editor.remove(scope(id), 1, &mut confirm).unwrap();
        assert_eq!(asked, vec![MOVE_WARNING.to_string()]);
    }

    proptest! {
        #[test]
        fn move_up_then_down_is_identity(len in 2usize..12, pick in 0usize..100) {
            let (mut editor, _, id) = editor(len);
            let index = 2 + pick % (len - 1);
            let before = editor.records(id).unwrap().to_vec();
            let mut prompt = Prompt::yes();

            editor.move_dependency(scope(id), index, MoveDirection::Up, &mut prompt).unwrap();
            editor.move_dependency(scope(id), index - 1, MoveDirection::Down, &mut prompt).unwrap();

            prop_assert_eq!(editor.records(id).unwrap(), before.as_slice());
            prop_assert_eq!(prompt.asked, 1);
        }
    }
}
