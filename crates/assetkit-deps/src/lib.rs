//! Dependency list editing for asset containers.
//!
//! Every container carries an ordered list of dependency records, and
//! object references elsewhere in the container address those records by
//! position. Reordering or removing a record that existed when the container
//! was loaded silently retargets every reference encoded against the old
//! order. This crate cannot see or repair those references, so it makes the
//! hazard explicit instead:
//!
//! - Edits happen in a [`DependencyEditor`] session, on private buffers.
//! - The first destructive edit touching an originally-loaded slot asks the
//!   host for confirmation through [`Confirm`]. Once confirmed, the session
//!   does not ask again.
//! - Nothing reaches the workspace until [`DependencyEditor::commit`].
//!
//! # Modules
//!
//! - [`error`] - Error types for editing operations
//! - [`entry`] - [`DependencyEntry`] display snapshots
//! - [`confirm`] - The [`Confirm`] gate interface
//! - [`editor`] - The [`DependencyEditor`] session

pub mod confirm;
pub mod editor;
pub mod entry;
pub mod error;

pub use confirm::{Confirm, MOVE_WARNING};
pub use editor::{DependencyEditor, EditOutcome, MoveDirection};
pub use entry::{DependencyEntry, EntryLabel};
pub use error::{DepsError, Result};
