//! The workspace of loaded asset containers.
//!
//! A workspace holds every loaded container, hands out snapshots of their
//! metadata, fetches object value trees, and resolves the object references
//! embedded in those trees. Parsing container bytes is not this crate's
//! concern; containers arrive already parsed, either built in code or read
//! from a JSON [`WorkspaceManifest`].
//!
//! # Modules
//!
//! - [`error`] - Error types for workspace operations
//! - [`container`] - [`Container`] snapshots and [`ObjectHandle`]
//! - [`value`] - The [`ValueField`] value tree and field-path access
//! - [`traits`] - The [`Workspace`] trait
//! - [`memory`] - [`InMemoryWorkspace`], the reference implementation
//! - [`manifest`] - JSON manifest load/save

pub mod container;
pub mod error;
pub mod manifest;
pub mod memory;
pub mod traits;
pub mod value;

pub use container::{Container, ObjectHandle};
pub use error::{WorkspaceError, WorkspaceResult};
pub use manifest::{ContainerManifest, ObjectManifest, WorkspaceManifest};
pub use memory::InMemoryWorkspace;
pub use traits::Workspace;
pub use value::{Fields, ValueField};
