//! Foundation types for assetkit.
//!
//! This crate provides the identifiers and small value types shared by every
//! other assetkit crate. Nothing here touches a workspace or the filesystem.
//!
//! # Key Types
//!
//! - [`ContainerId`] - load-order identity of a container within a workspace
//! - [`PathId`] - per-container object identifier
//! - [`ObjectKey`] - `(ContainerId, PathId)` identity of a loaded object
//! - [`ClassId`] - numeric type tag, classified into [`Capabilities`]
//! - [`DependencyRecord`] - entry of a container's dependency list
//! - [`ObjectReference`] - `(file_id, path_id)` pointer embedded in object data
//! - [`ContainerScope`] - one container or the whole workspace

pub mod class;
pub mod dependency;
pub mod error;
pub mod id;
pub mod reference;

pub use class::{Capabilities, ClassId};
pub use dependency::{DependencyRecord, Guid128};
pub use error::TypeError;
pub use id::{ContainerId, ContainerScope, ObjectKey, PathId};
pub use reference::ObjectReference;
