//! Object hierarchy reconstruction and export.
//!
//! Containers store their scene graph flat: every spatial object carries a
//! parent reference and an ordered list of child references, and points at
//! the display object that owns its name and components. This crate turns
//! that into a forest of [`HierarchyNode`]s and writes any subtree out as a
//! directory tree with one artifact per component.
//!
//! # Architecture
//!
//! - [`HierarchyBuilder`] scans a container scope for roots and resolves
//!   child links through the [`Workspace`](assetkit_workspace::Workspace).
//!   Dangling links, cycles and depth overruns drop the affected node and
//!   are recorded, never fatal.
//! - [`Exporter`] walks a subtree, naming artifacts
//!   `{name}-{file}-{path id}.{ext}` so components never collide, and hands
//!   bytes to an [`ArtifactSink`].
//! - Naming, value serialization and writing are injected through
//!   [`AssetNamer`], [`ValueSerializer`] and [`ArtifactSink`].

pub mod builder;
pub mod dump;
pub mod error;
pub mod export;
pub mod naming;
pub mod node;
pub mod sink;

pub use builder::{components_of, try_resolve, BuildOptions, HierarchyBuilder};
pub use dump::{DumpFormat, JsonDump, TextDump, ValueSerializer};
pub use error::{HierarchyError, HierarchyResult};
pub use export::{ExportFailure, ExportOptions, ExportReport, Exporter, SkippedComponent};
pub use naming::{artifact_file_name, sanitize_file_name, AssetNamer, DefaultNamer};
pub use node::{HierarchyForest, HierarchyNode, Preorder, SkipReason, SkippedLink};
pub use sink::{ArtifactSink, FsSink, MemorySink};
