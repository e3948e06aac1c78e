//! Subtree export.
//!
//! For each node the exporter ensures a directory exists, writes one
//! artifact per resolvable component, then descends into one subdirectory
//! per child named after the child. Nothing persists between calls.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use assetkit_types::{ContainerId, ObjectKey, ObjectReference};
use assetkit_workspace::Workspace;

use crate::builder::{components_of, try_resolve};
use crate::dump::{DumpFormat, ValueSerializer};
use crate::error::{HierarchyError, HierarchyResult};
use crate::naming::{artifact_file_name, sanitize_file_name, AssetNamer, DefaultNamer};
use crate::node::HierarchyNode;
use crate::sink::ArtifactSink;

/// Options controlling an export.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: DumpFormat,
    /// Stop at the first write failure instead of collecting failures.
    pub fail_fast: bool,
}

/// A component reference that could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedComponent {
    pub owner: ObjectKey,
    pub reference: ObjectReference,
}

/// A write that failed during a collecting export.
#[derive(Debug)]
pub struct ExportFailure {
    pub path: PathBuf,
    pub source: io::Error,
}

/// What an export produced.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Artifact paths in write order.
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedComponent>,
    pub failures: Vec<ExportFailure>,
}

impl ExportReport {
    /// Returns `true` if every component was resolved and written.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failures.is_empty()
    }
}

/// Writes a hierarchy subtree out as per-component artifacts.
pub struct Exporter<'a> {
    workspace: &'a dyn Workspace,
    namer: Box<dyn AssetNamer>,
    serializer: Box<dyn ValueSerializer>,
    options: ExportOptions,
}

struct ExportState<'s> {
    sink: &'s mut dyn ArtifactSink,
    visited: HashSet<ObjectKey>,
    file_names: HashMap<ContainerId, String>,
    report: ExportReport,
}

impl<'a> Exporter<'a> {
    pub fn new(workspace: &'a dyn Workspace) -> Self {
        Self {
            workspace,
            namer: Box::new(DefaultNamer),
            serializer: DumpFormat::default().serializer(),
            options: ExportOptions::default(),
        }
    }

    /// Apply options. Also selects the serializer for `options.format`.
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.serializer = options.format.serializer();
        self.options = options;
        self
    }

    pub fn with_namer(mut self, namer: impl AssetNamer + 'static) -> Self {
        self.namer = Box::new(namer);
        self
    }

    pub fn with_serializer(mut self, serializer: impl ValueSerializer + 'static) -> Self {
        self.serializer = Box::new(serializer);
        self
    }

    /// Export `node` and its descendants under `base`.
    ///
    /// Unresolvable components are skipped and listed in the report. Write
    /// failures are collected and the export carries on, unless
    /// [`ExportOptions::fail_fast`] is set, in which case the first one is
    /// returned as [`HierarchyError::WriteFailure`].
    pub fn export_subtree(
        &self,
        node: &HierarchyNode,
        base: &Path,
        sink: &mut dyn ArtifactSink,
    ) -> HierarchyResult<ExportReport> {
        let mut state = ExportState {
            sink,
            visited: HashSet::new(),
            file_names: HashMap::new(),
            report: ExportReport::default(),
        };
        self.export_node(node, base, &mut state)?;
        debug!(
            written = state.report.written.len(),
            skipped = state.report.skipped.len(),
            failed = state.report.failures.len(),
            "export finished"
        );
        Ok(state.report)
    }

    fn export_node(
        &self,
        node: &HierarchyNode,
        dir: &Path,
        state: &mut ExportState<'_>,
    ) -> HierarchyResult<()> {
        if !state.visited.insert(node.display.key) {
            warn!(key = %node.display.key, "node already exported");
            return Ok(());
        }

        if let Err(source) = state.sink.create_dir(dir) {
            self.fail(dir.to_path_buf(), source, state)?;
        }

        for reference in components_of(self.workspace, &node.display)? {
            let Some((component, field)) =
                try_resolve(self.workspace, node.display.container(), &reference)?
            else {
                warn!(owner = %node.display.key, %reference, "skipping missing component");
                state.report.skipped.push(SkippedComponent {
                    owner: node.display.key,
                    reference,
                });
                continue;
            };

            let name = self.namer.display_name(self.workspace, &component, &field);
            let file = self.file_name(component.container(), state)?;
            let path = dir.join(artifact_file_name(
                &name,
                &file,
                component.path_id(),
                self.serializer.extension(),
            ));
            let bytes = self.serializer.serialize(&component, &field)?;

            match state.sink.write(&path, &bytes) {
                Ok(()) => {
                    debug!(path = %path.display(), object = %component, "wrote artifact");
                    state.report.written.push(path);
                }
                Err(source) => self.fail(path, source, state)?,
            }
        }

        for child in &node.children {
            let child_dir = dir.join(sanitize_file_name(&child.name));
            self.export_node(child, &child_dir, state)?;
        }
        Ok(())
    }

    fn fail(
        &self,
        path: PathBuf,
        source: io::Error,
        state: &mut ExportState<'_>,
    ) -> HierarchyResult<()> {
        warn!(path = %path.display(), error = %source, "export write failed");
        if self.options.fail_fast {
            return Err(HierarchyError::WriteFailure { path, source });
        }
        state.report.failures.push(ExportFailure { path, source });
        Ok(())
    }

    fn file_name(&self, id: ContainerId, state: &mut ExportState<'_>) -> HierarchyResult<String> {
        if let Some(name) = state.file_names.get(&id) {
            return Ok(name.clone());
        }
        let name = self.workspace.container(id)?.file_name().to_string();
        state.file_names.insert(id, name.clone());
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HierarchyBuilder;
    use crate::dump::TextDump;
    use crate::sink::{FsSink, MemorySink};
    use assetkit_types::{ClassId, ContainerScope};
    use assetkit_workspace::{InMemoryWorkspace, ObjectHandle, ValueField};

    fn local(path_id: i64) -> ObjectReference {
        ObjectReference::local(path_id)
    }

    fn game_object(name: &str, components: &[i64]) -> ValueField {
        ValueField::structure([
            (
                "m_Component",
                ValueField::wrapped_array(
                    components
                        .iter()
                        .map(|&id| {
                            ValueField::structure([("component", ValueField::reference(local(id)))])
                        })
                        .collect(),
                ),
            ),
            ("m_Name", name.into()),
        ])
    }

    fn transform(owner: i64, father: i64, children: &[i64]) -> ValueField {
        ValueField::structure([
            ("m_GameObject", ValueField::reference(local(owner))),
            (
                "m_Children",
                ValueField::wrapped_array(
                    children.iter().map(|&id| ValueField::reference(local(id))).collect(),
                ),
            ),
            ("m_Father", ValueField::reference(local(father))),
        ])
    }

    /// Player (transform 10, script 11) with child Weapon (transform 20).
    ///
    /// The script's `m_Name` is empty so its artifact is named after the
    /// script class.
    fn two_level() -> (InMemoryWorkspace, HierarchyNode) {
        let ws = InMemoryWorkspace::new();
        let c = ws.add_container("level0", "Data/level0").unwrap();
        ws.insert_object(c, 1, ClassId::GAME_OBJECT, game_object("Player", &[10, 11]))
            .unwrap();
        ws.insert_object(c, 2, ClassId::GAME_OBJECT, game_object("Weapon", &[20]))
            .unwrap();
        ws.insert_object(c, 10, ClassId::TRANSFORM, transform(1, 0, &[20]))
            .unwrap();
        ws.insert_object(
            c,
            11,
            ClassId::MONO_BEHAVIOUR,
            ValueField::structure([
                ("m_GameObject", ValueField::reference(local(1))),
                ("m_Script", ValueField::reference(local(90))),
                ("m_Name", "".into()),
            ]),
        )
        .unwrap();
        ws.insert_object(
            c,
            90,
            ClassId::MONO_SCRIPT,
            ValueField::structure([("m_ClassName", "PlayerController".into())]),
        )
        .unwrap();
        ws.insert_object(c, 20, ClassId::TRANSFORM, transform(2, 10, &[]))
            .unwrap();

        let forest = HierarchyBuilder::new(&ws).build(ContainerScope::All).unwrap();
        let root = forest.roots()[0].clone();
        (ws, root)
    }

    #[test]
    fn two_level_export_paths() {
        let (ws, root) = two_level();
        let base = Path::new("out");
        let mut sink = MemorySink::new();

        let report = Exporter::new(&ws)
            .export_subtree(&root, base, &mut sink)
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(
            report.written,
            vec![
                base.join("Transform-level0-10.json"),
                base.join("PlayerController-level0-11.json"),
                base.join("Weapon").join("Transform-level0-20.json"),
            ]
        );
        assert!(sink.dirs.contains(base));
        assert!(sink.dirs.contains(&base.join("Weapon")));
        let json: serde_json::Value =
            serde_json::from_slice(sink.file(base.join("Transform-level0-10.json")).unwrap())
                .unwrap();
        assert_eq!(json["m_GameObject"]["m_PathID"], 1);
    }

    #[test]
    fn export_to_filesystem() {
        let (ws, root) = two_level();
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            format: DumpFormat::Txt,
            fail_fast: false,
        };

        let report = Exporter::new(&ws)
            .with_options(options)
            .export_subtree(&root, dir.path(), &mut FsSink)
            .unwrap();

        assert_eq!(report.written.len(), 3);
        let child = dir.path().join("Weapon").join("Transform-level0-20.txt");
        let text = std::fs::read_to_string(child).unwrap();
        assert!(text.starts_with("Transform Base\n"));
        assert!(dir.path().join("PlayerController-level0-11.txt").is_file());
    }

    #[test]
    fn missing_component_is_skipped() {
        let (ws, root) = two_level();
        ws.insert_object(
            ContainerId(0),
            2,
            ClassId::GAME_OBJECT,
            game_object("Weapon", &[20, 77]),
        )
        .unwrap();

        let mut sink = MemorySink::new();
        let report = Exporter::new(&ws)
            .export_subtree(&root, Path::new("out"), &mut sink)
            .unwrap();

        assert_eq!(report.written.len(), 3);
        assert_eq!(
            report.skipped,
            vec![SkippedComponent {
                owner: ObjectKey::new(ContainerId(0), 2),
                reference: local(77),
            }]
        );
        assert!(!report.is_complete());
    }

    /// Fails every write whose path contains `needle`.
    struct FailingSink {
        inner: MemorySink,
        needle: &'static str,
    }

    impl ArtifactSink for FailingSink {
        fn create_dir(&mut self, path: &Path) -> io::Result<()> {
            self.inner.create_dir(path)
        }

        fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
            if path.to_string_lossy().contains(self.needle) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.inner.write(path, bytes)
        }
    }

    #[test]
    fn write_failures_are_collected() {
        let (ws, root) = two_level();
        let mut sink = FailingSink {
            inner: MemorySink::new(),
            needle: "PlayerController",
        };

        let report = Exporter::new(&ws)
            .export_subtree(&root, Path::new("out"), &mut sink)
            .unwrap();

        assert_eq!(report.written.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].path,
            Path::new("out").join("PlayerController-level0-11.json")
        );
        assert!(sink
            .inner
            .file(Path::new("out").join("Weapon").join("Transform-level0-20.json"))
            .is_some());
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let (ws, root) = two_level();
        let mut sink = FailingSink {
            inner: MemorySink::new(),
            needle: "PlayerController",
        };
        let options = ExportOptions {
            fail_fast: true,
            ..ExportOptions::default()
        };

        let err = Exporter::new(&ws)
            .with_options(options)
            .export_subtree(&root, Path::new("out"), &mut sink)
            .unwrap_err();

        assert!(matches!(err, HierarchyError::WriteFailure { .. }));
        assert_eq!(sink.inner.files.len(), 1);
    }

    /// Names every artifact `fixed`.
    struct FixedNamer;

    impl AssetNamer for FixedNamer {
        fn display_name(&self, _: &dyn Workspace, _: &ObjectHandle, _: &ValueField) -> String {
            "fixed:name".to_string()
        }
    }

    #[test]
    fn custom_namer_and_serializer() {
        let (ws, root) = two_level();
        let mut sink = MemorySink::new();

        let report = Exporter::new(&ws)
            .with_namer(FixedNamer)
            .with_serializer(TextDump)
            .export_subtree(&root, Path::new("out"), &mut sink)
            .unwrap();

        assert_eq!(report.written[0], Path::new("out").join("fixed_name-level0-10.txt"));
    }
}
