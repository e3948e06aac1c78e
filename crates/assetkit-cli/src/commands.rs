use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use colored::Colorize;

use assetkit_deps::{Confirm, DependencyEditor, EditOutcome, EntryLabel};
use assetkit_hierarchy::{
    components_of, try_resolve, ArtifactSink, AssetNamer, DefaultNamer, ExportReport, Exporter,
    FsSink, HierarchyBuilder, HierarchyForest, HierarchyNode, MemorySink,
};
use assetkit_types::{ContainerScope, DependencyRecord, Guid128, ObjectKey, ObjectReference};
use assetkit_workspace::{Container, InMemoryWorkspace, ObjectHandle, ValueField, Workspace};

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::resolve(cli.config.as_deref())?;
    let workspace = Arc::new(
        InMemoryWorkspace::load_manifest(&cli.workspace)
            .with_context(|| format!("failed to load workspace {}", cli.workspace.display()))?,
    );
    let session = Session {
        workspace,
        manifest: &cli.workspace,
        config,
    };

    match cli.command {
        Command::Deps(args) => session.deps(args.action, &mut StdinPrompt),
        Command::Tree(args) => session.tree(args),
        Command::Components(args) => session.components(args),
        Command::Export(args) => session.export(args),
    }
}

struct Session<'a> {
    workspace: Arc<InMemoryWorkspace>,
    manifest: &'a Path,
    config: CliConfig,
}

impl Session<'_> {
    fn container(&self, name: &str) -> anyhow::Result<Container> {
        self.workspace
            .find_container(name)?
            .ok_or_else(|| anyhow!("no loaded container named {name:?}"))
    }

    fn editor(&self) -> anyhow::Result<DependencyEditor> {
        let workspace: Arc<dyn Workspace> = self.workspace.clone();
        Ok(DependencyEditor::open(workspace)?)
    }

    fn deps(&self, action: DepsAction, prompt: &mut dyn Confirm) -> anyhow::Result<()> {
        match action {
            DepsAction::List { file } => {
                let scope = match file {
                    Some(name) => ContainerScope::Container(self.container(&name)?.id),
                    None => ContainerScope::All,
                };
                for entry in self.editor()?.list(scope)? {
                    match entry.label {
                        EntryLabel::Dependency(_) => println!("{entry}"),
                        _ => println!("{}", entry.to_string().bold()),
                    }
                }
                Ok(())
            }
            DepsAction::Add { file, path, guid } => {
                let container = self.container(&file)?;
                let record = dependency_record(path, guid)?;
                let mut editor = self.editor()?;
                editor.add(container.id.into(), record.clone())?;
                self.commit(&mut editor)?;
                println!("{} Added {} to {}", "✓".green().bold(), record, container.name.bold());
                Ok(())
            }
            DepsAction::Remove { file, index, yes } => {
                let container = self.container(&file)?;
                let mut editor = self.editor()?;
                let assume_yes = yes || self.config.assume_yes;
                let mut confirm = |warning: &str| assume_yes || prompt.confirm(warning);
                match editor.remove(container.id.into(), index, &mut confirm)? {
                    EditOutcome::Applied => {
                        self.commit(&mut editor)?;
                        println!("{} Removed dependency {}", "✓".green().bold(), index);
                    }
                    EditOutcome::Declined => println!("Cancelled."),
                }
                Ok(())
            }
            DepsAction::Move {
                file,
                index,
                direction,
                yes,
            } => {
                let container = self.container(&file)?;
                let mut editor = self.editor()?;
                let assume_yes = yes || self.config.assume_yes;
                let mut confirm = |warning: &str| assume_yes || prompt.confirm(warning);
                let direction = direction.into();
                match editor.move_dependency(container.id.into(), index, direction, &mut confirm)? {
                    EditOutcome::Applied => {
                        self.commit(&mut editor)?;
                        println!(
                            "{} Moved dependency {} {}",
                            "✓".green().bold(),
                            index,
                            direction
                        );
                    }
                    EditOutcome::Declined => println!("Cancelled."),
                }
                Ok(())
            }
        }
    }

    fn commit(&self, editor: &mut DependencyEditor) -> anyhow::Result<()> {
        if editor.commit()?.is_empty() {
            return Ok(());
        }
        self.workspace
            .save_manifest(self.manifest)
            .with_context(|| format!("failed to save workspace {}", self.manifest.display()))
    }

    fn tree(&self, args: TreeArgs) -> anyhow::Result<()> {
        let container = self.container(&args.file)?;
        let mut options = self.config.build.clone();
        if args.max_depth.is_some() {
            options.max_depth = args.max_depth;
        }
        let forest = HierarchyBuilder::with_options(self.workspace.as_ref(), options)
            .build(container.id.into())?;

        for root in forest.roots() {
            print_node(root, 0);
        }
        if !forest.skipped.is_empty() {
            println!(
                "{} {} link(s) omitted",
                "!".yellow().bold(),
                forest.skipped.len()
            );
        }
        Ok(())
    }

    fn forest(&self, container: &Container) -> anyhow::Result<HierarchyForest> {
        Ok(
            HierarchyBuilder::with_options(self.workspace.as_ref(), self.config.build.clone())
                .build(container.id.into())?,
        )
    }

    /// Resolve every component of the node at `path_id`.
    fn component_rows(
        &self,
        container: &Container,
        path_id: i64,
    ) -> anyhow::Result<Vec<ComponentRow>> {
        let forest = self.forest(container)?;
        let owner = find_node(&forest, container, path_id)?.display;
        let workspace = self.workspace.as_ref();

        let mut rows = Vec::new();
        for reference in components_of(workspace, &owner)? {
            let row = match try_resolve(workspace, owner.container(), &reference)? {
                Some((object, field)) => ComponentRow::Found {
                    name: DefaultNamer.display_name(workspace, &object, &field),
                    file: workspace.container(object.container())?.file_name().to_string(),
                    object,
                    field,
                },
                None => ComponentRow::Missing(reference),
            };
            rows.push(row);
        }
        Ok(rows)
    }

    fn components(&self, args: ComponentsArgs) -> anyhow::Result<()> {
        let container = self.container(&args.file)?;
        let serializer = args.format.map(|format| format.serializer());

        for row in self.component_rows(&container, args.path_id)? {
            match row {
                ComponentRow::Found {
                    object,
                    name,
                    file,
                    field,
                } => {
                    println!(
                        "{}  {}  {} {}",
                        object.key.to_string().dimmed(),
                        object.class_id.to_string().cyan(),
                        name.bold(),
                        format!("({file})").dimmed()
                    );
                    if let Some(serializer) = &serializer {
                        let bytes = serializer.serialize(&object, &field)?;
                        println!("{}", String::from_utf8_lossy(&bytes));
                    }
                }
                ComponentRow::Missing(reference) => {
                    println!("{} {}", "missing".yellow(), reference);
                }
            }
        }
        Ok(())
    }

    fn export(&self, args: ExportArgs) -> anyhow::Result<()> {
        let container = self.container(&args.file)?;
        let forest = self.forest(&container)?;
        let node = find_node(&forest, &container, args.path_id)?;

        let mut options = self.config.export.clone();
        if let Some(format) = args.format {
            options.format = format;
        }
        options.fail_fast |= args.fail_fast;
        let exporter = Exporter::new(self.workspace.as_ref()).with_options(options);

        let mut fs_sink = FsSink;
        let mut memory_sink = MemorySink::new();
        let sink: &mut dyn ArtifactSink = if args.dry_run {
            &mut memory_sink
        } else {
            &mut fs_sink
        };
        let report = exporter.export_subtree(node, &args.out, sink)?;
        print_report(&report, args.dry_run);
        Ok(())
    }
}

/// One component of a hierarchy node.
#[derive(Debug)]
enum ComponentRow {
    Found {
        object: ObjectHandle,
        name: String,
        file: String,
        field: ValueField,
    },
    Missing(ObjectReference),
}

fn find_node<'f>(
    forest: &'f HierarchyForest,
    container: &Container,
    path_id: i64,
) -> anyhow::Result<&'f HierarchyNode> {
    let key = ObjectKey::new(container.id, path_id);
    forest
        .find(&key)
        .ok_or_else(|| anyhow!("no hierarchy node at {key}"))
}

/// Reads the confirmation answer from stdin.
struct StdinPrompt;

impl Confirm for StdinPrompt {
    fn confirm(&mut self, warning: &str) -> bool {
        eprint!("{} {} [y/N] ", "warning:".yellow().bold(), warning);
        if io::stderr().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
    }
}

fn dependency_record(
    path: Option<String>,
    guid: Option<String>,
) -> anyhow::Result<DependencyRecord> {
    match (path, guid) {
        (Some(path), None) => Ok(DependencyRecord::path(path)),
        (None, Some(guid)) => {
            let guid = Guid128::from_hex(&guid).with_context(|| format!("bad guid {guid:?}"))?;
            Ok(DependencyRecord::guid(guid))
        }
        _ => Err(anyhow!("give exactly one of --path or --guid")),
    }
}

fn print_node(node: &HierarchyNode, depth: usize) {
    let name = if node.name.is_empty() {
        "(unnamed)".dimmed().to_string()
    } else {
        node.name.bold().to_string()
    };
    println!(
        "{}{} {}",
        "  ".repeat(depth),
        name,
        format!("[{} / {}]", node.display.key, node.spatial.key).dimmed()
    );
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn print_report(report: &ExportReport, dry_run: bool) {
    let verb = if dry_run { "Would write" } else { "Wrote" };
    for path in &report.written {
        println!("  {} {}", verb.green(), path.display());
    }
    for skipped in &report.skipped {
        println!(
            "  {} missing component {} of {}",
            "skipped".yellow(),
            skipped.reference,
            skipped.owner
        );
    }
    for failure in &report.failures {
        println!(
            "  {} {}: {}",
            "failed".red().bold(),
            failure.path.display(),
            failure.source
        );
    }
    let mark = if report.is_complete() {
        "✓".green().bold()
    } else {
        "!".yellow().bold()
    };
    println!("{} {} artifact(s)", mark, report.written.len());
}
