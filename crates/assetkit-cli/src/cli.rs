use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use assetkit_deps::MoveDirection;
use assetkit_hierarchy::DumpFormat;

#[derive(Parser)]
#[command(
    name = "assetkit",
    about = "Edit asset container dependencies and export object hierarchies",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML file with build, export and prompt settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace manifest (JSON)
    #[arg(short, long, global = true, default_value = "workspace.json")]
    pub workspace: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// List, add, remove or reorder container dependencies
    Deps(DepsArgs),
    /// Print the object hierarchy of a container
    Tree(TreeArgs),
    /// List the components of a hierarchy node
    Components(ComponentsArgs),
    /// Export a subtree's components to a directory
    Export(ExportArgs),
}

#[derive(Args)]
pub struct DepsArgs {
    #[command(subcommand)]
    pub action: DepsAction,
}

#[derive(Subcommand)]
pub enum DepsAction {
    /// Show a container's dependency list, or every loaded container
    List {
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Append a dependency
    Add {
        #[arg(short, long)]
        file: String,
        #[arg(long, conflicts_with = "guid", required_unless_present = "guid")]
        path: Option<String>,
        /// 32 hex digits
        #[arg(long)]
        guid: Option<String>,
    },
    /// Remove the dependency at INDEX (1-based)
    Remove {
        #[arg(short, long)]
        file: String,
        index: usize,
        #[arg(short, long)]
        yes: bool,
    },
    /// Move the dependency at INDEX one step
    Move {
        #[arg(short, long)]
        file: String,
        index: usize,
        direction: Direction,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

#[derive(Args)]
pub struct TreeArgs {
    #[arg(short, long)]
    pub file: String,
    #[arg(long)]
    pub max_depth: Option<usize>,
}

#[derive(Args)]
pub struct ComponentsArgs {
    #[arg(short, long)]
    pub file: String,
    /// Path id of the node's GameObject or Transform
    #[arg(long, allow_hyphen_values = true)]
    pub path_id: i64,
    /// Also dump each component's values
    #[arg(long)]
    pub format: Option<DumpFormat>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(short, long)]
    pub file: String,
    /// Path id of the subtree's GameObject or Transform
    #[arg(long, allow_hyphen_values = true)]
    pub path_id: i64,
    #[arg(short, long)]
    pub out: PathBuf,
    #[arg(long)]
    pub format: Option<DumpFormat>,
    /// Stop at the first write failure
    #[arg(long)]
    pub fail_fast: bool,
    /// Report what would be written without touching the disk
    #[arg(long)]
    pub dry_run: bool,
}
