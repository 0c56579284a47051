use crate::links::View;
use crate::render::Renderer;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codemap")]
#[command(about = "Explore a codebase-structure document as tree, treemap and arc diagrams")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project directory holding .codemap.toml (defaults to current directory)
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the interactive visualization and its JSON API
    Serve(ServeArgs),

    /// Print the edges of one link view
    Links(LinksArgs),

    /// Show the detail panel for a node
    Show(ShowArgs),

    /// Write a static SVG of one renderer
    Export(ExportArgs),

    /// Build a structure document from a C source tree
    Scan(ScanArgs),

    /// Generate a starter .codemap.toml configuration file
    Init(InitArgs),

    /// Validate the structure document (parse errors, duplicate names)
    Check(CheckArgs),
}

/// Overrides for the `[data]` section of the config.
#[derive(Parser, Debug, Clone, Default)]
pub struct DataArgs {
    /// Structure document (overrides [data] structure)
    #[arg(long)]
    pub structure: Option<PathBuf>,

    /// Directory source paths are relative to (overrides [data] source_root)
    #[arg(long)]
    pub source_root: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Port for HTTP server (overrides [server] port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Address to bind (overrides [server] host)
    #[arg(long)]
    pub host: Option<String>,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    /// Refuse to start if node names aren't unique
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct LinksArgs {
    /// View to extract
    #[arg(default_value = "hierarchy")]
    pub view: View,

    #[command(flatten)]
    pub data: DataArgs,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Node name to look up (first match in pre-order)
    #[arg(required_unless_present = "id")]
    pub name: Option<String>,

    /// Pre-order position of the node instead of a name; the root is 0
    #[arg(long, conflicts_with = "name")]
    pub id: Option<usize>,

    #[command(flatten)]
    pub data: DataArgs,

    /// Read the node's source and include it
    #[arg(long)]
    pub source: bool,

    /// Output format
    #[arg(short, long, default_value = "markdown")]
    pub format: PanelFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Renderer to draw
    #[arg(long, default_value = "tree")]
    pub view: Renderer,

    /// Link view for the arc diagram
    #[arg(long, default_value = "hierarchy")]
    pub links: View,

    /// Tree nodes to expand before drawing (repeatable)
    #[arg(long)]
    pub expand: Vec<String>,

    #[command(flatten)]
    pub data: DataArgs,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// Source directory to scan
    pub dir: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Path where to create .codemap.toml (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PanelFormat {
    #[default]
    Markdown,
    Html,
    Json,
}
