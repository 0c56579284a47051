//! Library API for codemap.
//!
//! The CLI commands print and return exit codes; these functions return
//! `Result`s so the loader, link extraction and renderers can be driven
//! from other Rust code.
//!
//! # Example
//!
//! ```no_run
//! use codemap::{OpenOptions, links, open_structure};
//! use std::path::Path;
//!
//! let tree = open_structure(
//!     Path::new("codebase_structure.json"),
//!     Path::new("source-original"),
//!     OpenOptions::default(),
//! )?;
//! let deps = links(&tree, "dependency")?;
//! for edge in &deps.links {
//!     println!("{} -> {}", edge.source, edge.target);
//! }
//! # Ok::<(), codemap::CodemapError>(())
//! ```

use crate::config::ConfigError;
use crate::fs::default_fs;
use crate::index::{DiagramNode, find_by_name, nodes_of};
use crate::links::{Edge, View, extract};
use crate::loader::{LoadError, Loader, check_unique_names};
use crate::model::TreeNode;
use crate::panel::{DetailPanel, PanelSubject};
use crate::render::{ArcDiagram, Dimensions, Renderer, TreeView, treemap};
use crate::scan::{ScanError, scan};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during codemap operations.
#[derive(Debug, Error)]
pub enum CodemapError {
    /// The specified path could not be found.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The structure document couldn't be read, parsed or validated.
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Unknown view: {0}. Valid options: hierarchy, dependency, input, output")]
    UnknownView(String),

    /// No node with this name in the tree.
    #[error("No node named {0}")]
    NodeNotFound(String),

    /// Pre-order id past the end of the tree.
    #[error("No node at position {0}")]
    NodeIdNotFound(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for [`open_structure`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Attach each file's source text.
    pub include_source: bool,
    /// Reject documents whose node names aren't unique.
    pub strict: bool,
}

/// Edges of one view plus the nodes they touch.
#[derive(Debug, Clone, Serialize)]
pub struct LinkSet {
    pub view: View,
    pub links: Vec<Edge>,
    pub nodes: Vec<DiagramNode>,
}

/// Options for [`render_svg`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub dimensions: Dimensions,
    /// Link view drawn by the arc diagram.
    pub view: View,
    /// Tree nodes to expand before drawing, in order.
    pub expand: Vec<String>,
}

/// Read a structure document, surfacing errors instead of falling back.
pub fn open_structure(
    structure: &Path,
    source_root: &Path,
    options: OpenOptions,
) -> Result<TreeNode, CodemapError> {
    if !structure.exists() {
        return Err(CodemapError::PathNotFound(structure.to_path_buf()));
    }
    let loader = Loader::new(default_fs(), structure, source_root);
    let tree = loader.try_load()?;
    if options.strict {
        check_unique_names(&tree)?;
    }
    if options.include_source {
        Ok(loader.hydrate(tree))
    } else {
        Ok(tree)
    }
}

/// Extract the edges of the named view (`hierarchy`, `dependency`,
/// `input`, `output`; plurals accepted).
pub fn links(root: &TreeNode, view: &str) -> Result<LinkSet, CodemapError> {
    let view = View::parse(view).ok_or_else(|| CodemapError::UnknownView(view.to_string()))?;
    let links = extract(view, root);
    let nodes = nodes_of(&links);
    Ok(LinkSet { view, links, nodes })
}

/// Detail panel for `name`. Names missing from the tree get the minimal
/// panel, as a renderer would show for a bare reference.
pub fn details(root: &TreeNode, name: &str) -> DetailPanel {
    let reference = DiagramNode::new(name);
    match find_by_name(root, name) {
        Some(node) => DetailPanel::build(PanelSubject::Full(node)),
        None => DetailPanel::build(PanelSubject::Minimal(&reference)),
    }
}

/// Detail panel for the node at pre-order position `id`, the way tree and
/// treemap clicks address nodes. Unlike names, ids never collide.
pub fn details_at(root: &TreeNode, id: usize) -> Result<DetailPanel, CodemapError> {
    PanelSubject::at(root, id)
        .map(DetailPanel::build)
        .ok_or(CodemapError::NodeIdNotFound(id))
}

/// Draw `root` as a standalone SVG document.
pub fn render_svg(
    root: &TreeNode,
    renderer: Renderer,
    options: &RenderOptions,
) -> Result<String, CodemapError> {
    let dims = options.dimensions;
    match renderer {
        Renderer::Tree => {
            let mut view = TreeView::new(root, dims);
            for name in &options.expand {
                let id = view
                    .state()
                    .id_of(name)
                    .ok_or_else(|| CodemapError::NodeNotFound(name.clone()))?;
                if !view.state().is_expanded(id) {
                    view.click(id);
                }
            }
            Ok(view.to_svg())
        }
        Renderer::Treemap => Ok(treemap::render(root, dims)),
        Renderer::Arc => {
            let mut diagram = ArcDiagram::new(root, dims);
            diagram.set_view(options.view);
            Ok(diagram.to_svg())
        }
    }
}

/// Describe a C source directory as a structure document.
pub fn scan_directory(dir: &Path) -> Result<TreeNode, CodemapError> {
    if !dir.exists() {
        return Err(CodemapError::PathNotFound(dir.to_path_buf()));
    }
    Ok(scan(dir)?)
}
