//! Loading and hydrating the structure document.
//!
//! `load` never fails: a missing or corrupt document yields the empty
//! fallback root. `hydrate` never fails either: a file whose source can't be
//! read gets [`HYDRATION_ERROR`] as its content while its siblings carry on.

use crate::fs::FileSystem;
use crate::index::locate;
use crate::model::TreeNode;
use crate::style;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Content substituted for a file whose source couldn't be read.
pub const HYDRATION_ERROR: &str = "Error reading file";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse structure document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Refusing path outside the source root: {0}")]
    InvalidPath(String),
    #[error("Duplicate node names: {}", .0.join(", "))]
    DuplicateNames(Vec<String>),
}

/// `{type: directory, name: "root", children: []}`
pub fn fallback_tree() -> TreeNode {
    TreeNode::directory("root", Vec::new())
}

pub struct Loader<'a> {
    fs: &'a dyn FileSystem,
    structure: PathBuf,
    source_root: PathBuf,
}

impl<'a> Loader<'a> {
    pub fn new(fs: &'a dyn FileSystem, structure: &Path, source_root: &Path) -> Self {
        Self {
            fs,
            structure: structure.to_path_buf(),
            source_root: source_root.to_path_buf(),
        }
    }

    pub fn structure_path(&self) -> &Path {
        &self.structure
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Read and parse the document, surfacing any failure.
    pub fn try_load(&self) -> Result<TreeNode, LoadError> {
        let text = self
            .fs
            .read_to_string(&self.structure)
            .map_err(|source| LoadError::Io {
                path: self.structure.clone(),
                source,
            })?;
        parse_structure(&text)
    }

    /// Read and parse the document, falling back to an empty root on failure.
    /// Duplicate names are reported but tolerated.
    pub fn load(&self) -> TreeNode {
        match self.try_load() {
            Ok(tree) => {
                if let Err(e) = check_unique_names(&tree) {
                    style::warning(&format!(
                        "{}: {} (lookups resolve to the first match)",
                        style::path(&self.structure),
                        e
                    ));
                }
                tree
            }
            Err(e) => {
                style::warning(&format!("Error reading codebase structure: {}", e));
                fallback_tree()
            }
        }
    }

    /// Attach source text to every file node. Order and all other fields are
    /// preserved; sibling subtrees are read in parallel.
    pub fn hydrate(&self, root: TreeNode) -> TreeNode {
        // The root's own name isn't part of any relative path.
        self.hydrate_at(root, &[], true)
    }

    /// A copy of the node at pre-order position `id`, with its source
    /// attached when it is a file. Nothing else in the tree is read.
    pub fn hydrate_one(&self, root: &TreeNode, id: usize) -> Option<TreeNode> {
        let (trail, node) = locate(root, id)?;
        if node.is_directory() {
            return Some(node.clone());
        }
        Some(self.hydrate_at(node.clone(), &trail, id == 0))
    }

    fn hydrate_at(&self, mut node: TreeNode, ancestors: &[String], is_root: bool) -> TreeNode {
        if node.is_file() {
            let source = self.file_source(&node, ancestors).unwrap_or_else(|e| {
                style::warning(&format!("Error reading file {}: {}", node.name, e));
                HYDRATION_ERROR.to_string()
            });
            node.set_source(source);
            return node;
        }

        if let Some(children) = node.children.take() {
            let mut trail = ancestors.to_vec();
            if !is_root {
                trail.push(node.name.clone());
            }
            let trail = &trail;
            node.children = Some(
                children
                    .into_par_iter()
                    .map(|child| self.hydrate_at(child, trail, false))
                    .collect(),
            );
        }
        node
    }

    fn file_source(&self, node: &TreeNode, ancestors: &[String]) -> Result<String, LoadError> {
        let relative = match &node.path {
            Some(path) => path.clone(),
            None => ancestors
                .iter()
                .chain(std::iter::once(&node.name))
                .cloned()
                .collect::<Vec<_>>()
                .join("/"),
        };
        self.read_source(&relative)
    }

    /// Read one source file addressed relative to the source root.
    pub fn read_source(&self, relative: &str) -> Result<String, LoadError> {
        let full = self.resolve(relative)?;
        self.fs
            .read_to_string(&full)
            .map_err(|source| LoadError::Io { path: full, source })
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, LoadError> {
        let rel = Path::new(relative);
        let escapes = relative.is_empty()
            || rel.components().any(|c| {
                matches!(
                    c,
                    Component::ParentDir | Component::RootDir | Component::Prefix(_)
                )
            });
        if escapes {
            return Err(LoadError::InvalidPath(relative.to_string()));
        }
        Ok(self.source_root.join(rel))
    }
}

/// Parse a structure document and normalize directory child lists.
pub fn parse_structure(text: &str) -> Result<TreeNode, LoadError> {
    let mut tree: TreeNode = serde_json::from_str(text)?;
    tree.normalize();
    Ok(tree)
}

/// Names occurring more than once, in order of their first occurrence.
pub fn duplicate_names(root: &TreeNode) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for node in root.iter() {
        let count = counts.entry(node.name.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(node.name.clone());
        }
    }
    order
}

pub fn check_unique_names(root: &TreeNode) -> Result<(), LoadError> {
    let duplicates = duplicate_names(root);
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(LoadError::DuplicateNames(duplicates))
    }
}
