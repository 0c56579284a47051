//! Build a structure document from a C source tree.
//!
//! Each retained file gets its size, modification time, path relative to
//! the scan root and a stub readme, plus the tables in [`CSource`]. A file's
//! `dependencies` are its includes, its `inputs` the distinct parameter
//! names of its functions and its `outputs` their distinct non-`void` return
//! types. Directories that end up with no retained files are dropped.

mod c_source;

pub use c_source::{CSource, includes};

use crate::model::{SourceContent, TreeNode};
use crate::style;
use chrono::{DateTime, Local};
use ignore::WalkBuilder;
use rayon::prelude::*;
use regex::Regex;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Cannot scan {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),
}

/// Build-system leftovers and docs that aren't part of the code map.
static IGNORED_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(readme.*|files\d*|todo|changelog|.*\.h\.gch)$").expect("valid regex")
});

/// Placeholder the analysis pass fills in later.
pub const REFACTORING_PENDING: &str = "To be analyzed by LLM";

/// Walk `root` and describe it as a directory tree.
pub fn scan(root: &Path) -> Result<TreeNode, ScanError> {
    let meta = std::fs::metadata(root).map_err(|source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ScanError::Io {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }

    let files = collect_files(root)?;
    let nodes: Vec<(Vec<String>, TreeNode)> = files
        .into_par_iter()
        .map(|relative| {
            let node = describe_file(root, &relative);
            (relative, node)
        })
        .collect();

    let mut tree = DirBuilder::default();
    for (relative, node) in nodes {
        tree.insert(&relative[..relative.len() - 1], node);
    }
    Ok(tree.build(root_name(root)))
}

pub fn is_ignored(file_name: &str) -> bool {
    IGNORED_FILE.is_match(file_name)
}

/// Relative paths of retained files, as component lists.
fn collect_files(root: &Path) -> Result<Vec<Vec<String>>, ScanError> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && entry.file_name() == "CVS")
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if is_ignored(&name) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        files.push(
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect(),
        );
    }
    Ok(files)
}

fn describe_file(root: &Path, relative: &[String]) -> TreeNode {
    let name = relative.last().cloned().unwrap_or_default();
    let rel_path = relative.join("/");
    let full = root.join(relative.iter().collect::<PathBuf>());

    let mut node = TreeNode::file(name.clone())
        .with_path(rel_path.clone())
        .with_readme(stub_readme(&name))
        .with_extra("source_code_path", json!(rel_path))
        .with_extra("refactoring_potential", json!(REFACTORING_PENDING));

    if let Some(modified) = last_modified(&full) {
        node = node.with_extra("last_modified", json!(modified));
    }

    match std::fs::read(&full) {
        Ok(bytes) => {
            // Old sources aren't always UTF-8; identifiers survive a lossy decode.
            let text = String::from_utf8_lossy(&bytes);
            let parsed = CSource::parse(&text);
            let node = node
                .with_size(bytes.len() as u64)
                .with_dependencies(includes(&text))
                .with_inputs(parsed.parameter_names())
                .with_outputs(parsed.return_types())
                .with_extra(
                    "optimization_opportunities",
                    json!(parsed.optimization_opportunities()),
                );
            match serde_json::to_value(&parsed) {
                Ok(Value::Object(extra)) => node.with_content(SourceContent {
                    source: None,
                    extra,
                }),
                _ => node,
            }
        }
        Err(e) => {
            style::warning(&format!("Error reading {}: {}", style::path(&full), e));
            match std::fs::metadata(&full) {
                Ok(meta) => node.with_size(meta.len()),
                Err(_) => node,
            }
        }
    }
}

/// Local modification time as `YYYY-MM-DDTHH:MM:SS.ffffff`.
fn last_modified(path: &Path) -> Option<String> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let local: DateTime<Local> = modified.into();
    Some(local.format("%Y-%m-%dT%H:%M:%S%.6f").to_string())
}

/// The stem is everything before the first dot: `a.tar.c` is about `a`.
pub fn stub_readme(name: &str) -> String {
    let stem = name.split('.').next().unwrap_or(name);
    format!(
        "# {}\n\nThis file contains functionality related to {}.",
        name, stem
    )
}

fn root_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| root.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

#[derive(Default)]
struct DirBuilder {
    dirs: BTreeMap<String, DirBuilder>,
    files: Vec<TreeNode>,
}

impl DirBuilder {
    fn insert(&mut self, dirs: &[String], file: TreeNode) {
        match dirs.split_first() {
            Some((first, rest)) => self.dirs.entry(first.clone()).or_default().insert(rest, file),
            None => self.files.push(file),
        }
    }

    fn build(self, name: String) -> TreeNode {
        let mut children: Vec<TreeNode> = self
            .dirs
            .into_iter()
            .map(|(name, dir)| dir.build(name))
            .chain(self.files)
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        TreeNode::directory(name, children)
    }
}
