use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The two kinds of artifact a structure document describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Directory => write!(f, "directory"),
            NodeKind::File => write!(f, "file"),
        }
    }
}

/// Per-file content block. Only `source` is interpreted; anything else the
/// generator wrote (function tables, defines, ...) is carried through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directory or file in a codebase-structure document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<SourceContent>,
    /// Generator fields with no meaning here (timestamps, analysis notes).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TreeNode {
    pub fn directory(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            children: Some(children),
            ..Self::bare(name.into(), NodeKind::Directory)
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::bare(name.into(), NodeKind::File)
    }

    fn bare(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            size: None,
            path: None,
            children: None,
            dependencies: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            readme: None,
            content: None,
            extra: Map::new(),
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_readme(mut self, readme: impl Into<String>) -> Self {
        self.readme = Some(readme.into());
        self
    }

    pub fn with_content(mut self, content: SourceContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Set a generator field that has no typed slot.
    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Children in document order; empty for files.
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Hydrated source text, if any.
    pub fn source(&self) -> Option<&str> {
        self.content.as_ref()?.source.as_deref()
    }

    pub fn set_source(&mut self, source: String) {
        self.content
            .get_or_insert_with(SourceContent::default)
            .source = Some(source);
    }

    /// Depth-first, node before its children.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Length of the longest root-to-leaf path, counted in edges.
    pub fn height(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Sum of file sizes in this subtree; missing sizes count as zero. A
    /// directory's own `size` is ignored.
    pub fn total_size(&self) -> u64 {
        match self.kind {
            NodeKind::File => self.size.unwrap_or(0),
            NodeKind::Directory => self.children().iter().map(TreeNode::total_size).sum(),
        }
    }

    /// Bring `children` in line with `kind`: every directory carries a
    /// (possibly empty) child list.
    pub fn normalize(&mut self) {
        if self.is_directory() && self.children.is_none() {
            self.children = Some(Vec::new());
        }
        if let Some(children) = self.children.as_mut() {
            for child in children {
                child.normalize();
            }
        }
    }
}

pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::directory(
            "root",
            vec![
                TreeNode::directory("src", vec![TreeNode::file("main.c").with_size(10)]),
                TreeNode::file("Makefile").with_size(5),
            ],
        )
    }

    #[test]
    fn test_preorder_visits_parent_before_children() {
        let tree = sample();
        let names: Vec<_> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["root", "src", "main.c", "Makefile"]);
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.total_size(), 15);
    }

    #[test]
    fn test_total_size_ignores_directory_sizes() {
        let mut tree = sample();
        tree.size = Some(4096);
        if let Some(children) = tree.children.as_mut() {
            children[0].size = Some(512);
        }
        assert_eq!(tree.total_size(), 15);
        assert_eq!(tree.children()[0].total_size(), 10);
    }

    #[test]
    fn test_deserialize_keeps_unknown_fields() {
        let json = r#"{
            "name": "doom.c",
            "type": "file",
            "size": 120,
            "last_modified": "1997-12-23T00:00:00",
            "dependencies": ["doomdef.h"],
            "content": {"functions": []}
        }"#;
        let node: TreeNode = serde_json::from_str(json).unwrap();
        assert!(node.is_file());
        assert_eq!(node.dependencies, vec!["doomdef.h"]);
        assert!(node.extra.contains_key("last_modified"));
        assert!(node.content.as_ref().unwrap().extra.contains_key("functions"));

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["last_modified"], "1997-12-23T00:00:00");
        assert_eq!(back["type"], "file");
        assert!(back.get("children").is_none());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"name": "Makefile", "type": "makefile"}"#;
        assert!(serde_json::from_str::<TreeNode>(json).is_err());
    }

    #[test]
    fn test_normalize_gives_directories_children() {
        let mut node: TreeNode =
            serde_json::from_str(r#"{"name": "root", "type": "directory"}"#).unwrap();
        assert!(node.children.is_none());
        node.normalize();
        assert_eq!(node.children, Some(Vec::new()));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["children"], serde_json::json!([]));
    }

    #[test]
    fn test_set_source_creates_content() {
        let mut node = TreeNode::file("a.c");
        assert_eq!(node.source(), None);
        node.set_source("int x;".to_string());
        assert_eq!(node.source(), Some("int x;"));
    }
}
