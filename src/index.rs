//! Node index over an edge list, and lookups back into the tree by name or
//! by pre-order id.

use crate::links::Edge;
use crate::model::TreeNode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Display category of a node, derived from its name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Directory,
    C,
    H,
    Makefile,
    Other,
}

impl Category {
    /// Legend order.
    pub const ALL: [Category; 5] = [
        Category::Directory,
        Category::C,
        Category::H,
        Category::Makefile,
        Category::Other,
    ];

    /// Categorize a bare identifier: `directory` when there is no dot,
    /// otherwise by the text after the last dot. An arc endpoint named
    /// `Makefile` is therefore a directory; only tree nodes know better.
    pub fn of_id(id: &str) -> Category {
        match id.rsplit_once('.') {
            None => Category::Directory,
            Some((_, ext)) => Self::of_extension(ext),
        }
    }

    /// Categorize a tree node; its `type` decides `directory`, never its name.
    pub fn of_node(node: &TreeNode) -> Category {
        if node.is_directory() {
            return Category::Directory;
        }
        if node.name.eq_ignore_ascii_case("makefile") {
            return Category::Makefile;
        }
        node.name
            .rsplit_once('.')
            .map(|(_, ext)| Self::of_extension(ext))
            .unwrap_or(Category::Other)
    }

    fn of_extension(ext: &str) -> Category {
        match ext.to_ascii_lowercase().as_str() {
            "c" => Category::C,
            "h" => Category::H,
            _ => Category::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Directory => "directory",
            Category::C => "c",
            Category::H => "h",
            Category::Makefile => "makefile",
            Category::Other => "other",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Category::Directory => "#8BC34A",
            Category::C => "#2196F3",
            Category::H => "#FF9800",
            Category::Makefile => "#9C27B0",
            Category::Other => "#9E9E9E",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edge endpoint as drawn by the arc diagram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagramNode {
    pub id: String,
    pub group: Category,
}

impl DiagramNode {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let group = Category::of_id(&id);
        Self { id, group }
    }
}

/// Unique endpoints of `edges`, in first-seen order (source before target).
pub fn nodes_of(edges: &[Edge]) -> Vec<DiagramNode> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::new();
    for edge in edges {
        for id in [edge.source.as_str(), edge.target.as_str()] {
            if seen.insert(id) {
                nodes.push(DiagramNode::new(id));
            }
        }
    }
    nodes
}

/// First node named `id` in pre-order.
pub fn find_by_name<'a>(root: &'a TreeNode, id: &str) -> Option<&'a TreeNode> {
    root.iter().find(|node| node.name == id)
}

/// Pre-order position of the first node named `name`.
pub fn id_of(root: &TreeNode, name: &str) -> Option<usize> {
    root.iter().position(|node| node.name == name)
}

/// Node at pre-order position `id` (the root is 0).
pub fn find_by_id(root: &TreeNode, id: usize) -> Option<&TreeNode> {
    locate(root, id).map(|(_, node)| node)
}

/// Node at pre-order position `id`, with the names of its ancestors below
/// the root, outermost first.
pub fn locate(root: &TreeNode, id: usize) -> Option<(Vec<String>, &TreeNode)> {
    let mut node = root;
    let mut remaining = id;
    let mut trail = Vec::new();
    while remaining > 0 {
        remaining -= 1;
        let mut next = None;
        for child in node.children() {
            let size = child.node_count();
            if remaining < size {
                next = Some(child);
                break;
            }
            remaining -= size;
        }
        let child = next?;
        if !std::ptr::eq(node, root) {
            trail.push(node.name.clone());
        }
        node = child;
    }
    Some((trail, node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::{View, extract};

    fn example() -> TreeNode {
        TreeNode::directory(
            "root",
            vec![
                TreeNode::file("a.c").with_dependencies(["b.h"]),
                TreeNode::file("b.h"),
            ],
        )
    }

    #[test]
    fn test_dependency_example() {
        let root = example();
        let edges = extract(View::Dependency, &root);
        assert_eq!(edges, vec![Edge::new("a.c", "b.h")]);
        assert_eq!(
            nodes_of(&edges),
            vec![
                DiagramNode {
                    id: "a.c".into(),
                    group: Category::C
                },
                DiagramNode {
                    id: "b.h".into(),
                    group: Category::H
                },
            ]
        );
    }

    #[test]
    fn test_nodes_are_unique_and_drawn_from_edges() {
        let edges = vec![
            Edge::new("root", "src"),
            Edge::new("src", "a.c"),
            Edge::new("src", "b.h"),
            Edge::new("root", "Makefile"),
        ];
        let nodes = nodes_of(&edges);
        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "src", "a.c", "b.h", "Makefile"]);

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        for id in ids {
            assert!(edges.iter().any(|e| e.touches(id)));
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(Category::of_id("src"), Category::Directory);
        assert_eq!(Category::of_id("d_main.c"), Category::C);
        assert_eq!(Category::of_id("DOOMDEF.H"), Category::H);
        assert_eq!(Category::of_id("Makefile"), Category::Directory);
        assert_eq!(Category::of_id("MAKEFILE"), Category::Directory);
        assert_eq!(Category::of_id("notes.txt"), Category::Other);
        assert_eq!(Category::of_id("archive.tar.c"), Category::C);
    }

    #[test]
    fn test_node_category_uses_type() {
        assert_eq!(Category::of_node(&TreeNode::file("README")), Category::Other);
        assert_eq!(
            Category::of_node(&TreeNode::directory("v1.10", Vec::new())),
            Category::Directory
        );
        assert_eq!(Category::of_node(&TreeNode::file("makefile")), Category::Makefile);
        assert_eq!(Category::of_node(&TreeNode::file("Makefile")), Category::Makefile);
    }

    #[test]
    fn test_makefile_edge_endpoint_is_directory() {
        let root = TreeNode::directory("linuxdoom", vec![TreeNode::file("Makefile")]);
        let nodes = nodes_of(&extract(View::Hierarchy, &root));
        assert_eq!(nodes[1].id, "Makefile");
        assert_eq!(nodes[1].group, Category::Directory);
    }

    fn duplicated() -> TreeNode {
        TreeNode::directory(
            "DOOM",
            vec![
                TreeNode::directory(
                    "linuxdoom",
                    vec![
                        TreeNode::file("d_main.c").with_size(30),
                        TreeNode::file("Makefile").with_size(100),
                    ],
                ),
                TreeNode::directory("sndserv", vec![TreeNode::file("Makefile").with_size(7)]),
            ],
        )
    }

    #[test]
    fn test_find_by_id_reaches_every_duplicate() {
        let root = duplicated();
        assert_eq!(id_of(&root, "Makefile"), Some(3));
        assert_eq!(find_by_id(&root, 3).and_then(|n| n.size), Some(100));
        assert_eq!(find_by_id(&root, 5).and_then(|n| n.size), Some(7));
        assert_eq!(find_by_id(&root, 0).map(|n| n.name.as_str()), Some("DOOM"));
        assert!(find_by_id(&root, 6).is_none());

        for (id, node) in root.iter().enumerate() {
            assert!(std::ptr::eq(find_by_id(&root, id).unwrap(), node));
        }
    }

    #[test]
    fn test_locate_trail_excludes_root() {
        let root = duplicated();
        let (trail, node) = locate(&root, 5).unwrap();
        assert_eq!(trail, vec!["sndserv"]);
        assert_eq!(node.size, Some(7));

        let (trail, _) = locate(&root, 4).unwrap();
        assert_eq!(trail, Vec::<String>::new());
        let (trail, _) = locate(&root, 0).unwrap();
        assert!(trail.is_empty());
    }

    #[test]
    fn test_find_by_name_first_preorder_match() {
        let root = TreeNode::directory(
            "root",
            vec![
                TreeNode::directory("a", vec![TreeNode::file("x.c").with_size(1)]),
                TreeNode::file("x.c").with_size(2),
            ],
        );
        let found = find_by_name(&root, "x.c").unwrap();
        assert_eq!(found.size, Some(1));
        assert_eq!(find_by_name(&root, "x.c"), Some(found));
        assert!(find_by_name(&root, "missing.c").is_none());
        assert_eq!(find_by_name(&root, "root").map(|n| n.name.as_str()), Some("root"));
    }
}
