//! Edge extraction for the arc diagram.
//!
//! Every extractor walks the tree in pre-order and emits a node's own edges
//! before recursing into its children, so the output order is deterministic.

use crate::model::TreeNode;
use serde::{Deserialize, Serialize};

/// Which relation of the tree is projected into edges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// parent → child
    #[default]
    Hierarchy,
    /// file → dependency
    Dependency,
    /// input → file
    Input,
    /// file → output
    Output,
}

impl View {
    pub const ALL: [View; 4] = [View::Hierarchy, View::Dependency, View::Input, View::Output];

    /// Label shown in the view selector.
    pub fn label(self) -> &'static str {
        match self {
            View::Hierarchy => "Hierarchy",
            View::Dependency => "Dependencies",
            View::Input => "Inputs",
            View::Output => "Outputs",
        }
    }

    /// Accepts both the singular names and the selector's plural labels.
    pub fn parse(name: &str) -> Option<View> {
        match name.trim().to_lowercase().as_str() {
            "hierarchy" => Some(View::Hierarchy),
            "dependency" | "dependencies" => Some(View::Dependency),
            "input" | "inputs" => Some(View::Input),
            "output" | "outputs" => Some(View::Output),
            _ => None,
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Hierarchy => write!(f, "hierarchy"),
            View::Dependency => write!(f, "dependency"),
            View::Input => write!(f, "input"),
            View::Output => write!(f, "output"),
        }
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::parse(s).ok_or_else(|| {
            format!(
                "Unknown view: {}. Valid options: hierarchy, dependency, input, output",
                s
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

pub fn extract(view: View, root: &TreeNode) -> Vec<Edge> {
    let mut edges = Vec::new();
    collect(view, root, &mut edges);
    edges
}

/// Like [`extract`] but for a view named by the client; an unknown name
/// yields no edges.
pub fn extract_named(view: &str, root: &TreeNode) -> Vec<Edge> {
    View::parse(view)
        .map(|v| extract(v, root))
        .unwrap_or_default()
}

fn collect(view: View, node: &TreeNode, edges: &mut Vec<Edge>) {
    match view {
        View::Hierarchy => {
            for child in node.children() {
                edges.push(Edge::new(&node.name, &child.name));
                collect(view, child, edges);
            }
            return;
        }
        View::Dependency if node.is_file() => {
            edges.extend(node.dependencies.iter().map(|d| Edge::new(&node.name, d)));
        }
        View::Input if node.is_file() => {
            edges.extend(node.inputs.iter().map(|i| Edge::new(i, &node.name)));
        }
        View::Output if node.is_file() => {
            edges.extend(node.outputs.iter().map(|o| Edge::new(&node.name, o)));
        }
        _ => {}
    }

    for child in node.children() {
        collect(view, child, edges);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::directory(
            "root",
            vec![
                TreeNode::directory(
                    "linuxdoom",
                    vec![
                        TreeNode::file("d_main.c")
                            .with_dependencies(["doomdef.h", "d_net.h"])
                            .with_inputs(["argv", "argc"])
                            .with_outputs(["printf"]),
                        TreeNode::file("doomdef.h"),
                    ],
                ),
                TreeNode::file("i_video.c")
                    .with_dependencies(["doomdef.h"])
                    .with_outputs(["fprintf"]),
            ],
        )
    }

    #[test]
    fn test_hierarchy_is_spanning_tree_in_preorder() {
        let tree = sample();
        let edges = extract(View::Hierarchy, &tree);
        assert_eq!(edges.len(), tree.node_count() - 1);
        assert_eq!(
            edges,
            vec![
                Edge::new("root", "linuxdoom"),
                Edge::new("linuxdoom", "d_main.c"),
                Edge::new("linuxdoom", "doomdef.h"),
                Edge::new("root", "i_video.c"),
            ]
        );
    }

    #[test]
    fn test_dependency_edges_point_at_dependencies() {
        let edges = extract(View::Dependency, &sample());
        assert_eq!(
            edges,
            vec![
                Edge::new("d_main.c", "doomdef.h"),
                Edge::new("d_main.c", "d_net.h"),
                Edge::new("i_video.c", "doomdef.h"),
            ]
        );
    }

    #[test]
    fn test_input_edges_are_reversed() {
        let edges = extract(View::Input, &sample());
        assert_eq!(
            edges,
            vec![Edge::new("argv", "d_main.c"), Edge::new("argc", "d_main.c")]
        );
    }

    #[test]
    fn test_output_edges() {
        let edges = extract(View::Output, &sample());
        assert_eq!(
            edges,
            vec![
                Edge::new("d_main.c", "printf"),
                Edge::new("i_video.c", "fprintf")
            ]
        );
    }

    #[test]
    fn test_attribute_edge_count_matches_cardinality() {
        let tree = sample();
        let deps: usize = tree.iter().map(|n| n.dependencies.len()).sum();
        assert_eq!(extract(View::Dependency, &tree).len(), deps);
    }

    #[test]
    fn test_single_node_tree_has_no_edges() {
        let tree = TreeNode::directory("root", Vec::new());
        for view in View::ALL {
            assert!(extract(view, &tree).is_empty());
        }
    }

    #[test]
    fn test_unknown_view_name_yields_nothing() {
        assert!(extract_named("callers", &sample()).is_empty());
        assert_eq!(extract_named("Dependencies", &sample()).len(), 3);
    }

    #[test]
    fn test_view_parse_and_display() {
        for view in View::ALL {
            assert_eq!(View::parse(&view.to_string()), Some(view));
            assert_eq!(View::parse(view.label()), Some(view));
        }
        assert!("nope".parse::<View>().is_err());
    }
}
