//! Collapsible tree renderer.
//!
//! [`TreeState`] holds every per-node field the renderer needs across
//! updates (expanded flag, stable id, current and previous position).
//! [`layout`] is a pure function of that state; [`TreeView::click`] is the
//! only mutation point and takes `&mut self`, so an update can never start
//! while another is being computed.

use super::layout::{self, Point};
use super::svg::{SvgWriter, num, translate};
use super::{Dimensions, legend};
use crate::index::Category;
use crate::model::TreeNode;
use crate::panel::PanelSubject;
use serde::Serialize;

/// Stable per-node id, assigned in pre-order when the state is built.
pub type NodeId = usize;

pub const TRANSITION_MS: u64 = 750;
const NODE_RADIUS: f64 = 7.0;

#[derive(Debug, Clone)]
struct StateNode {
    name: String,
    category: Category,
    depth: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    expanded: bool,
    position: Point,
    previous: Point,
}

#[derive(Debug, Clone)]
pub struct TreeState {
    nodes: Vec<StateNode>,
    levels: usize,
}

impl TreeState {
    /// Root expanded, everything below it collapsed.
    pub fn new(root: &TreeNode) -> Self {
        let mut nodes = Vec::with_capacity(root.node_count());
        Self::push(root, None, 0, &mut nodes);
        Self {
            nodes,
            levels: root.height(),
        }
    }

    fn push(node: &TreeNode, parent: Option<NodeId>, depth: usize, nodes: &mut Vec<StateNode>) {
        let id = nodes.len();
        nodes.push(StateNode {
            name: node.name.clone(),
            category: Category::of_node(node),
            depth,
            parent,
            children: Vec::new(),
            expanded: depth == 0,
            position: Point::default(),
            previous: Point::default(),
        });
        for child in node.children() {
            let child_id = nodes.len();
            nodes[id].children.push(child_id);
            Self::push(child, Some(id), depth + 1, nodes);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.expanded)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name.as_str())
    }

    /// First node with this name in pre-order.
    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Flip collapsed/expanded. Leaves have nothing to show or hide and keep
    /// their flag. Returns false for an unknown id.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                if !node.children.is_empty() {
                    node.expanded = !node.expanded;
                }
                true
            }
            None => false,
        }
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.expanded = expanded;
        }
    }

    /// Pre-order ids reachable through expanded nodes only.
    pub fn visible(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.nodes.is_empty() {
            return out;
        }
        let mut stack = vec![0];
        while let Some(id) = stack.pop() {
            out.push(id);
            let node = &self.nodes[id];
            if node.expanded {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.nodes.get(id).map(|n| n.position)
    }

    pub fn previous_position(&self, id: NodeId) -> Option<Point> {
        self.nodes.get(id).map(|n| n.previous)
    }

    fn record(&mut self, frame: &Frame) {
        for placed in &frame.nodes {
            let node = &mut self.nodes[placed.id];
            node.previous = node.position;
            node.position = placed.position;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedNode {
    pub id: NodeId,
    pub name: String,
    pub category: Category,
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub position: Point,
    pub has_children: bool,
    pub expanded: bool,
}

/// One laid-out state of the tree: visible nodes plus parent→child links.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Frame {
    pub nodes: Vec<PlacedNode>,
    pub links: Vec<(NodeId, NodeId)>,
}

impl Frame {
    pub fn get(&self, id: NodeId) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }
}

/// Breadth and depth of the area the tree is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub breadth: f64,
    pub depth: f64,
}

impl Extent {
    pub fn for_dimensions(dims: &Dimensions) -> Self {
        Self {
            breadth: dims.bound_height() * 1.5,
            depth: dims.bound_width() * 1.25,
        }
    }
}

pub fn layout(state: &TreeState, extent: Extent) -> Frame {
    let visible = state.visible();
    let slot_of = |id: NodeId| visible.iter().position(|v| *v == id);
    let parents: Vec<Option<usize>> = visible
        .iter()
        .map(|&id| state.nodes[id].parent.and_then(slot_of))
        .collect();
    let points = layout::tree(&parents, extent.breadth, extent.depth, state.levels);

    let nodes: Vec<PlacedNode> = visible
        .iter()
        .zip(points)
        .map(|(&id, position)| {
            let node = &state.nodes[id];
            PlacedNode {
                id,
                name: node.name.clone(),
                category: node.category,
                depth: node.depth,
                parent: node.parent,
                position,
                has_children: !node.children.is_empty(),
                expanded: node.expanded,
            }
        })
        .collect();
    let links = nodes
        .iter()
        .filter_map(|n| n.parent.map(|p| (p, n.id)))
        .collect();
    Frame { nodes, links }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Enter,
    Update,
    Exit,
}

#[derive(Debug, Clone, Serialize)]
pub struct Move {
    pub id: NodeId,
    pub phase: Phase,
    pub from: Point,
    pub to: Point,
}

/// Animation plan for one update. Entering nodes grow out of the clicked
/// node's previous position, exiting nodes shrink into its new one.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub source: NodeId,
    pub duration_ms: u64,
    pub moves: Vec<Move>,
}

impl Transition {
    pub fn ids(&self, phase: Phase) -> Vec<NodeId> {
        self.moves
            .iter()
            .filter(|m| m.phase == phase)
            .map(|m| m.id)
            .collect()
    }
}

pub struct TreeView {
    state: TreeState,
    dims: Dimensions,
    extent: Extent,
    frame: Frame,
    last_transition: Option<Transition>,
}

impl TreeView {
    pub fn new(root: &TreeNode, dims: Dimensions) -> Self {
        let state = TreeState::new(root);
        let extent = Extent::for_dimensions(&dims);
        let mut view = Self {
            state,
            dims,
            extent,
            frame: Frame::default(),
            last_transition: None,
        };
        // First render grows out of the middle of the left edge.
        let origin = Point::new(extent.breadth / 2.0, 0.0);
        view.apply(0, origin);
        view
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn last_transition(&self) -> Option<&Transition> {
        self.last_transition.as_ref()
    }

    /// Toggle `id` and relayout. `None` if no such node.
    pub fn click(&mut self, id: NodeId) -> Option<Transition> {
        let origin = self.state.position(id)?;
        self.state.toggle(id);
        Some(self.apply(id, origin))
    }

    /// A user click: toggle `id` and pick the node for the detail panel.
    /// `root` must be the tree this view was built from; ids are its
    /// pre-order positions, so duplicated names each resolve to themselves.
    pub fn select<'a>(
        &mut self,
        root: &'a TreeNode,
        id: NodeId,
    ) -> Option<(Transition, PanelSubject<'a>)> {
        let subject = PanelSubject::at(root, id)?;
        let transition = self.click(id)?;
        Some((transition, subject))
    }

    pub fn click_name(&mut self, name: &str) -> Option<Transition> {
        let id = self.state.id_of(name)?;
        self.click(id)
    }

    fn apply(&mut self, source: NodeId, origin: Point) -> Transition {
        let next = layout(&self.state, self.extent);
        let target = next.get(source).map(|n| n.position).unwrap_or(origin);

        let mut moves = Vec::new();
        for placed in &next.nodes {
            match self.frame.get(placed.id) {
                Some(old) => moves.push(Move {
                    id: placed.id,
                    phase: Phase::Update,
                    from: old.position,
                    to: placed.position,
                }),
                None => moves.push(Move {
                    id: placed.id,
                    phase: Phase::Enter,
                    from: origin,
                    to: placed.position,
                }),
            }
        }
        for old in &self.frame.nodes {
            if !next.contains(old.id) {
                moves.push(Move {
                    id: old.id,
                    phase: Phase::Exit,
                    from: old.position,
                    to: target,
                });
            }
        }

        self.state.record(&next);
        self.frame = next;
        let transition = Transition {
            source,
            duration_ms: TRANSITION_MS,
            moves,
        };
        self.last_transition = Some(transition.clone());
        transition
    }

    pub fn to_svg(&self) -> String {
        let m = self.dims.margin;
        // Leave room on the right for leaf labels.
        let width = (m.left + self.extent.depth + m.right + 160.0).max(self.dims.width);
        let height = (m.top + self.extent.breadth + m.bottom).max(self.dims.height);
        let mut svg = SvgWriter::new(width, height);

        svg.open(
            "g",
            &[
                ("class", "tree".to_string()),
                ("transform", translate(m.left, m.top)),
            ],
        );
        svg.open(
            "g",
            &[
                ("fill", "none".to_string()),
                ("stroke", "#ccc".to_string()),
                ("stroke-width", "1.5".to_string()),
            ],
        );
        for &(parent, child) in &self.frame.links {
            if let (Some(p), Some(c)) = (self.frame.get(parent), self.frame.get(child)) {
                svg.element(
                    "path",
                    &[
                        ("class", "link".to_string()),
                        ("d", diagonal(c.position, p.position)),
                    ],
                );
            }
        }
        svg.close();

        for node in &self.frame.nodes {
            let Point { x, y } = node.position;
            svg.open(
                "g",
                &[
                    ("class", "node".to_string()),
                    ("data-id", node.id.to_string()),
                    ("data-expanded", node.expanded.to_string()),
                    ("transform", translate(y, x)),
                ],
            );
            svg.element(
                "circle",
                &[
                    ("r", num(NODE_RADIUS)),
                    ("fill", node.category.color().to_string()),
                    ("stroke", "#000".to_string()),
                    ("stroke-width", "1px".to_string()),
                ],
            );
            let (dx, anchor) = if node.has_children {
                (-13.0, "end")
            } else {
                (13.0, "start")
            };
            svg.text_element(
                "text",
                &[
                    ("dy", ".31em".to_string()),
                    ("x", num(dx)),
                    ("text-anchor", anchor.to_string()),
                    ("font-size", "10px".to_string()),
                ],
                &node.name,
            );
            svg.close();
        }
        svg.close();

        legend(&mut svg, width, &self.dims);
        svg.finish()
    }
}

/// Horizontal cubic link from `s` to `d` (coordinates in layout space).
fn diagonal(s: Point, d: Point) -> String {
    let mid = (s.y + d.y) / 2.0;
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        num(s.y),
        num(s.x),
        num(mid),
        num(s.x),
        num(mid),
        num(d.x),
        num(d.y),
        num(d.x)
    )
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
                        TreeNode::file("d_main.c"),
                        TreeNode::directory("sound", vec![TreeNode::file("s_sound.c")]),
                        TreeNode::file("doomdef.h"),
                    ],
                ),
                TreeNode::file("Makefile"),
            ],
        )
    }

    fn names(view: &TreeView) -> Vec<String> {
        view.frame().nodes.iter().map(|n| n.name.clone()).collect()
    }

    #[test]
    fn test_initial_state_shows_root_and_its_children() {
        let view = TreeView::new(&sample(), Dimensions::default());
        assert_eq!(names(&view), vec!["root", "linuxdoom", "Makefile"]);
        assert!(view.state().is_expanded(0));
        assert!(!view.state().is_expanded(1));

        let first = view.last_transition().unwrap();
        assert_eq!(first.ids(Phase::Enter), vec![0, 1, 6]);
        assert!(first.ids(Phase::Exit).is_empty());
    }

    #[test]
    fn test_ids_are_preorder_and_stable() {
        let state = TreeState::new(&sample());
        assert_eq!(state.len(), 7);
        assert_eq!(state.id_of("root"), Some(0));
        assert_eq!(state.id_of("d_main.c"), Some(2));
        assert_eq!(state.id_of("s_sound.c"), Some(4));
        assert_eq!(state.id_of("Makefile"), Some(6));
        assert_eq!(state.children(1), &[2, 3, 5]);
    }

    #[test]
    fn test_expand_then_collapse_three_children() {
        let mut view = TreeView::new(&sample(), Dimensions::default());
        let collapsed_positions: Vec<_> = view.frame().nodes.iter().map(|n| n.position).collect();

        let expand = view.click_name("linuxdoom").unwrap();
        assert_eq!(expand.source, 1);
        assert_eq!(expand.ids(Phase::Enter), vec![2, 3, 5]);
        assert_eq!(
            names(&view),
            vec!["root", "linuxdoom", "d_main.c", "sound", "doomdef.h", "Makefile"]
        );
        // Entering nodes grow out of where the clicked node was.
        let origin = view.state().previous_position(1).unwrap();
        for m in expand.moves.iter().filter(|m| m.phase == Phase::Enter) {
            assert_eq!(m.from, origin);
        }

        let collapse = view.click(1).unwrap();
        let mut exited = collapse.ids(Phase::Exit);
        exited.sort();
        assert_eq!(exited, vec![2, 3, 5]);
        let target = view.state().position(1).unwrap();
        for m in collapse.moves.iter().filter(|m| m.phase == Phase::Exit) {
            assert_eq!(m.to, target);
        }

        // Layout is a function of state, so the same state lands in the same place.
        let restored: Vec<_> = view.frame().nodes.iter().map(|n| n.position).collect();
        assert_eq!(restored, collapsed_positions);
    }

    #[test]
    fn test_collapse_hides_descendants_and_reexpand_restores() {
        let mut view = TreeView::new(&sample(), Dimensions::default());
        view.click_name("linuxdoom");
        view.click_name("sound");
        assert!(view.frame().contains(4));
        let expanded_positions: Vec<_> = view.frame().nodes.iter().map(|n| n.position).collect();

        let t = view.click_name("linuxdoom").unwrap();
        let mut exited = t.ids(Phase::Exit);
        exited.sort();
        assert_eq!(exited, vec![2, 3, 4, 5]);

        view.click_name("linuxdoom");
        // `sound` kept its own expanded flag while hidden.
        assert!(view.frame().contains(4));
        let again: Vec<_> = view.frame().nodes.iter().map(|n| n.position).collect();
        assert_eq!(again, expanded_positions);
    }

    #[test]
    fn test_click_leaf_and_unknown() {
        let mut view = TreeView::new(&sample(), Dimensions::default());
        let before = view.frame().ids();
        let t = view.click_name("Makefile").unwrap();
        assert!(t.ids(Phase::Enter).is_empty());
        assert!(t.ids(Phase::Exit).is_empty());
        assert_eq!(view.frame().ids(), before);

        assert!(view.click(99).is_none());
        assert!(view.click_name("nope.c").is_none());
    }

    #[test]
    fn test_select_opens_clicked_duplicate() {
        let root = TreeNode::directory(
            "DOOM",
            vec![
                TreeNode::directory("linuxdoom", vec![TreeNode::file("Makefile").with_size(100)]),
                TreeNode::directory("sndserv", vec![TreeNode::file("Makefile").with_size(7)]),
            ],
        );
        let mut view = TreeView::new(&root, Dimensions::default());
        view.click(3);

        let (transition, subject) = view.select(&root, 4).unwrap();
        assert!(transition.ids(Phase::Enter).is_empty());
        match subject {
            PanelSubject::Full(node) => {
                assert_eq!(node.name, "Makefile");
                assert_eq!(node.size, Some(7));
            }
            PanelSubject::Minimal(_) => panic!("tree clicks resolve to tree nodes"),
        }

        let (expand, subject) = view.select(&root, 1).unwrap();
        assert_eq!(expand.ids(Phase::Enter), vec![2]);
        assert_eq!(subject.name(), "linuxdoom");
        assert!(view.select(&root, 9).is_none());
    }

    #[test]
    fn test_columns_use_full_tree_height() {
        let view = TreeView::new(&sample(), Dimensions::default());
        let extent = Extent::for_dimensions(&Dimensions::default());
        let linuxdoom = view.frame().get(1).unwrap();
        // Full tree has three levels below the root.
        assert!((linuxdoom.position.y - extent.depth / 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_svg_contains_visible_nodes_only() {
        let view = TreeView::new(&sample(), Dimensions::default());
        let svg = view.to_svg();
        assert!(svg.contains(">linuxdoom</text>"));
        assert!(!svg.contains(">d_main.c</text>"));
        assert_eq!(svg.matches(r#"class="link""#).count(), 2);
    }
}
