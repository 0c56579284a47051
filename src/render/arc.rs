//! Arc diagram: nodes on a vertical line, one arc per edge of the current view.

use super::layout::point_scale;
use super::svg::{SvgWriter, num, translate};
use super::{Dimensions, legend};
use crate::index::{Category, DiagramNode, nodes_of};
use crate::links::{Edge, View, extract};
use crate::model::TreeNode;
use crate::panel::PanelSubject;
use std::collections::HashMap;

pub const BASE_OPACITY: f64 = 0.6;
pub const HIGHLIGHT_OPACITY: f64 = 1.0;
pub const DIM_OPACITY: f64 = 0.1;
const NODE_RADIUS: f64 = 3.0;
const HOVER_RADIUS: f64 = 6.0;

pub struct ArcDiagram<'a> {
    tree: &'a TreeNode,
    dims: Dimensions,
    view: Option<View>,
    edges: Vec<Edge>,
    nodes: Vec<DiagramNode>,
    positions: HashMap<String, f64>,
    hovered: Option<String>,
}

impl<'a> ArcDiagram<'a> {
    /// Starts on the hierarchy view.
    pub fn new(tree: &'a TreeNode, dims: Dimensions) -> Self {
        let mut diagram = Self {
            tree,
            dims,
            view: None,
            edges: Vec::new(),
            nodes: Vec::new(),
            positions: HashMap::new(),
            hovered: None,
        };
        diagram.set_view(View::Hierarchy);
        diagram
    }

    /// Recompute edges, the node index and the vertical ordering.
    pub fn set_view(&mut self, view: View) {
        self.view = Some(view);
        self.edges = extract(view, self.tree);
        self.reindex();
    }

    /// Switch by selector value; an unrecognized value empties the diagram.
    pub fn select(&mut self, name: &str) {
        match View::parse(name) {
            Some(view) => self.set_view(view),
            None => {
                self.view = None;
                self.edges.clear();
                self.reindex();
            }
        }
    }

    fn reindex(&mut self) {
        self.nodes = nodes_of(&self.edges);
        let ys = point_scale(self.nodes.len(), 0.0, self.diagram_height());
        self.positions = self
            .nodes
            .iter()
            .zip(ys)
            .map(|(n, y)| (n.id.clone(), y))
            .collect();
        self.hovered = None;
    }

    fn diagram_height(&self) -> f64 {
        self.dims.height * 3.0 - self.dims.margin.top - self.dims.margin.bottom
    }

    pub fn view(&self) -> Option<View> {
        self.view
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    pub fn position(&self, id: &str) -> Option<f64> {
        self.positions.get(id).copied()
    }

    /// Semicircle between the two endpoints, bulging right when going down.
    pub fn arc_path(&self, edge: &Edge) -> Option<String> {
        let y1 = self.position(&edge.source)?;
        let y2 = self.position(&edge.target)?;
        let x = self.dims.margin.left;
        let r = (y2 - y1).abs() / 2.0;
        let sweep = if y1 < y2 { 1 } else { 0 };
        Some(format!(
            "M{x},{y1}A{r},{r} 0,0,{sweep} {x},{y2}",
            x = num(x),
            y1 = num(y1),
            r = num(r),
            y2 = num(y2),
        ))
    }

    pub fn hover(&mut self, id: &str) {
        self.hovered = Some(id.to_string());
    }

    pub fn leave(&mut self) {
        self.hovered = None;
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn edge_opacity(&self, edge: &Edge) -> f64 {
        match &self.hovered {
            None => BASE_OPACITY,
            Some(id) if edge.touches(id) => HIGHLIGHT_OPACITY,
            Some(_) => DIM_OPACITY,
        }
    }

    pub fn node_radius(&self, id: &str) -> f64 {
        if self.hovered.as_deref() == Some(id) {
            HOVER_RADIUS
        } else {
            NODE_RADIUS
        }
    }

    /// What the detail panel should show for a clicked node.
    pub fn click(&self, id: &str) -> Option<PanelSubject<'_>> {
        let node = self.nodes.iter().find(|n| n.id == id)?;
        Some(PanelSubject::resolve(self.tree, node))
    }

    pub fn to_svg(&self) -> String {
        let m = self.dims.margin;
        let height = self.diagram_height() + m.top + m.bottom;
        let mut svg = SvgWriter::new(self.dims.width, height);

        svg.open(
            "g",
            &[
                ("class", "arc".to_string()),
                ("transform", translate(m.left, m.top)),
            ],
        );
        svg.open(
            "g",
            &[
                ("fill", "none".to_string()),
                ("stroke-width", "1.5".to_string()),
            ],
        );
        for edge in &self.edges {
            let Some(d) = self.arc_path(edge) else {
                continue;
            };
            svg.element(
                "path",
                &[
                    ("d", d),
                    ("stroke", Category::of_id(&edge.source).color().to_string()),
                    ("stroke-opacity", num(self.edge_opacity(edge))),
                    ("data-source", edge.source.clone()),
                    ("data-target", edge.target.clone()),
                ],
            );
        }
        svg.close();

        svg.open(
            "g",
            &[
                ("font-size", "10".to_string()),
                ("text-anchor", "end".to_string()),
            ],
        );
        for node in &self.nodes {
            let y = self.position(&node.id).unwrap_or_default();
            svg.open(
                "g",
                &[
                    ("class", "arc-node".to_string()),
                    ("data-id", node.id.clone()),
                    ("transform", translate(m.left, y)),
                ],
            );
            svg.text_element(
                "text",
                &[
                    ("x", num(-6.0)),
                    ("dy", "0.35em".to_string()),
                    ("fill", node.group.color().to_string()),
                ],
                &node.id,
            );
            svg.element(
                "circle",
                &[
                    ("r", num(self.node_radius(&node.id))),
                    ("fill", node.group.color().to_string()),
                ],
            );
            svg.close();
        }
        svg.close();
        svg.close();

        legend(&mut svg, self.dims.width, &self.dims);
        svg.finish()
    }
}
