//! Treemap renderer: one stateless pass, area proportional to size.

use super::layout::{Rect, squarify};
use super::svg::{SvgWriter, num, translate};
use super::{Dimensions, legend};
use crate::index::Category;
use crate::model::{NodeKind, TreeNode};
use crate::panel::PanelSubject;
use serde::Serialize;

const PADDING_TOP: f64 = 50.0;
const PADDING_RIGHT: f64 = 7.0;
const PADDING_INNER: f64 = 3.0;
/// Rough advance of one 10px sans-serif glyph.
const GLYPH_WIDTH: f64 = 6.0;

#[derive(Debug, Clone, Serialize)]
pub struct Cell {
    /// Pre-order position of the node in the document.
    pub id: usize,
    pub name: String,
    pub kind: NodeKind,
    pub category: Category,
    /// Own size for files, sum of descendant file sizes for directories.
    pub value: u64,
    pub depth: usize,
    pub has_children: bool,
    pub rect: Rect,
}

/// Tile `root` into `bounds`. Cells come out parent-first; siblings are
/// ordered by descending value.
pub fn layout(root: &TreeNode, bounds: Rect) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(root.node_count());
    place(root, 0, bounds, 0, &mut cells);
    cells
}

/// The node behind a clicked cell.
pub fn select<'a>(root: &'a TreeNode, cell: &Cell) -> Option<PanelSubject<'a>> {
    PanelSubject::at(root, cell.id)
}

fn place(node: &TreeNode, id: usize, tile: Rect, depth: usize, cells: &mut Vec<Cell>) {
    let half = PADDING_INNER / 2.0;
    let rect = if depth == 0 {
        tile
    } else {
        tile.pad(half, half, half, half)
    };
    cells.push(Cell {
        id,
        name: node.name.clone(),
        kind: node.kind,
        category: Category::of_node(node),
        value: node.total_size(),
        depth,
        has_children: node.has_children(),
        rect: rect.round(),
    });

    if !node.has_children() {
        return;
    }

    // Ids follow document order, so assign them before sorting by value.
    let mut next_id = id + 1;
    let mut children: Vec<(&TreeNode, usize, u64)> = node
        .children()
        .iter()
        .map(|c| {
            let child_id = next_id;
            next_id += c.node_count();
            (c, child_id, c.total_size())
        })
        .collect();
    children.sort_by(|a, b| b.2.cmp(&a.2));

    // Children tile a region widened by half the inner padding, so outer
    // children sit flush against the parent's own padding.
    let inner = rect.pad(PADDING_TOP - half, PADDING_RIGHT - half, -half, -half);
    let values: Vec<f64> = children.iter().map(|(_, _, v)| *v as f64).collect();
    for ((child, child_id, _), tile) in children.iter().zip(squarify(&values, inner)) {
        place(child, *child_id, tile, depth + 1, cells);
    }
}

/// Fit `name` into `width` pixels, ending in `...` when cut.
pub fn fit_label(name: &str, width: f64) -> String {
    let room = ((width - 8.0) / GLYPH_WIDTH).floor();
    if room <= 0.0 {
        return String::new();
    }
    let room = room as usize;
    if name.chars().count() <= room {
        return name.to_string();
    }
    let keep = room.saturating_sub(3);
    let mut label: String = name.chars().take(keep).collect();
    label.push_str("...");
    label
}

pub fn render(root: &TreeNode, dims: Dimensions) -> String {
    let m = dims.margin;
    let width = dims.width * 1.5 - m.left - m.right;
    let height = dims.height * 2.0 - m.top - m.bottom;
    let cells = layout(root, Rect::new(0.0, 0.0, width, height));

    let surface_width = width + m.left + m.right;
    let mut svg = SvgWriter::new(surface_width, height + m.top + m.bottom + PADDING_TOP);
    svg.open(
        "g",
        &[
            ("class", "treemap".to_string()),
            ("transform", translate(m.left, m.top + PADDING_TOP)),
        ],
    );
    for cell in &cells {
        let r = cell.rect;
        svg.open(
            "g",
            &[
                ("class", "cell".to_string()),
                ("data-id", cell.id.to_string()),
                ("data-name", cell.name.clone()),
                ("transform", translate(r.x0, r.y0)),
            ],
        );
        let (stroke, stroke_width) = if cell.has_children {
            ("#000", "2")
        } else {
            ("none", "0")
        };
        svg.element(
            "rect",
            &[
                ("width", num(r.width())),
                ("height", num(r.height())),
                ("fill", cell.category.color().to_string()),
                ("stroke", stroke.to_string()),
                ("stroke-width", stroke_width.to_string()),
            ],
        );
        svg.text_element(
            "text",
            &[
                ("x", num(4.0)),
                ("y", num(14.0)),
                ("dy", ".35em".to_string()),
                ("font-size", "10px".to_string()),
            ],
            &fit_label(&cell.name, r.width()),
        );
        svg.text_element(
            "text",
            &[
                ("x", num(4.0)),
                ("y", num(26.0)),
                ("dy", ".35em".to_string()),
                ("font-size", "9px".to_string()),
                ("fill", "#555".to_string()),
            ],
            &cell.value.to_string(),
        );
        svg.text_element(
            "title",
            &[],
            &format!("{}\nSize: {}\nType: {}", cell.name, cell.value, cell.kind),
        );
        svg.close();
    }
    svg.close();

    legend(&mut svg, surface_width, &dims);
    svg.finish()
}
