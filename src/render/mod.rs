//! The three diagram renderers and the pieces they share.
//!
//! Each renderer turns a [`TreeNode`] into an SVG drawing surface. Only the
//! tree renderer keeps state between updates, and it owns that state
//! outright ([`tree::TreeState`]) rather than writing into the model.

pub mod arc;
pub mod layout;
pub mod svg;
pub mod tree;
pub mod treemap;

pub use arc::ArcDiagram;
pub use tree::{TreeState, TreeView};

use crate::index::Category;
use crate::links::View;
use crate::model::TreeNode;
use serde::{Deserialize, Serialize};
use svg::{SvgWriter, num, translate};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Drawing surface size shared by all renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(960.0, 600.0)
    }
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: Margin {
                top: 20.0,
                right: 20.0,
                bottom: 20.0,
                left: 40.0,
            },
        }
    }

    pub fn bound_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    /// Diagrams scroll vertically, so the bounded height spans two screens.
    pub fn bound_height(&self) -> f64 {
        self.height * 2.0 - self.margin.top - self.margin.bottom
    }
}

/// Which renderer draws the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Renderer {
    #[default]
    Tree,
    Treemap,
    Arc,
}

impl std::fmt::Display for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Renderer::Tree => write!(f, "tree"),
            Renderer::Treemap => write!(f, "treemap"),
            Renderer::Arc => write!(f, "arc"),
        }
    }
}

impl std::str::FromStr for Renderer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tree" => Ok(Renderer::Tree),
            "treemap" => Ok(Renderer::Treemap),
            "arc" | "arc-diagram" => Ok(Renderer::Arc),
            _ => Err(format!(
                "Unknown renderer: {}. Valid options: tree, treemap, arc",
                s
            )),
        }
    }
}

/// Draw `root` with a fresh renderer. `view` only matters for the arc diagram.
pub fn render(renderer: Renderer, root: &TreeNode, dims: Dimensions, view: View) -> String {
    match renderer {
        Renderer::Tree => TreeView::new(root, dims).to_svg(),
        Renderer::Treemap => treemap::render(root, dims),
        Renderer::Arc => {
            let mut diagram = ArcDiagram::new(root, dims);
            diagram.set_view(view);
            diagram.to_svg()
        }
    }
}

const LEGEND_ITEM_WIDTH: f64 = 100.0;

/// One swatch per category, right-aligned along the top margin.
pub fn legend(svg: &mut SvgWriter, surface_width: f64, dims: &Dimensions) {
    let total = LEGEND_ITEM_WIDTH * Category::ALL.len() as f64;
    let x = (surface_width - dims.margin.right - total).max(0.0);
    svg.open(
        "g",
        &[
            ("class", "legend".to_string()),
            ("transform", translate(x, dims.margin.top)),
        ],
    );
    for (i, category) in Category::ALL.iter().enumerate() {
        svg.open(
            "g",
            &[
                ("class", "legend-item".to_string()),
                ("transform", translate(i as f64 * LEGEND_ITEM_WIDTH, 0.0)),
            ],
        );
        svg.element(
            "rect",
            &[
                ("width", "18".to_string()),
                ("height", "18".to_string()),
                ("fill", category.color().to_string()),
            ],
        );
        svg.text_element(
            "text",
            &[
                ("x", num(24.0)),
                ("y", num(9.0)),
                ("dy", ".35em".to_string()),
                ("font-size", "10px".to_string()),
            ],
            category.as_str(),
        );
        svg.close();
    }
    svg.close();
}
