pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod fs;
pub mod index;
pub mod links;
pub mod loader;
pub mod model;
pub mod panel;
pub mod render;
pub mod scan;
pub mod server;
pub mod style;

pub use api::{
    CodemapError, LinkSet, OpenOptions, RenderOptions, details, details_at, links,
    open_structure, render_svg, scan_directory,
};
pub use cli::Cli;
pub use commands::{cmd_check, cmd_export, cmd_init, cmd_links, cmd_scan, cmd_serve, cmd_show};
pub use config::Config;
pub use index::{Category, DiagramNode};
pub use links::{Edge, View};
pub use loader::{LoadError, Loader};
pub use model::{NodeKind, TreeNode};
pub use panel::{DetailPanel, PanelSubject};
pub use render::{Dimensions, Renderer};
