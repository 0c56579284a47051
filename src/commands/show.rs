use crate::api::{CodemapError, details, details_at};
use crate::cli::{PanelFormat, ShowArgs};
use crate::index::id_of;
use crate::style;
use std::io;
use std::path::Path;

use super::CommandContext;

pub fn cmd_show(project: &Path, args: ShowArgs) -> i32 {
    let ctx = match CommandContext::new(project, &args.data) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let loader = ctx.loader();
    let tree = loader.load();
    let name = args.name.as_deref().unwrap_or_default();
    let id = args.id.or_else(|| id_of(&tree, name));

    let result = match id {
        // Only the selected file is read.
        Some(id) if args.source => loader
            .hydrate_one(&tree, id)
            .ok_or(CodemapError::NodeIdNotFound(id))
            .and_then(|node| details_at(&node, 0)),
        Some(id) => details_at(&tree, id),
        None => Ok(details(&tree, name)),
    };
    let mut panel = match result {
        Ok(panel) => panel,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    // The terminal has no headers to click, so everything starts open.
    panel.expand_all();

    match args.format {
        PanelFormat::Markdown => {
            if let Err(e) = style::render_markdown(&panel.to_markdown(), &mut io::stdout()) {
                style::error(&format!("Failed to write output: {}", e));
                return 1;
            }
        }
        PanelFormat::Html => println!("{}", panel.to_html()),
        PanelFormat::Json => match serde_json::to_string_pretty(&panel) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                style::error(&format!("Failed to serialize panel: {}", e));
                return 1;
            }
        },
    }

    0
}
