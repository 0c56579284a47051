use crate::api::{RenderOptions, render_svg};
use crate::cli::ExportArgs;
use crate::fs::{FileSystem, default_fs};
use crate::style;
use std::path::Path;

use super::CommandContext;

pub fn cmd_export(project: &Path, args: ExportArgs) -> i32 {
    let ctx = match CommandContext::new(project, &args.data) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let tree = ctx.loader().load();
    let options = RenderOptions {
        dimensions: ctx.dimensions(),
        view: args.links,
        expand: args.expand,
    };

    let svg = match render_svg(&tree, args.view, &options) {
        Ok(svg) => svg,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    if let Err(e) = default_fs().write(&args.output, &svg) {
        style::error(&format!("Failed to write export file: {}", e));
        return 1;
    }

    style::success(&format!(
        "{} exported to: {}",
        args.view,
        style::path(&args.output)
    ));
    0
}
