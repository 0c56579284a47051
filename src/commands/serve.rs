use crate::cli::ServeArgs;
use crate::loader::check_unique_names;
use crate::server::{AppState, serve};
use crate::style;
use std::path::Path;

use super::CommandContext;

pub fn cmd_serve(project: &Path, args: ServeArgs) -> i32 {
    let ctx = match CommandContext::new(project, &args.data) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    if !ctx.structure().exists() {
        style::warning(&format!(
            "Structure document not found: {}. Serving an empty tree.",
            style::path(ctx.structure())
        ));
        style::hint("Generate one with `codemap scan <dir> -o codebase_structure.json`");
    } else if args.strict {
        let checked = ctx
            .loader()
            .try_load()
            .and_then(|tree| check_unique_names(&tree));
        if let Err(e) = checked {
            style::error(&e.to_string());
            return 1;
        }
    }

    let host = args.host.unwrap_or_else(|| ctx.config.server.host.clone());
    let port = args.port.unwrap_or(ctx.config.server.port);
    let state =
        AppState::new(ctx.structure(), ctx.source_root()).with_dimensions(ctx.dimensions());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            style::error(&format!("Failed to start async runtime: {}", e));
            return 1;
        }
    };

    if let Err(e) = rt.block_on(serve(state, &host, port, args.open)) {
        style::error(&format!("Server failed: {}", e));
        return 1;
    }

    0
}
