use crate::api::LinkSet;
use crate::cli::{LinksArgs, OutputFormat};
use crate::index::nodes_of;
use crate::links::extract;
use crate::style;
use std::path::Path;

use super::CommandContext;

pub fn cmd_links(project: &Path, args: LinksArgs) -> i32 {
    let ctx = match CommandContext::new(project, &args.data) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let tree = ctx.loader().load();
    let links = extract(args.view, &tree);
    let nodes = nodes_of(&links);
    let set = LinkSet {
        view: args.view,
        links,
        nodes,
    };

    match args.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&set) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                style::error(&format!("Failed to serialize links: {}", e));
                return 1;
            }
        },
        OutputFormat::Text => print_text(&set),
    }

    0
}

fn print_text(set: &LinkSet) {
    style::header(&format!("{} ({} edges)", set.view.label(), set.links.len()));
    for edge in &set.links {
        println!("  {} -> {}", edge.source, edge.target);
    }

    style::section("Nodes");
    for node in &set.nodes {
        println!("{}", style::metric(&node.id, node.group));
    }
}
