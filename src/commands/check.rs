use crate::cli::CheckArgs;
use crate::links::{View, extract};
use crate::loader::duplicate_names;
use crate::style;
use std::path::Path;

use super::CommandContext;

pub fn cmd_check(project: &Path, args: CheckArgs) -> i32 {
    let ctx = match CommandContext::new(project, &args.data) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let tree = match ctx.loader().try_load() {
        Ok(tree) => tree,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    let duplicates = duplicate_names(&tree);
    if !duplicates.is_empty() {
        style::error(&format!(
            "{} node name(s) occur more than once; lookups would resolve to the first match",
            duplicates.len()
        ));
        for name in &duplicates {
            eprintln!("  {}", name);
        }
        return 1;
    }

    let files = tree.iter().filter(|n| n.is_file()).count();
    style::success(&format!("{} is valid", style::path(ctx.structure())));
    style::section("Summary");
    println!("{}", style::metric("Nodes", tree.node_count()));
    println!("{}", style::metric("Files", files));
    println!("{}", style::metric("Depth", tree.height()));
    for view in View::ALL {
        println!(
            "{}",
            style::metric(&format!("{} edges", view.label()), extract(view, &tree).len())
        );
    }
    0
}
