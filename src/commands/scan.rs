use crate::api::scan_directory;
use crate::cli::ScanArgs;
use crate::fs::{FileSystem, default_fs};
use crate::style;

pub fn cmd_scan(args: ScanArgs) -> i32 {
    let tree = match scan_directory(&args.dir) {
        Ok(tree) => tree,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    let json = match serde_json::to_string_pretty(&tree) {
        Ok(json) => json,
        Err(e) => {
            style::error(&format!("Failed to serialize structure: {}", e));
            return 1;
        }
    };

    let Some(output) = args.output else {
        println!("{}", json);
        return 0;
    };

    if let Err(e) = default_fs().write(&output, &json) {
        style::error(&format!("Failed to write structure document: {}", e));
        return 1;
    }

    let files = tree.iter().filter(|n| n.is_file()).count();
    style::success(&format!("Structure written to: {}", style::path(&output)));
    println!("{}", style::metric("Files", files));
    println!("{}", style::metric("Directories", tree.node_count() - files));
    println!("{}", style::metric("Bytes", tree.total_size()));
    0
}
