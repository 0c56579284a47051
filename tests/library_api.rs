//! Integration tests for the codemap library API.

use codemap::{
    CodemapError, LoadError, OpenOptions, RenderOptions, Renderer, View, details, details_at,
    links, open_structure, render_svg, scan_directory,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DOC: &str = r##"{
    "name": "DOOM",
    "type": "directory",
    "children": [
        {
            "name": "linuxdoom",
            "type": "directory",
            "children": [
                {"name": "d_main.c", "type": "file", "size": 30, "path": "linuxdoom/d_main.c",
                 "dependencies": ["doomdef.h", "stdio.h"], "inputs": ["argv"], "outputs": ["printf"],
                 "readme": "# d_main.c"},
                {"name": "doomdef.h", "type": "file", "size": 20, "path": "linuxdoom/doomdef.h"},
                {"name": "Makefile", "type": "file", "size": 10, "path": "linuxdoom/Makefile"}
            ]
        }
    ]
}"##;

struct Fixture {
    _dir: TempDir,
    structure: PathBuf,
    source_root: PathBuf,
}

fn fixture(doc: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let structure = dir.path().join("codebase_structure.json");
    let source_root = dir.path().join("source-original");
    fs::write(&structure, doc).unwrap();
    fs::create_dir_all(source_root.join("linuxdoom")).unwrap();
    fs::write(
        source_root.join("linuxdoom/d_main.c"),
        "#include \"doomdef.h\"\n",
    )
    .unwrap();
    Fixture {
        _dir: dir,
        structure,
        source_root,
    }
}

#[test]
fn test_open_structure() {
    let fx = fixture(DOC);
    let tree = open_structure(&fx.structure, &fx.source_root, OpenOptions::default()).unwrap();
    assert_eq!(tree.name, "DOOM");
    assert_eq!(tree.node_count(), 5);
    assert!(tree.iter().all(|n| n.source().is_none()));
}

#[test]
fn test_open_structure_with_source() {
    let fx = fixture(DOC);
    let options = OpenOptions {
        include_source: true,
        strict: false,
    };
    let tree = open_structure(&fx.structure, &fx.source_root, options).unwrap();
    let source = |name: &str| {
        tree.iter()
            .find(|n| n.name == name)
            .and_then(|n| n.source())
            .map(str::to_string)
    };
    assert_eq!(source("d_main.c").as_deref(), Some("#include \"doomdef.h\"\n"));
    assert_eq!(source("doomdef.h").as_deref(), Some("Error reading file"));
    assert_eq!(source("linuxdoom"), None);
}

#[test]
fn test_open_structure_invalid_path() {
    let result = open_structure(
        Path::new("/nonexistent/structure.json"),
        Path::new("/nonexistent"),
        OpenOptions::default(),
    );
    match result {
        Err(CodemapError::PathNotFound(_)) => {}
        Err(e) => panic!("Expected PathNotFound error, got: {:?}", e),
        Ok(_) => panic!("Expected error for invalid path"),
    }
}

#[test]
fn test_strict_rejects_duplicate_names() {
    let fx = fixture(
        r#"{"name": "root", "type": "directory", "children": [
            {"name": "a", "type": "directory", "children": [{"name": "x.c", "type": "file"}]},
            {"name": "b", "type": "directory", "children": [{"name": "x.c", "type": "file"}]}
        ]}"#,
    );
    let lenient = open_structure(&fx.structure, &fx.source_root, OpenOptions::default());
    assert!(lenient.is_ok());

    let strict = OpenOptions {
        include_source: false,
        strict: true,
    };
    match open_structure(&fx.structure, &fx.source_root, strict) {
        Err(CodemapError::Load(LoadError::DuplicateNames(names))) => {
            assert_eq!(names, vec!["x.c"]);
        }
        other => panic!("Expected duplicate-name error, got: {:?}", other),
    }
}

#[test]
fn test_links_by_view() {
    let fx = fixture(DOC);
    let tree = open_structure(&fx.structure, &fx.source_root, OpenOptions::default()).unwrap();

    let hierarchy = links(&tree, "hierarchy").unwrap();
    assert_eq!(hierarchy.links.len(), tree.node_count() - 1);

    let inputs = links(&tree, "inputs").unwrap();
    assert_eq!(inputs.view, View::Input);
    assert_eq!(inputs.links[0].source, "argv");
    assert_eq!(inputs.links[0].target, "d_main.c");

    assert!(matches!(
        links(&tree, "callers"),
        Err(CodemapError::UnknownView(_))
    ));
}

#[test]
fn test_details_full_and_minimal() {
    let fx = fixture(DOC);
    let tree = open_structure(&fx.structure, &fx.source_root, OpenOptions::default()).unwrap();

    let panel = details(&tree, "d_main.c");
    let titles: Vec<_> = panel.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Published Readme",
            "Gen AI Analysis",
            "Dependencies",
            "Inputs",
            "Outputs",
            "Source Code"
        ]
    );

    let minimal = details(&tree, "stdio.h");
    assert!(minimal.sections.is_empty());
    assert!(minimal.message.is_some());
}

#[test]
fn test_details_at_addresses_duplicates() {
    let fx = fixture(
        r#"{"name": "DOOM", "type": "directory", "children": [
            {"name": "linuxdoom", "type": "directory", "children": [
                {"name": "Makefile", "type": "file", "size": 100}]},
            {"name": "sndserv", "type": "directory", "children": [
                {"name": "Makefile", "type": "file", "size": 7}]}
        ]}"#,
    );
    let tree = open_structure(&fx.structure, &fx.source_root, OpenOptions::default()).unwrap();

    assert_eq!(details(&tree, "Makefile").facts[1].value, "100 bytes");
    assert_eq!(details_at(&tree, 4).unwrap().facts[1].value, "7 bytes");
    assert!(matches!(
        details_at(&tree, 5),
        Err(CodemapError::NodeIdNotFound(5))
    ));
}

#[test]
fn test_render_svg_each_renderer() {
    let fx = fixture(DOC);
    let tree = open_structure(&fx.structure, &fx.source_root, OpenOptions::default()).unwrap();
    let options = RenderOptions::default();

    for renderer in [Renderer::Tree, Renderer::Treemap, Renderer::Arc] {
        let svg = render_svg(&tree, renderer, &options).unwrap();
        assert!(svg.starts_with("<svg"), "{}", renderer);
        assert!(svg.trim_end().ends_with("</svg>"), "{}", renderer);
    }
}

#[test]
fn test_render_tree_expands_named_nodes() {
    let fx = fixture(DOC);
    let tree = open_structure(&fx.structure, &fx.source_root, OpenOptions::default()).unwrap();

    let collapsed = render_svg(&tree, Renderer::Tree, &RenderOptions::default()).unwrap();
    assert!(!collapsed.contains(">d_main.c<"));

    let options = RenderOptions {
        expand: vec!["linuxdoom".to_string()],
        ..RenderOptions::default()
    };
    let expanded = render_svg(&tree, Renderer::Tree, &options).unwrap();
    assert!(expanded.contains(">d_main.c<"));

    let missing = RenderOptions {
        expand: vec!["nope".to_string()],
        ..RenderOptions::default()
    };
    assert!(matches!(
        render_svg(&tree, Renderer::Tree, &missing),
        Err(CodemapError::NodeNotFound(_))
    ));
}

#[test]
fn test_scan_then_open() {
    let src = TempDir::new().unwrap();
    fs::write(
        src.path().join("i_video.c"),
        "#include <stdlib.h>\nint f(int x) {\n    puts(\"x\");\n    return x;\n}\n",
    )
    .unwrap();

    let tree = scan_directory(src.path()).unwrap();
    let out = TempDir::new().unwrap();
    let structure = out.path().join("structure.json");
    fs::write(&structure, serde_json::to_string_pretty(&tree).unwrap()).unwrap();

    let options = OpenOptions {
        include_source: true,
        strict: true,
    };
    let reopened = open_structure(&structure, src.path(), options).unwrap();
    let file = &reopened.children()[0];
    assert_eq!(file.name, "i_video.c");
    assert_eq!(file.dependencies, vec!["stdlib.h"]);
    assert_eq!(file.inputs, vec!["x"]);
    assert_eq!(file.outputs, vec!["int"]);
    assert!(file.source().unwrap().contains("puts"));
}
