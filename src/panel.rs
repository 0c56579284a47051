//! Detail panel for the selected node.
//!
//! The panel accepts either a node found in the tree or the bare diagram
//! node a renderer drew; [`PanelSubject`] decides which once, at the
//! boundary, and everything below works on that variant.

use crate::index::{DiagramNode, find_by_id, find_by_name};
use crate::model::TreeNode;
use crate::render::svg::escape;
use serde::Serialize;
use std::fmt::Write;

pub const NO_DETAILS: &str = "No details available for this node.";
pub const ANALYSIS_PLACEHOLDER: &str = "AI analysis not available yet.";
pub const SOURCE_PLACEHOLDER: &str = "Source code not available in static version";
pub const NOT_IN_TREE: &str = "Not present in the codebase structure.";

#[derive(Debug, Clone, Copy)]
pub enum PanelSubject<'a> {
    Full(&'a TreeNode),
    Minimal(&'a DiagramNode),
}

impl<'a> PanelSubject<'a> {
    /// Prefer the tree's node; fall back to the diagram node when the name
    /// only occurs as a reference (an include that isn't in the tree, say).
    pub fn resolve(root: &'a TreeNode, node: &'a DiagramNode) -> Self {
        match find_by_name(root, &node.id) {
            Some(found) => PanelSubject::Full(found),
            None => PanelSubject::Minimal(node),
        }
    }

    /// The node a tree or treemap click landed on, by pre-order id. Names
    /// may repeat, ids don't.
    pub fn at(root: &'a TreeNode, id: usize) -> Option<Self> {
        find_by_id(root, id).map(PanelSubject::Full)
    }

    pub fn name(&self) -> &str {
        match self {
            PanelSubject::Full(node) => &node.name,
            PanelSubject::Minimal(node) => &node.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SectionBody {
    Text(String),
    List(Vec<String>),
    Code(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    pub body: SectionBody,
    pub expanded: bool,
}

impl Section {
    fn new(title: &str, body: SectionBody) -> Self {
        Self {
            title: title.to_string(),
            body,
            expanded: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Fact {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailPanel {
    pub title: String,
    pub facts: Vec<Fact>,
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DetailPanel {
    pub fn build(subject: PanelSubject<'_>) -> Self {
        match subject {
            PanelSubject::Full(node) => Self::for_node(node),
            PanelSubject::Minimal(node) => Self::for_reference(node),
        }
    }

    /// Nothing selected, or nothing to say.
    pub fn empty() -> Self {
        Self {
            title: String::new(),
            facts: Vec::new(),
            sections: Vec::new(),
            message: Some(NO_DETAILS.to_string()),
        }
    }

    fn for_node(node: &TreeNode) -> Self {
        let mut facts = vec![fact("Type", node.kind.to_string())];
        if let Some(size) = node.size.filter(|s| *s > 0) {
            facts.push(fact("Size", format!("{} bytes", size)));
        }

        let mut sections = Vec::new();
        if node.is_directory() {
            let names = |want_dirs: bool| {
                node.children()
                    .iter()
                    .filter(|c| c.is_directory() == want_dirs)
                    .map(|c| c.name.clone())
                    .collect::<Vec<_>>()
            };
            sections.push(Section::new("Subdirectories", SectionBody::List(names(true))));
            sections.push(Section::new("Files", SectionBody::List(names(false))));
        } else {
            if let Some(readme) = &node.readme {
                sections.push(Section::new(
                    "Published Readme",
                    SectionBody::Text(readme.clone()),
                ));
            }
            sections.push(Section::new(
                "Gen AI Analysis",
                SectionBody::Text(ANALYSIS_PLACEHOLDER.to_string()),
            ));
            for (title, items) in [
                ("Dependencies", &node.dependencies),
                ("Inputs", &node.inputs),
                ("Outputs", &node.outputs),
            ] {
                if !items.is_empty() {
                    sections.push(Section::new(title, SectionBody::List(items.clone())));
                }
            }
            let source = match node.source() {
                Some(text) => SectionBody::Code(text.to_string()),
                None => SectionBody::Text(SOURCE_PLACEHOLDER.to_string()),
            };
            sections.push(Section::new("Source Code", source));
        }

        Self {
            title: node.name.clone(),
            facts,
            sections,
            message: None,
        }
    }

    fn for_reference(node: &DiagramNode) -> Self {
        Self {
            title: node.id.clone(),
            facts: vec![fact("Category", node.group.to_string())],
            sections: Vec::new(),
            message: Some(NOT_IN_TREE.to_string()),
        }
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Flip one section open/closed; returns its new state.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let section = self.sections.get_mut(index)?;
        section.expanded = !section.expanded;
        Some(section.expanded)
    }

    pub fn toggle_title(&mut self, title: &str) -> Option<bool> {
        let index = self.sections.iter().position(|s| s.title == title)?;
        self.toggle(index)
    }

    pub fn expand_all(&mut self) {
        for section in &mut self.sections {
            section.expanded = true;
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(message) = &self.message {
            if self.title.is_empty() {
                let _ = write!(out, "<p>{}</p>", escape(message));
                return out;
            }
        }
        let _ = write!(out, "<h2>{}</h2>", escape(&self.title));
        for f in &self.facts {
            let _ = write!(out, "<p>{}: {}</p>", escape(&f.label), escape(&f.value));
        }
        if let Some(message) = &self.message {
            let _ = write!(out, "<p><em>{}</em></p>", escape(message));
        }
        for (i, section) in self.sections.iter().enumerate() {
            let (icon, display) = if section.expanded {
                ("▼", "block")
            } else {
                ("▶", "none")
            };
            let _ = write!(
                out,
                r#"<div class="collapsible-section" data-index="{i}"><h3><span class="collapse-icon">{icon}</span> {}</h3><div class="section-content" style="display: {display}">"#,
                escape(&section.title)
            );
            match &section.body {
                SectionBody::Text(text) => {
                    let _ = write!(out, "<p>{}</p>", escape(text));
                }
                SectionBody::List(items) => {
                    out.push_str("<ul>");
                    for item in items {
                        let _ = write!(out, "<li>{}</li>", escape(item));
                    }
                    out.push_str("</ul>");
                }
                SectionBody::Code(code) => {
                    let _ = write!(out, "<pre><code>{}</code></pre>", escape(code));
                }
            }
            out.push_str("</div></div>");
        }
        out
    }

    /// Markdown rendering; collapsed sections show only their heading.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        if self.title.is_empty() {
            if let Some(message) = &self.message {
                let _ = writeln!(out, "{}", message);
            }
            return out;
        }
        let _ = writeln!(out, "## {}\n", self.title);
        for f in &self.facts {
            let _ = writeln!(out, "- **{}:** {}", f.label, f.value);
        }
        if let Some(message) = &self.message {
            let _ = writeln!(out, "\n*{}*", message);
        }
        for section in &self.sections {
            let icon = if section.expanded { "▼" } else { "▶" };
            let _ = writeln!(out, "\n### {} {}\n", icon, section.title);
            if !section.expanded {
                continue;
            }
            match &section.body {
                SectionBody::Text(text) => {
                    let _ = writeln!(out, "{}", text);
                }
                SectionBody::List(items) if items.is_empty() => {
                    let _ = writeln!(out, "*None*");
                }
                SectionBody::List(items) => {
                    for item in items {
                        let _ = writeln!(out, "- {}", item);
                    }
                }
                SectionBody::Code(code) => {
                    let _ = writeln!(out, "```\n{}\n```", code.trim_end());
                }
            }
        }
        out
    }
}

fn fact(label: &str, value: String) -> Fact {
    Fact {
        label: label.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> TreeNode {
        TreeNode::directory(
            "linuxdoom",
            vec![
                TreeNode::directory("sndserv", Vec::new()),
                TreeNode::file("d_main.c")
                    .with_size(4096)
                    .with_readme("# d_main.c")
                    .with_dependencies(["doomdef.h"])
                    .with_outputs(["printf"]),
                TreeNode::file("doomdef.h"),
            ],
        )
    }

    fn titles(panel: &DetailPanel) -> Vec<&str> {
        panel.sections.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_directory_panel_lists_children() {
        let root = tree();
        let panel = DetailPanel::build(PanelSubject::Full(&root));
        assert_eq!(panel.title, "linuxdoom");
        assert_eq!(titles(&panel), vec!["Subdirectories", "Files"]);
        assert_eq!(
            panel.section("Subdirectories").unwrap().body,
            SectionBody::List(vec!["sndserv".into()])
        );
        assert_eq!(
            panel.section("Files").unwrap().body,
            SectionBody::List(vec!["d_main.c".into(), "doomdef.h".into()])
        );
        assert!(panel.sections.iter().all(|s| !s.expanded));
    }

    #[test]
    fn test_file_panel_sections() {
        let root = tree();
        let file = find_by_name(&root, "d_main.c").unwrap();
        let panel = DetailPanel::build(PanelSubject::Full(file));
        assert_eq!(
            titles(&panel),
            vec![
                "Published Readme",
                "Gen AI Analysis",
                "Dependencies",
                "Outputs",
                "Source Code"
            ]
        );
        assert_eq!(panel.facts[1].value, "4096 bytes");
        assert_eq!(
            panel.section("Source Code").unwrap().body,
            SectionBody::Text(SOURCE_PLACEHOLDER.into())
        );
    }

    #[test]
    fn test_hydrated_source_is_shown() {
        let mut file = TreeNode::file("i_main.c");
        file.set_source("int main() {}".into());
        let panel = DetailPanel::build(PanelSubject::Full(&file));
        assert_eq!(
            panel.section("Source Code").unwrap().body,
            SectionBody::Code("int main() {}".into())
        );
        assert_eq!(panel.facts.len(), 1, "no size fact without a size");
    }

    #[test]
    fn test_resolve_falls_back_to_minimal() {
        let root = tree();
        let known = DiagramNode::new("doomdef.h");
        let unknown = DiagramNode::new("stdio.h");

        assert!(matches!(PanelSubject::resolve(&root, &known), PanelSubject::Full(_)));
        let subject = PanelSubject::resolve(&root, &unknown);
        assert!(matches!(subject, PanelSubject::Minimal(_)));
        assert_eq!(subject.name(), "stdio.h");

        let panel = DetailPanel::build(subject);
        assert_eq!(panel.title, "stdio.h");
        assert!(panel.sections.is_empty());
        assert_eq!(panel.facts[0].value, "h");
    }

    #[test]
    fn test_subject_at_id_tells_duplicates_apart() {
        let root = TreeNode::directory(
            "DOOM",
            vec![
                TreeNode::directory("linuxdoom", vec![TreeNode::file("Makefile").with_size(100)]),
                TreeNode::directory("sndserv", vec![TreeNode::file("Makefile").with_size(7)]),
            ],
        );
        let panel = DetailPanel::build(PanelSubject::at(&root, 4).unwrap());
        assert_eq!(panel.title, "Makefile");
        assert_eq!(panel.facts[1].value, "7 bytes");
        assert!(PanelSubject::at(&root, 5).is_none());
    }

    #[test]
    fn test_toggle_sections_independently() {
        let root = tree();
        let mut panel = DetailPanel::build(PanelSubject::Full(&root));
        assert_eq!(panel.toggle(1), Some(true));
        assert!(!panel.sections[0].expanded);
        assert_eq!(panel.toggle_title("Files"), Some(false));
        assert_eq!(panel.toggle(7), None);
        assert_eq!(panel.toggle_title("Outputs"), None);
    }

    #[test]
    fn test_html_escapes_and_hides_collapsed() {
        let file = TreeNode::file("a<b>.c").with_dependencies(["x&y.h"]);
        let mut panel = DetailPanel::build(PanelSubject::Full(&file));
        let html = panel.to_html();
        assert!(html.contains("<h2>a&lt;b&gt;.c</h2>"));
        assert!(html.contains("<li>x&amp;y.h</li>"));
        assert!(html.contains(r#"style="display: none""#));
        assert!(!html.contains(r#"style="display: block""#));

        panel.toggle_title("Dependencies");
        assert!(panel.to_html().contains(r#"style="display: block""#));
    }

    #[test]
    fn test_empty_panel() {
        let panel = DetailPanel::empty();
        assert_eq!(panel.to_html(), format!("<p>{}</p>", NO_DETAILS));
        assert_eq!(panel.to_markdown().trim(), NO_DETAILS);
    }

    #[test]
    fn test_markdown_shows_expanded_bodies_only() {
        let root = tree();
        let file = find_by_name(&root, "d_main.c").unwrap();
        let mut panel = DetailPanel::build(PanelSubject::Full(file));
        let collapsed = panel.to_markdown();
        assert!(collapsed.contains("### ▶ Dependencies"));
        assert!(!collapsed.contains("- doomdef.h"));

        panel.expand_all();
        let expanded = panel.to_markdown();
        assert!(expanded.contains("### ▼ Dependencies"));
        assert!(expanded.contains("- doomdef.h"));
        assert!(expanded.contains(SOURCE_PLACEHOLDER));
    }
}
