//! Minimal SVG document writer used as the drawing surface.

use std::fmt::Write;

pub struct SvgWriter {
    buf: String,
    open: Vec<&'static str>,
}

impl SvgWriter {
    pub fn new(width: f64, height: f64) -> Self {
        let mut buf = String::new();
        let _ = write!(
            buf,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = num(width),
            h = num(height)
        );
        buf.push('\n');
        Self {
            buf,
            open: Vec::new(),
        }
    }

    /// Open a container element; closed by [`SvgWriter::close`].
    pub fn open(&mut self, tag: &'static str, attrs: &[(&str, String)]) {
        self.start_tag(tag, attrs);
        self.buf.push_str(">\n");
        self.open.push(tag);
    }

    pub fn close(&mut self) {
        if let Some(tag) = self.open.pop() {
            self.indent();
            let _ = writeln!(self.buf, "</{}>", tag);
        }
    }

    /// Self-closing element.
    pub fn element(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.start_tag(tag, attrs);
        self.buf.push_str("/>\n");
    }

    /// Element with escaped text content.
    pub fn text_element(&mut self, tag: &str, attrs: &[(&str, String)], text: &str) {
        self.start_tag(tag, attrs);
        let _ = writeln!(self.buf, ">{}</{}>", escape(text), tag);
    }

    pub fn finish(mut self) -> String {
        while !self.open.is_empty() {
            self.close();
        }
        self.buf.push_str("</svg>\n");
        self.buf
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(tag);
        for (name, value) in attrs {
            let _ = write!(self.buf, r#" {}="{}""#, name, escape(value));
        }
    }

    fn indent(&mut self) {
        for _ in 0..=self.open.len() {
            self.buf.push_str("  ");
        }
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Coordinates with at most two decimals and no trailing zeros.
pub fn num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

pub fn translate(x: f64, y: f64) -> String {
    format!("translate({},{})", num(x), num(y))
}
