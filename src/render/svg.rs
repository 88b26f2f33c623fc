use std::fmt::Write as _;

use crate::error::{ChartError, ChartResult};
use crate::render::{NodeId, NodeKind, Renderer, Scene};

/// Serializes the scene into a standalone SVG document.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    output: String,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document produced by the last successful `render` call.
    #[must_use]
    pub fn svg(&self) -> &str {
        &self.output
    }

    #[must_use]
    pub fn into_svg(self) -> String {
        self.output
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, scene: &Scene) -> ChartResult<()> {
        scene.validate()?;
        let mut out = String::new();
        write_node(scene, scene.root(), &mut out, 0)
            .map_err(|err| ChartError::Scene(format!("svg serialization failed: {err}")))?;
        self.output = out;
        Ok(())
    }
}

fn write_node(scene: &Scene, id: NodeId, out: &mut String, depth: usize) -> std::fmt::Result {
    let Some(node) = scene.node(id) else {
        return Ok(());
    };
    let indent = "  ".repeat(depth);
    write!(out, "{indent}<{}", node.kind.tag())?;

    if node.kind == NodeKind::Root {
        let (width, height) = scene.size();
        write!(
            out,
            " xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\"",
            crate::core::format_number(width),
            crate::core::format_number(height)
        )?;
    }
    if !node.classes.is_empty() {
        write!(out, " class=\"{}\"", escape_xml(&node.classes.join(" ")))?;
    }
    for (name, value) in &node.attrs {
        write!(out, " {name}=\"{}\"", escape_xml(&value.to_string()))?;
    }
    if !node.styles.is_empty() {
        let style = node
            .styles
            .iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect::<Vec<_>>()
            .join(";");
        write!(out, " style=\"{}\"", escape_xml(&style))?;
    }

    if node.children.is_empty() && node.text.is_none() {
        out.push_str("/>\n");
        return Ok(());
    }

    out.push('>');
    if let Some(text) = &node.text {
        out.push_str(&escape_xml(text));
    }
    if !node.children.is_empty() {
        out.push('\n');
        for child in &node.children {
            write_node(scene, *child, out, depth + 1)?;
        }
        out.push_str(&indent);
    }
    writeln!(out, "</{}>", node.kind.tag())
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
