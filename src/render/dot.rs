use std::fmt;

use super::payload::RenderPayload;

/// Graphviz rendering of a payload with pinned positions.
///
/// Render with `neato -n` (or `fdp`) so the `pos` attributes are honoured.
/// Graphviz y grows upwards, so y is flipped to keep the on-screen order.
pub struct DotGraph<'a> {
    payload: &'a RenderPayload,
}

impl<'a> DotGraph<'a> {
    pub fn new(payload: &'a RenderPayload) -> Self {
        Self { payload }
    }
}

/// Quote a string as a DOT double-quoted ID.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for DotGraph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let palette = self.payload.palette;
        writeln!(f, "digraph butterfly {{")?;
        writeln!(f, "    layout=neato;")?;
        writeln!(
            f,
            "    node [shape=box style=\"rounded,filled\" fontname=monospace fillcolor={} fontcolor={}];",
            quote(palette.node_background),
            quote(palette.node_text)
        )?;
        writeln!(f, "    edge [color={}];", quote(palette.edge))?;

        for node in &self.payload.nodes {
            writeln!(
                f,
                "    {} [label={} tooltip={} pos=\"{},{}!\"];",
                quote(&node.id),
                quote(&node.label),
                quote(&node.display_name),
                node.x,
                0.0 - node.y
            )?;
        }
        for edge in &self.payload.edges {
            writeln!(f, "    {} -> {};", quote(&edge.source), quote(&edge.target))?;
        }

        writeln!(f, "}}")
    }
}

/// DOT source for `payload`.
pub fn render_dot(payload: &RenderPayload) -> String {
    DotGraph::new(payload).to_string()
}
