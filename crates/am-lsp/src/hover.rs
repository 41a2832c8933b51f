//! Hover: show what a line means once parsed.
//!
//! - Node lines → position (pinned or auto-placed) and degree.
//! - Edge lines → endpoints, anchors and the edge id the canvas uses.
//! - Lines the linter flags are not special-cased; diagnostics cover them.

use am_core::grammar::{LineKind, classify, lines};
use am_core::model::{Edge, Graph, Node};
use tower_lsp::lsp_types::*;

pub fn compute_hover(text: &str, pos: Position, graph: &Graph) -> Option<Hover> {
    let index = pos.line as usize;
    let line = lines(text).nth(index)?;

    let markdown = match classify(line.raw) {
        LineKind::Blank => return None,
        LineKind::PositionedNode { label, .. } | LineKind::StandaloneNode(label) => {
            describe_node(graph, graph.node_by_label(label)?, index)
        }
        LineKind::Edge { .. } => {
            let edge = graph.edges.iter().find(|e| e.origin_line == Some(index))?;
            describe_edge(edge)
        }
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: markdown,
        }),
        range: Some(crate::diagnostics::line_range(text, index)),
    })
}

fn describe_node(graph: &Graph, node: &Node, index: usize) -> String {
    let placement = match node.position_line() {
        Some(line) if line == index => "pinned here".to_string(),
        Some(line) => format!("pinned on line {}", line + 1),
        None => "auto-placed".to_string(),
    };
    format!(
        "**{}** at ({}, {}), {placement}\n\n{} outgoing, {} incoming",
        node.id,
        node.position.x,
        node.position.y,
        graph.outgoing(node.id).len(),
        graph.incoming(node.id).len(),
    )
}

fn describe_edge(edge: &Edge) -> String {
    format!(
        "**{}** → **{}**\n\nanchors: {} → {}  \nid: `{}`",
        edge.source,
        edge.target,
        edge.anchors.source(),
        edge.anchors.target(),
        edge.id,
    )
}
