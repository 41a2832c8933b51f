//! Emitter: `Graph` → AppMap text.
//!
//! The sync path never re-serializes a whole graph; it edits single lines
//! (see `reconcile`). Full emission is a convenience for exporting a graph
//! built in code or normalizing a document.

use crate::model::*;
use std::fmt::Write;

/// The canonical text of an edge line: `A -> B` or `A -} B`.
pub fn canonical_edge_line(source: &str, target: &str, anchors: AnchorPair) -> String {
    format!("{source} {} {target}", anchors.connector())
}

/// The canonical text of a positional line: `x,y,Label`.
pub fn position_line(label: &str, position: Position) -> String {
    format!("{},{},{label}", position.x, position.y)
}

/// Emit a whole graph.
///
/// Pinned nodes are written as positional lines and other nodes that had
/// their own line as standalone lines, in graph order. Edges follow in
/// declaration order. Nodes only mentioned by edges get no line of their own.
#[must_use]
pub fn emit_document(graph: &Graph) -> String {
    let mut out = String::with_capacity(graph.node_count() * 16 + graph.edges.len() * 24);

    for node in graph.nodes() {
        if node.pinned {
            let _ = writeln!(out, "{}", position_line(node.id.as_str(), node.position));
        } else if node.origin_line.is_some() {
            let _ = writeln!(out, "{}", node.id);
        }
    }

    for edge in &graph.edges {
        let line = canonical_edge_line(edge.source.as_str(), edge.target.as_str(), edge.anchors);
        let _ = writeln!(out, "{line}");
    }

    out
}
