//! Reverse translator: graph edits → minimal text edits.
//!
//! Each operation takes the previous full text and returns the new full
//! text. Only the line the edit is about is touched; every other line keeps
//! its bytes and its relative order. Line endings are preserved: a rewritten
//! line keeps its trailing `\r`, and appended lines use the document's own
//! newline sequence.
//!
//! The `apply_*` functions work on text alone and trust their caller. The
//! checked wrappers (`move_node`, `connect`, `remove_edge` and their `_in`
//! variants) resolve ids against a graph first and report contract
//! violations as [`EditError`].

use crate::emitter::{canonical_edge_line, position_line};
use crate::error::EditError;
use crate::grammar::{LineKind, lines};
use crate::model::*;
use crate::parser::parse_document;

// ─── Text-only operations ───────────────────────────────────────────────

/// Rewrite a node's positional line to its new coordinates.
///
/// A node without an origin line has nowhere to record its position, so the
/// text comes back unchanged.
#[must_use]
pub fn apply_node_move(
    prev: &str,
    label: &str,
    to: Position,
    origin_line: Option<usize>,
) -> String {
    let Some(index) = origin_line else {
        log::trace!("move of `{label}` has no origin line; text unchanged");
        return prev.to_string();
    };
    replace_line(prev, index, &position_line(label, to))
}

/// Append the canonical line for a new edge, unless the document already
/// declares that edge.
#[must_use]
pub fn apply_connect(
    prev: &str,
    source: &str,
    target: &str,
    source_anchor: Anchor,
    target_anchor: Anchor,
) -> String {
    let anchors = AnchorPair::from_anchors(source_anchor, target_anchor);
    if let Some(index) = find_edge_line(prev, source, target, anchors) {
        log::trace!("edge `{source}` → `{target}` already declared on line {index}");
        return prev.to_string();
    }
    append_line(prev, &canonical_edge_line(source, target, anchors))
}

/// Remove the first line whose trimmed text equals `edge_line`.
///
/// Content-based: any line with that text is eligible, not only the one an
/// edge was parsed from. Returns the text unchanged if no line matches.
#[must_use]
pub fn apply_remove_edge(prev: &str, edge_line: &str) -> String {
    let wanted = edge_line.trim();
    match lines(prev).find(|line| line.raw.trim() == wanted) {
        Some(line) => remove_line(prev, line.index),
        None => prev.to_string(),
    }
}

/// Remove exactly the line at `index`. Out-of-range indices are a no-op.
#[must_use]
pub fn apply_remove_edge_at(prev: &str, index: usize) -> String {
    remove_line(prev, index)
}

// ─── Graph-checked operations ───────────────────────────────────────────

/// Move a node, resolving its positional line from `text`.
pub fn move_node(text: &str, label: &str, to: Position) -> Result<String, EditError> {
    move_node_in(text, &parse_document(text), label, to)
}

/// Move a node of `graph`, which must be the parse of `text`.
pub fn move_node_in(
    text: &str,
    graph: &Graph,
    label: &str,
    to: Position,
) -> Result<String, EditError> {
    let node = graph
        .node_by_label(label)
        .ok_or_else(|| EditError::UnknownNode(label.to_string()))?;
    Ok(apply_node_move(text, label, to, node.position_line()))
}

/// Connect two nodes that exist in `text`.
pub fn connect(
    text: &str,
    source: &str,
    target: &str,
    source_anchor: Anchor,
    target_anchor: Anchor,
) -> Result<String, EditError> {
    connect_in(
        text,
        &parse_document(text),
        source,
        target,
        source_anchor,
        target_anchor,
    )
}

/// Connect two nodes of `graph`, which must be the parse of `text`.
pub fn connect_in(
    text: &str,
    graph: &Graph,
    source: &str,
    target: &str,
    source_anchor: Anchor,
    target_anchor: Anchor,
) -> Result<String, EditError> {
    for label in [source, target] {
        if graph.node_by_label(label).is_none() {
            return Err(EditError::UnknownNode(label.to_string()));
        }
    }
    Ok(apply_connect(
        text,
        source,
        target,
        source_anchor,
        target_anchor,
    ))
}

/// Remove an edge by id, resolving it against a parse of `text`.
pub fn remove_edge(text: &str, id: EdgeId) -> Result<String, EditError> {
    remove_edge_in(text, &parse_document(text), id)
}

/// Remove an edge of `graph`, which must be the parse of `text`.
///
/// The edge's origin line is removed when it still declares that edge.
/// Otherwise the first line declaring the same edge is removed instead.
pub fn remove_edge_in(text: &str, graph: &Graph, id: EdgeId) -> Result<String, EditError> {
    let edge = graph.edge(id).ok_or_else(|| EditError::unknown_edge(id))?;
    let (source, target) = (edge.source.as_str(), edge.target.as_str());

    if let Some(index) = edge.origin_line
        && declares_edge(text, index, source, target, edge.anchors)
    {
        return Ok(apply_remove_edge_at(text, index));
    }

    log::debug!("edge {id} has no matching origin line; removing by content");
    Ok(match find_edge_line(text, source, target, edge.anchors) {
        Some(index) => apply_remove_edge_at(text, index),
        None => text.to_string(),
    })
}

// ─── Line helpers ───────────────────────────────────────────────────────

fn declares_edge(text: &str, index: usize, source: &str, target: &str, anchors: AnchorPair) -> bool {
    lines(text).nth(index).is_some_and(|line| {
        line.kind()
            == LineKind::Edge {
                source,
                target,
                anchors,
            }
    })
}

/// Index of the first line declaring `source → target` with `anchors`.
fn find_edge_line(text: &str, source: &str, target: &str, anchors: AnchorPair) -> Option<usize> {
    let wanted = LineKind::Edge {
        source,
        target,
        anchors,
    };
    lines(text)
        .find(|line| line.kind() == wanted)
        .map(|line| line.index)
}

fn replace_line(text: &str, index: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    for line in lines(text) {
        if line.index > 0 {
            out.push('\n');
        }
        if line.index == index {
            out.push_str(replacement);
            if line.raw.ends_with('\r') {
                out.push('\r');
            }
        } else {
            out.push_str(line.raw);
        }
    }
    out
}

fn remove_line(text: &str, index: usize) -> String {
    let total = lines(text).count();
    let mut kept: Vec<&str> = lines(text)
        .filter(|line| line.index != index)
        .map(|line| line.raw)
        .collect();
    // Dropping the unterminated last line also drops the `\r` of the
    // separator before it.
    if index + 1 == total
        && let Some(last) = kept.last_mut()
    {
        let line: &str = *last;
        *last = line.strip_suffix('\r').unwrap_or(line);
    }
    kept.join("\n")
}

fn append_line(text: &str, line: &str) -> String {
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    if text.is_empty() {
        line.to_string()
    } else if text.ends_with('\n') {
        format!("{text}{line}{newline}")
    } else {
        format!("{text}{newline}{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use pretty_assertions::assert_eq;

    fn edge_id(source: &str, target: &str, ordinal: u32) -> EdgeId {
        EdgeId::new(NodeId::intern(source), NodeId::intern(target), ordinal)
    }

    // ─── Move ───────────────────────────────────────────────────────────

    #[test]
    fn move_without_position_line_is_noop() {
        let text = "A\nB\nA -> B";
        assert_eq!(move_node(text, "A", Position::new(10, 20)).unwrap(), text);
    }

    #[test]
    fn move_rewrites_only_position_line() {
        let text = "10,20,A\nB\nA -> B";
        assert_eq!(
            move_node(text, "A", Position::new(30, 40)).unwrap(),
            "30,40,A\nB\nA -> B"
        );
    }

    #[test]
    fn move_keeps_carriage_return() {
        let text = "10,20,A\r\nB\r\n";
        assert_eq!(
            move_node(text, "A", Position::new(-1, 2)).unwrap(),
            "-1,2,A\r\nB\r\n"
        );
    }

    #[test]
    fn move_unknown_node_is_an_error() {
        assert_eq!(
            move_node("A", "Nope", Position::default()),
            Err(EditError::UnknownNode("Nope".into()))
        );
    }

    #[test]
    fn apply_move_with_explicit_origin() {
        let text = "x\n  1,1,Db  \ny";
        assert_eq!(
            apply_node_move(text, "Db", Position::new(5, 5), Some(1)),
            "x\n5,5,Db\ny"
        );
    }

    // ─── Connect ────────────────────────────────────────────────────────

    #[test]
    fn connect_appends_once() {
        let text = "A\nB";
        let once = connect(text, "A", "B", Anchor::Right, Anchor::Left).unwrap();
        let twice = connect(&once, "A", "B", Anchor::Right, Anchor::Left).unwrap();
        assert_eq!(once, "A\nB\nA -> B");
        assert_eq!(twice, once);
    }

    #[test]
    fn connect_anchor_mapping() {
        let text = "A\nB";
        assert_eq!(
            apply_connect(text, "A", "B", Anchor::Bottom, Anchor::Top),
            "A\nB\nA -} B"
        );
        assert_eq!(
            apply_connect(text, "A", "B", Anchor::Left, Anchor::Right),
            "A\nB\nA -> B"
        );
        assert_eq!(
            apply_connect(text, "A", "B", Anchor::Top, Anchor::Left),
            "A\nB\nA -> B"
        );
    }

    #[test]
    fn connect_dedups_against_differently_spaced_line() {
        let text = "A->B";
        assert_eq!(apply_connect(text, "A", "B", Anchor::Right, Anchor::Left), text);
    }

    #[test]
    fn connect_other_anchor_pair_is_a_new_line() {
        let text = "A -> B";
        assert_eq!(
            apply_connect(text, "A", "B", Anchor::Bottom, Anchor::Top),
            "A -> B\nA -} B"
        );
    }

    #[test]
    fn connect_respects_trailing_newline_and_crlf() {
        assert_eq!(
            apply_connect("A\r\nB\r\n", "A", "B", Anchor::Right, Anchor::Left),
            "A\r\nB\r\nA -> B\r\n"
        );
        assert_eq!(
            apply_connect("", "A", "B", Anchor::Right, Anchor::Left),
            "A -> B"
        );
    }

    #[test]
    fn connect_unknown_node_is_an_error() {
        assert_eq!(
            connect("A", "A", "Ghost", Anchor::Right, Anchor::Left),
            Err(EditError::UnknownNode("Ghost".into()))
        );
    }

    // ─── Remove ─────────────────────────────────────────────────────────

    #[test]
    fn remove_by_content() {
        assert_eq!(apply_remove_edge("A\nB\nA -> B", "A -> B"), "A\nB");
        assert_eq!(apply_remove_edge("A\nB", "A -> B"), "A\nB");
    }

    #[test]
    fn remove_last_line_keeps_crlf_consistent() {
        assert_eq!(apply_remove_edge("A\r\nB\r\nA -> B", "A -> B"), "A\r\nB");
        assert_eq!(
            apply_remove_edge("A\r\nA -> B\r\nB\r\n", "A -> B"),
            "A\r\nB\r\n"
        );
    }

    #[test]
    fn remove_by_content_takes_first_duplicate() {
        assert_eq!(
            apply_remove_edge("A -> B\nC\nA -> B", "A -> B"),
            "C\nA -> B"
        );
    }

    #[test]
    fn remove_by_id_targets_origin_line() {
        let text = "A -> B\nC\nA -> B\n";
        let out = remove_edge(text, edge_id("A", "B", 1)).unwrap();
        assert_eq!(out, "A -> B\nC\n");
    }

    #[test]
    fn remove_by_id_falls_back_to_content() {
        let text = "A -> B\nC";
        let graph = parse_document(text);
        // The text moved on since the graph was parsed.
        let edited = "C\nA -> B";
        assert_eq!(
            remove_edge_in(edited, &graph, edge_id("A", "B", 0)).unwrap(),
            "C"
        );
    }

    #[test]
    fn remove_unknown_edge_is_an_error() {
        let err = remove_edge("A\nB", edge_id("A", "B", 0)).unwrap_err();
        assert_eq!(err, EditError::UnknownEdge("A->B#0".into()));
    }

    #[test]
    fn untouched_lines_stay_byte_identical() {
        let text = "  // notes  \n\n10,20,Web\t\nApi\nWeb -> Api\n";
        let moved = move_node(text, "Web", Position::new(1, 2)).unwrap();
        assert_eq!(moved, "  // notes  \n\n1,2,Web\nApi\nWeb -> Api\n");
    }
}
