//! Completions: known labels and connectors.

use am_core::grammar::{BOTTOM_TOP, RIGHT_LEFT, lines};
use am_core::model::{Graph, Node};
use tower_lsp::lsp_types::*;

/// Compute completions at the given cursor position.
///
/// After `<label> ` the connectors are offered; everywhere else the labels
/// the document already uses, so edges reuse existing nodes instead of
/// minting near-duplicates.
pub fn compute_completions(text: &str, pos: Position, graph: &Graph) -> Vec<CompletionItem> {
    let line = lines(text)
        .nth(pos.line as usize)
        .map_or("", |l| l.raw);
    let before_cursor = prefix_utf16(line, pos.character as usize);

    // Nodes declared by the half-typed line under the cursor don't count.
    let cursor_line = Some(pos.line as usize);

    if before_cursor.ends_with(' ')
        && graph
            .node_by_label(before_cursor.trim())
            .is_some_and(|n| n.origin_line != cursor_line)
    {
        return connector_completions();
    }

    graph
        .nodes()
        .filter(|n| n.origin_line != cursor_line)
        .map(label_completion)
        .collect()
}

fn label_completion(node: &Node) -> CompletionItem {
    let detail = if node.pinned {
        format!("pinned at ({}, {})", node.position.x, node.position.y)
    } else {
        "node".to_string()
    };
    CompletionItem {
        label: node.id.to_string(),
        kind: Some(CompletionItemKind::VALUE),
        detail: Some(detail),
        ..Default::default()
    }
}

fn connector_completions() -> Vec<CompletionItem> {
    [
        (RIGHT_LEFT, "right → left"),
        (BOTTOM_TOP, "bottom → top"),
    ]
    .into_iter()
    .map(|(connector, anchors)| CompletionItem {
        label: connector.to_string(),
        kind: Some(CompletionItemKind::OPERATOR),
        detail: Some(format!("edge, anchors {anchors}")),
        insert_text: Some(format!("{connector} ")),
        ..Default::default()
    })
    .collect()
}

/// The part of `line` before UTF-16 column `col`.
fn prefix_utf16(line: &str, col: usize) -> &str {
    let mut units = 0;
    for (i, ch) in line.char_indices() {
        if units >= col {
            return &line[..i];
        }
        units += ch.len_utf16();
    }
    line
}
