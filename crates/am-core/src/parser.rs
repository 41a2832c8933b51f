//! Forward translator: AppMap text → `Graph`.
//!
//! Every line is classified by the grammar and folded into a fresh graph.
//! The running line index counts every line, blanks included, so origin
//! lines always point at raw text lines.

use crate::grammar::{LineKind, lines};
use crate::id::NodeId;
use crate::layout::{Placement, StackPlacement};
use crate::model::*;

/// Parse a document with the default stacking placement.
#[must_use = "parsing result should be used"]
pub fn parse_document(text: &str) -> Graph {
    parse_with(text, &mut StackPlacement::default())
}

/// Parse a document, placing unpositioned nodes with `placement`.
///
/// Never fails: lines that match no structured pattern become standalone
/// nodes.
#[must_use = "parsing result should be used"]
pub fn parse_with(text: &str, placement: &mut dyn Placement) -> Graph {
    let mut graph = Graph::new();

    for line in lines(text) {
        match line.kind() {
            LineKind::Blank => {}
            LineKind::Edge {
                source,
                target,
                anchors,
            } => {
                let source = NodeId::intern(source);
                let target = NodeId::intern(target);
                graph.ensure_node(source, || placement.place(source));
                graph.ensure_node(target, || placement.place(target));
                graph.add_edge(source, target, anchors, Some(line.index));
            }
            LineKind::PositionedNode { x, y, label } => {
                let id = NodeId::intern(label);
                let position = Position::new(x, y);
                graph.ensure_node(id, || position);
                if let Some(node) = graph.node_mut(id)
                    && !node.pinned
                {
                    node.position = position;
                    node.origin_line = Some(line.index);
                    node.pinned = true;
                }
            }
            LineKind::StandaloneNode(label) => {
                let id = NodeId::intern(label);
                graph.ensure_node(id, || placement.place(id));
                if let Some(node) = graph.node_mut(id)
                    && node.origin_line.is_none()
                {
                    node.origin_line = Some(line.index);
                }
            }
        }
    }

    log::trace!(
        "parsed {} nodes, {} edges ({} placed)",
        graph.node_count(),
        graph.edges.len(),
        placement.placed()
    );

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GridPlacement;
    use crate::layout::Viewport;

    fn node<'a>(graph: &'a Graph, label: &str) -> &'a Node {
        graph
            .node(NodeId::intern(label))
            .unwrap_or_else(|| panic!("missing node {label}"))
    }

    #[test]
    fn parse_standalone_and_edges() {
        let graph = parse_document("A\nB\nA -> B");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges.len(), 1);

        let a = node(&graph, "A");
        assert_eq!(a.origin_line, Some(0));
        assert!(!a.pinned);
        assert_eq!(a.position_line(), None);

        let edge = &graph.edges[0];
        assert_eq!(edge.source, NodeId::intern("A"));
        assert_eq!(edge.target, NodeId::intern("B"));
        assert_eq!(edge.anchors, AnchorPair::RightLeft);
        assert_eq!(edge.origin_line, Some(2));
    }

    #[test]
    fn blank_lines_consume_indices() {
        let graph = parse_document("\n\nA -} B\n\n5,6,C");
        assert_eq!(graph.edges[0].origin_line, Some(2));
        assert_eq!(graph.edges[0].anchors, AnchorPair::BottomTop);
        assert_eq!(node(&graph, "C").origin_line, Some(4));
    }

    #[test]
    fn edge_only_nodes_have_no_origin() {
        let graph = parse_document("Gateway -> Users");
        assert_eq!(node(&graph, "Gateway").origin_line, None);
        assert_eq!(node(&graph, "Users").origin_line, None);
    }

    #[test]
    fn later_standalone_records_origin_for_edge_node() {
        let graph = parse_document("Gateway -> Users\nUsers");
        assert_eq!(node(&graph, "Users").origin_line, Some(1));
    }

    #[test]
    fn positional_line_overrides_implicit_placement() {
        let graph = parse_document("A -> B\nA\n300,400,A");
        let a = node(&graph, "A");
        assert_eq!(a.position, Position::new(300, 400));
        assert_eq!(a.origin_line, Some(2));
        assert_eq!(a.position_line(), Some(2));
    }

    #[test]
    fn first_positional_line_wins() {
        let graph = parse_document("1,1,A\n2,2,A");
        let a = node(&graph, "A");
        assert_eq!(a.position, Position::new(1, 1));
        assert_eq!(a.origin_line, Some(0));
    }

    #[test]
    fn standalone_after_positional_keeps_pin() {
        let graph = parse_document("1,1,A\nA");
        let a = node(&graph, "A");
        assert_eq!(a.origin_line, Some(0));
        assert!(a.pinned);
    }

    #[test]
    fn self_edges_are_kept() {
        let graph = parse_document("Retry -> Retry");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source, graph.edges[0].target);
    }

    #[test]
    fn edge_order_is_declaration_order() {
        let graph = parse_document("C -> A\nA -> B\nB -} C");
        let lines: Vec<_> = graph.edges.iter().map(|e| e.origin_line).collect();
        assert_eq!(lines, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn placement_is_deterministic() {
        let text = "Web\nWeb -> Api\nApi -> Db";
        let first = parse_document(text);
        let second = parse_document(text);
        for n in first.nodes() {
            assert_eq!(second.node(n.id).map(|m| m.position), Some(n.position));
        }
        assert_eq!(node(&first, "Web").position, Position::new(50, 50));
        assert_eq!(node(&first, "Api").position, Position::new(50, 120));
        assert_eq!(node(&first, "Db").position, Position::new(50, 190));
    }

    #[test]
    fn positioned_nodes_do_not_consume_placement() {
        let text = "10,10,Pinned\nLoose";
        let graph = parse_document(text);
        assert_eq!(node(&graph, "Loose").position, Position::new(50, 50));
    }

    #[test]
    fn placement_policy_carries_offset() {
        let mut grid = GridPlacement::for_viewport(Viewport::default());
        let _ = parse_with("A\nB", &mut grid);
        assert_eq!(grid.placed(), 2);
        let graph = parse_with("C", &mut grid);
        assert_eq!(node(&graph, "C").position, Position::new(400, 0));
    }

    #[test]
    fn malformed_lines_never_fail() {
        let graph = parse_document("A => B\n-> X\n,,\n12,abc");
        assert_eq!(graph.node_count(), 4);
        assert!(graph.edges.is_empty());
    }
}
