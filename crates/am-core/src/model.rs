//! Core graph model for AppMap documents.
//!
//! A document describes a directed graph of named nodes and the edges
//! between them. The graph is rebuilt from scratch on every parse; the only
//! continuity across rebuilds is origin-line bookkeeping, which points each
//! node and edge back at the line of text that declared it so the reverse
//! translator can rewrite just that line.

use crate::error::ParseAnchorError;
use crate::id::NodeId;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ─── Geometry ────────────────────────────────────────────────────────────

/// Integer canvas coordinates, as written in `x,y,Label` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

// ─── Anchors ─────────────────────────────────────────────────────────────

/// The side of a node an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Left,
    Right,
    Top,
    Bottom,
}

impl Anchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::Left => "left",
            Anchor::Right => "right",
            Anchor::Top => "top",
            Anchor::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = ParseAnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Anchor::Left),
            "right" => Ok(Anchor::Right),
            "top" => Ok(Anchor::Top),
            "bottom" => Ok(Anchor::Bottom),
            _ => Err(ParseAnchorError(s.to_string())),
        }
    }
}

/// Which pair of sides an edge connects. Encoded in text by the connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPair {
    /// `A -> B`: leaves the source's right side, enters the target's left.
    #[default]
    RightLeft,
    /// `A -} B`: leaves the source's bottom, enters the target's top.
    BottomTop,
}

impl AnchorPair {
    /// Map the anchors of a connect gesture to a pair.
    /// `(bottom, top)` is the only combination that is not right/left.
    pub fn from_anchors(source: Anchor, target: Anchor) -> Self {
        match (source, target) {
            (Anchor::Bottom, Anchor::Top) => AnchorPair::BottomTop,
            _ => AnchorPair::RightLeft,
        }
    }

    pub fn source(&self) -> Anchor {
        match self {
            AnchorPair::RightLeft => Anchor::Right,
            AnchorPair::BottomTop => Anchor::Bottom,
        }
    }

    pub fn target(&self) -> Anchor {
        match self {
            AnchorPair::RightLeft => Anchor::Left,
            AnchorPair::BottomTop => Anchor::Top,
        }
    }

    /// The canonical connector token written between the two labels.
    pub fn connector(&self) -> &'static str {
        match self {
            AnchorPair::RightLeft => crate::grammar::RIGHT_LEFT,
            AnchorPair::BottomTop => crate::grammar::BOTTOM_TOP,
        }
    }
}

// ─── Nodes & Edges ───────────────────────────────────────────────────────

/// A named node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    /// The line that declared this node on its own (standalone or
    /// positional). `None` for nodes only mentioned by edges.
    pub origin_line: Option<usize>,
    /// True when `origin_line` is an `x,y,Label` line, i.e. the node has a
    /// line a move can rewrite.
    pub pinned: bool,
}

impl Node {
    pub fn new(id: NodeId, position: Position) -> Self {
        Self {
            id,
            position,
            origin_line: None,
            pinned: false,
        }
    }

    /// The line a move gesture rewrites, if the node has one.
    pub fn position_line(&self) -> Option<usize> {
        if self.pinned { self.origin_line } else { None }
    }
}

/// Stable edge identity: the endpoint pair plus the occurrence ordinal
/// among edges with the same pair, so repeated pairs stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId {
    pub source: NodeId,
    pub target: NodeId,
    pub ordinal: u32,
}

impl EdgeId {
    pub fn new(source: NodeId, target: NodeId, ordinal: u32) -> Self {
        Self {
            source,
            target,
            ordinal,
        }
    }
}

/// Written as `source->target#ordinal`. The ordinal is always present so a
/// label ending in `#<digits>` is never mistaken for it. Read back with
/// [`Graph::find_edge`], which needs the graph to split the endpoints.
impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}#{}", self.source, self.target, self.ordinal)
    }
}

impl Serialize for EdgeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A directed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub anchors: AnchorPair,
    /// The line that declared this edge. `None` only for edges that have not
    /// been written into text yet.
    pub origin_line: Option<usize>,
}

// ─── Graph ───────────────────────────────────────────────────────────────

/// A parsed document.
///
/// Topology lives in a `StableDiGraph` whose edge weights index into
/// `edges`, which keeps declaration order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// The underlying directed graph.
    pub graph: StableDiGraph<Node, usize>,

    /// Index from NodeId → NodeIndex for fast lookup.
    pub id_index: HashMap<NodeId, NodeIndex>,

    /// Edges in first-declaration order.
    pub edges: Vec<Edge>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or return the index of the existing node with that id.
    pub fn ensure_node(&mut self, id: NodeId, position: impl FnOnce() -> Position) -> NodeIndex {
        if let Some(idx) = self.id_index.get(&id) {
            return *idx;
        }
        let idx = self.graph.add_node(Node::new(id, position()));
        self.id_index.insert(id, idx);
        idx
    }

    /// Append an edge between two existing nodes. Returns `None` if either
    /// endpoint is missing.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        anchors: AnchorPair,
        origin_line: Option<usize>,
    ) -> Option<EdgeId> {
        let from = self.index_of(source)?;
        let to = self.index_of(target)?;
        let ordinal = self.edges_between(source, target).len() as u32;
        let id = EdgeId::new(source, target, ordinal);
        self.graph.add_edge(from, to, self.edges.len());
        self.edges.push(Edge {
            id,
            source,
            target,
            anchors,
            origin_line,
        });
        Some(id)
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    /// Look a node up by label without interning it.
    pub fn node_by_label(&self, label: &str) -> Option<&Node> {
        NodeId::get(label).and_then(|id| self.node(id))
    }

    /// Nodes in insertion (first-mention) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Resolve the `Display` form of an edge id against this graph.
    ///
    /// Labels may themselves contain `->`, so every split point is tried and
    /// the one naming an edge of this graph wins.
    pub fn find_edge(&self, key: &str) -> Option<EdgeId> {
        let (pair, ordinal) = key.rsplit_once('#')?;
        let ordinal = ordinal.parse().ok()?;
        pair.match_indices(crate::grammar::RIGHT_LEFT)
            .filter_map(|(at, arrow)| {
                let source = NodeId::get(&pair[..at])?;
                let target = NodeId::get(&pair[at + arrow.len()..])?;
                Some(EdgeId::new(source, target, ordinal))
            })
            .find(|id| self.edge(*id).is_some())
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().map(|e| e.id)
    }

    /// All edges from `source` to `target`, in declaration order.
    pub fn edges_between(&self, source: NodeId, target: NodeId) -> SmallVec<[&Edge; 2]> {
        let (Some(from), Some(to)) = (self.index_of(source), self.index_of(target)) else {
            return SmallVec::new();
        };
        let mut found: SmallVec<[&Edge; 2]> = self
            .graph
            .edges_connecting(from, to)
            .map(|e| &self.edges[*e.weight()])
            .collect();
        found.sort_by_key(|e| e.id.ordinal);
        found
    }

    /// Edges leaving `id`, in declaration order.
    pub fn outgoing(&self, id: NodeId) -> Vec<&Edge> {
        self.incident(id, Direction::Outgoing)
    }

    /// Edges entering `id`, in declaration order.
    pub fn incoming(&self, id: NodeId) -> Vec<&Edge> {
        self.incident(id, Direction::Incoming)
    }

    fn incident(&self, id: NodeId, dir: Direction) -> Vec<&Edge> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        let mut slots: Vec<usize> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| *e.weight())
            .collect();
        slots.sort_unstable();
        slots.into_iter().map(|i| &self.edges[i]).collect()
    }
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nodes: Vec<&Node> = self.nodes().collect();
        let mut s = serializer.serialize_struct("Graph", 2)?;
        s.serialize_field("nodes", &nodes)?;
        s.serialize_field("edges", &self.edges)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(labels: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for label in labels {
            graph.ensure_node(NodeId::intern(label), Position::default);
        }
        graph
    }

    #[test]
    fn ensure_node_is_idempotent() {
        let mut graph = Graph::new();
        let id = NodeId::intern("Orders");
        let a = graph.ensure_node(id, || Position::new(1, 2));
        let b = graph.ensure_node(id, || Position::new(9, 9));
        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(id).unwrap().position, Position::new(1, 2));
    }

    #[test]
    fn add_edge_requires_endpoints() {
        let mut graph = graph_with(&["Orders"]);
        let edge = graph.add_edge(
            NodeId::intern("Orders"),
            NodeId::intern("Missing Service"),
            AnchorPair::RightLeft,
            Some(0),
        );
        assert!(edge.is_none());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn repeated_pairs_get_distinct_ids() {
        let mut graph = graph_with(&["Orders", "Stock"]);
        let (a, b) = (NodeId::intern("Orders"), NodeId::intern("Stock"));
        let first = graph.add_edge(a, b, AnchorPair::RightLeft, Some(2)).unwrap();
        let second = graph.add_edge(a, b, AnchorPair::BottomTop, Some(3)).unwrap();
        assert_ne!(first, second);
        assert_eq!(first.to_string(), "Orders->Stock#0");
        assert_eq!(second.to_string(), "Orders->Stock#1");
        assert_eq!(graph.edges_between(a, b).len(), 2);
        assert_eq!(graph.edge(second).unwrap().origin_line, Some(3));
    }

    #[test]
    fn find_edge_resolves_display_form() {
        let mut graph = graph_with(&["Orders", "Stock"]);
        let (a, b) = (NodeId::intern("Orders"), NodeId::intern("Stock"));
        graph.add_edge(a, b, AnchorPair::RightLeft, None).unwrap();
        let second = graph.add_edge(a, b, AnchorPair::RightLeft, None).unwrap();
        assert_eq!(graph.find_edge(&second.to_string()), Some(second));
        assert_eq!(graph.find_edge("Orders->Stock#2"), None);
        assert_eq!(graph.find_edge("Orders->Stock"), None);
        assert_eq!(graph.find_edge("Orders"), None);
    }

    #[test]
    fn find_edge_with_hash_digits_in_label() {
        let mut graph = graph_with(&["Api", "Team", "Team#2"]);
        let api = NodeId::intern("Api");
        for _ in 0..3 {
            graph.add_edge(api, NodeId::intern("Team"), AnchorPair::RightLeft, None);
        }
        let tagged = graph
            .add_edge(api, NodeId::intern("Team#2"), AnchorPair::RightLeft, None)
            .unwrap();
        assert_eq!(tagged.to_string(), "Api->Team#2#0");
        assert_eq!(graph.find_edge(&tagged.to_string()), Some(tagged));
        let third = graph.find_edge("Api->Team#2").unwrap();
        assert_eq!(third.target, NodeId::intern("Team"));
        assert_eq!(third.ordinal, 2);
    }

    #[test]
    fn find_edge_with_arrow_in_source() {
        let mut graph = graph_with(&["->A", "B"]);
        let id = graph
            .add_edge(NodeId::intern("->A"), NodeId::intern("B"), AnchorPair::RightLeft, None)
            .unwrap();
        assert_eq!(id.to_string(), "->A->B#0");
        assert_eq!(graph.find_edge(&id.to_string()), Some(id));
    }

    #[test]
    fn incident_edges_follow_declaration_order() {
        let mut graph = graph_with(&["Hub", "A", "B"]);
        let hub = NodeId::intern("Hub");
        graph.add_edge(hub, NodeId::intern("B"), AnchorPair::RightLeft, Some(0));
        graph.add_edge(NodeId::intern("A"), hub, AnchorPair::RightLeft, Some(1));
        graph.add_edge(hub, NodeId::intern("A"), AnchorPair::BottomTop, Some(2));
        let out: Vec<_> = graph.outgoing(hub).iter().map(|e| e.origin_line).collect();
        assert_eq!(out, vec![Some(0), Some(2)]);
        assert_eq!(graph.incoming(hub).len(), 1);
    }

    #[test]
    fn anchor_pair_mapping() {
        use Anchor::*;
        assert_eq!(AnchorPair::from_anchors(Bottom, Top), AnchorPair::BottomTop);
        assert_eq!(AnchorPair::from_anchors(Right, Left), AnchorPair::RightLeft);
        assert_eq!(AnchorPair::from_anchors(Left, Right), AnchorPair::RightLeft);
        assert_eq!(AnchorPair::from_anchors(Top, Bottom), AnchorPair::RightLeft);
    }

    #[test]
    fn anchor_from_str() {
        assert_eq!("Bottom".parse::<Anchor>().unwrap(), Anchor::Bottom);
        assert!("middle".parse::<Anchor>().is_err());
    }

    #[test]
    fn position_line_requires_pin() {
        let mut node = Node::new(NodeId::intern("Cache"), Position::default());
        node.origin_line = Some(4);
        assert_eq!(node.position_line(), None);
        node.pinned = true;
        assert_eq!(node.position_line(), Some(4));
    }
}
