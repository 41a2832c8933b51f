//! Document symbols: outline/go-to-symbol for AppMap documents.

use crate::diagnostics::line_range;
use am_core::model::Graph;
use tower_lsp::lsp_types::*;

/// A flat list of nodes and edges, each located at the line that declares it.
///
/// A node never declared on a line of its own is located at the first edge
/// that mentions it.
#[allow(deprecated)] // SymbolInformation::deprecated is deprecated but required
pub fn compute_symbols(uri: &Url, text: &str, graph: &Graph) -> Vec<SymbolInformation> {
    let mut symbols = Vec::with_capacity(graph.node_count() + graph.edges.len());

    for node in graph.nodes() {
        let line = node.origin_line.or_else(|| {
            graph
                .edges
                .iter()
                .find(|e| e.source == node.id || e.target == node.id)
                .and_then(|e| e.origin_line)
        });
        let Some(line) = line else { continue };
        symbols.push(SymbolInformation {
            name: node.id.to_string(),
            kind: SymbolKind::OBJECT,
            tags: None,
            deprecated: None,
            location: Location::new(uri.clone(), line_range(text, line)),
            container_name: None,
        });
    }

    for edge in &graph.edges {
        let Some(line) = edge.origin_line else { continue };
        symbols.push(SymbolInformation {
            name: format!("{} {} {}", edge.source, edge.anchors.connector(), edge.target),
            kind: SymbolKind::OPERATOR,
            tags: None,
            deprecated: None,
            location: Location::new(uri.clone(), line_range(text, line)),
            container_name: Some(edge.source.to_string()),
        });
    }

    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::parser::parse_document;

    fn uri() -> Url {
        Url::parse("file:///tmp/map.am").unwrap()
    }

    #[test]
    fn nodes_and_edges_are_listed() {
        let text = "10,10,Web\nWeb -} Api\nApi -> Db";
        let graph = parse_document(text);
        let syms = compute_symbols(&uri(), text, &graph);
        let listed: Vec<(&str, u32)> = syms
            .iter()
            .map(|s| (s.name.as_str(), s.location.range.start.line))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("Web", 0),
                ("Api", 1),
                ("Db", 2),
                ("Web -} Api", 1),
                ("Api -> Db", 2),
            ]
        );
        assert_eq!(syms[3].kind, SymbolKind::OPERATOR);
        assert_eq!(syms[3].location.uri, uri());
    }

    #[test]
    fn empty_document_has_no_symbols() {
        let graph = parse_document("");
        assert!(compute_symbols(&uri(), "", &graph).is_empty());
    }
}
