//! Lint diagnostics (strict mode) for AppMap documents.
//!
//! Reports lines that parse, but probably not the way the author meant.
//! Linting never changes what the parser produces. Results feed into
//! `textDocument/publishDiagnostics` in the LSP server and into the sync
//! controller's strict mode.

use crate::grammar::{LineKind, lines};
use crate::model::AnchorPair;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Likely a mistake.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic for one line.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LintDiagnostic {
    /// Zero-based line index.
    pub line: usize,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "malformed-edge", "self-loop").
    pub rule: &'static str,
}

/// Tokens that look like someone tried to write a connector.
const CONNECTOR_LOOKALIKES: &[&str] = &[
    "->", "-}", "-]", "=>", "- >", "<-", "→", "—>", "–>",
];

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over a document's text.
#[must_use]
pub fn lint_document(text: &str) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    let mut pinned: HashSet<&str> = HashSet::new();
    let mut edges: HashSet<(&str, &str, AnchorPair)> = HashSet::new();

    for line in lines(text) {
        let index = line.index;
        match line.kind() {
            LineKind::Blank => {}
            LineKind::StandaloneNode(label) => lint_standalone(index, label, &mut diags),
            LineKind::PositionedNode { label, .. } => {
                if !pinned.insert(label) {
                    diags.push(LintDiagnostic {
                        line: index,
                        message: format!(
                            "`{label}` already has a position line; this one is ignored."
                        ),
                        severity: LintSeverity::Warning,
                        rule: "duplicate-position",
                    });
                }
            }
            LineKind::Edge {
                source,
                target,
                anchors,
            } => {
                lint_edge_labels(index, source, &mut diags);
                if source == target {
                    diags.push(LintDiagnostic {
                        line: index,
                        message: format!("`{source}` is connected to itself."),
                        severity: LintSeverity::Info,
                        rule: "self-loop",
                    });
                }
                if !edges.insert((source, target, anchors)) {
                    diags.push(LintDiagnostic {
                        line: index,
                        message: format!(
                            "`{source}` {} `{target}` is declared more than once.",
                            anchors.connector()
                        ),
                        severity: LintSeverity::Info,
                        rule: "duplicate-edge",
                    });
                }
            }
        }
    }

    diags
}

/// Whether any finding should be treated as an error by `--check`.
pub fn has_warnings(diags: &[LintDiagnostic]) -> bool {
    diags.iter().any(|d| d.severity == LintSeverity::Warning)
}

// ─── Rules ────────────────────────────────────────────────────────────────

/// A standalone label containing a connector-like token was probably meant
/// to be an edge.
fn lint_standalone(index: usize, label: &str, diags: &mut Vec<LintDiagnostic>) {
    if let Some(token) = CONNECTOR_LOOKALIKES.iter().find(|t| label.contains(**t)) {
        diags.push(LintDiagnostic {
            line: index,
            message: format!(
                "`{label}` contains `{token}` but is not an edge; it becomes a node named by the whole line. Use `A -> B` or `A -}} B`."
            ),
            severity: LintSeverity::Warning,
            rule: "malformed-edge",
        });
    }
}

/// `A --> B` and `A <-> B` parse as edges from `A -` and `A <`.
fn lint_edge_labels(index: usize, source: &str, diags: &mut Vec<LintDiagnostic>) {
    if source.ends_with(['-', '<', '=']) {
        diags.push(LintDiagnostic {
            line: index,
            message: format!(
                "source label `{source}` ends with a connector character; mistyped arrow?"
            ),
            severity: LintSeverity::Warning,
            rule: "malformed-edge",
        });
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn rules(text: &str) -> Vec<(usize, &'static str)> {
        lint_document(text)
            .into_iter()
            .map(|d| (d.line, d.rule))
            .collect()
    }

    #[test]
    fn lint_malformed_edges() {
        assert_eq!(
            rules("A => B\nA ->\nA --> B\nC -> D"),
            vec![(0, "malformed-edge"), (1, "malformed-edge"), (2, "malformed-edge")]
        );
    }

    #[test]
    fn lint_does_not_change_parse() {
        let text = "A => B";
        assert!(!lint_document(text).is_empty());
        let graph = parse_document(text);
        assert!(graph.node_by_label("A => B").is_some());
    }

    #[test]
    fn lint_duplicate_position() {
        assert_eq!(
            rules("1,1,A\nA\n2,2,A"),
            vec![(2, "duplicate-position")]
        );
    }

    #[test]
    fn lint_duplicate_edge_and_self_loop() {
        assert_eq!(
            rules("A -> B\nA -} B\nA->B\nX -> X"),
            vec![(2, "duplicate-edge"), (3, "self-loop")]
        );
    }

    #[test]
    fn lint_clean_document_no_diags() {
        let diags = lint_document("10,20,Web\nApi\nWeb -> Api\nApi -} Db\n");
        assert!(diags.is_empty(), "clean document should have no diagnostics");
        assert!(!has_warnings(&diags));
    }

    #[test]
    fn info_only_is_not_a_warning() {
        assert!(!has_warnings(&lint_document("X -> X")));
        assert!(has_warnings(&lint_document("X => Y")));
    }
}
