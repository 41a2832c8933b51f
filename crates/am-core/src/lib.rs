pub mod emitter;
pub mod error;
pub mod grammar;
pub mod id;
pub mod layout;
pub mod lint;
pub mod model;
pub mod parser;
pub mod reconcile;

pub use emitter::{canonical_edge_line, emit_document};
pub use error::{EditError, ParseAnchorError};
pub use grammar::{DocumentLine, LineKind, classify};
pub use id::NodeId;
pub use layout::{GridPlacement, Placement, PlacementConfig, StackPlacement, Viewport};
pub use lint::{LintDiagnostic, LintSeverity, lint_document};
pub use model::*;
pub use parser::{parse_document, parse_with};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
