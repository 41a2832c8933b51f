//! Error types for the edit layer.
//!
//! Malformed *text* is never an error: every line means something. Errors
//! only come from callers asking to edit ids the current graph doesn't have.

use crate::model::EdgeId;

/// A contract violation by the edit layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    #[error("unknown edge `{0}`")]
    UnknownEdge(String),
}

impl EditError {
    pub fn unknown_edge(id: EdgeId) -> Self {
        EditError::UnknownEdge(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown anchor `{0}` (expected left, right, top or bottom)")]
pub struct ParseAnchorError(pub String);
