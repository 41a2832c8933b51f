//! WASM bridge for AppMap. Exposes the sync controller to the diagram
//! webview.
//!
//! Compiled via `wasm-pack build --target web`. The webview owns rendering
//! and gesture capture; it calls in here with finished gestures and reads
//! back text, graph JSON and diagnostics.

use am_core::error::EditError;
use am_core::id::NodeId;
use am_core::model::{Anchor, Position};
use am_editor::commands::CommandStack;
use am_editor::sync::{EditEvent, SyncConfig, SyncController};
use wasm_bindgen::prelude::*;

/// Undo depth for the canvas.
const UNDO_DEPTH: usize = 200;

/// The main WASM-facing canvas controller.
///
/// Holds the sync controller and command stack. All interaction from the
/// webview JS goes through this struct.
#[wasm_bindgen]
pub struct AmCanvas {
    sync: SyncController,
    commands: CommandStack,
    /// Node being dragged, for the undo description.
    dragging: Option<NodeId>,
    /// Text changed by a canvas edit and not yet read back by the editor.
    text_dirty: bool,
}

impl Default for AmCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl AmCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self {
            sync: SyncController::new(SyncConfig::default()),
            commands: CommandStack::new(UNDO_DEPTH),
            dragging: None,
            text_dirty: false,
        }
    }

    // ─── Text side ───────────────────────────────────────────────────────

    /// Replace the document with the editor's text.
    pub fn set_text(&mut self, text: &str) -> bool {
        let ok = accepted(self.sync.set_text(text));
        // The editor already has this text.
        self.text_dirty = false;
        ok
    }

    pub fn get_text(&mut self) -> String {
        self.text_dirty = false;
        self.sync.text().to_string()
    }

    /// Whether a canvas edit changed the text since the last `get_text`.
    pub fn has_pending_text_change(&self) -> bool {
        self.text_dirty
    }

    // ─── Graph side ──────────────────────────────────────────────────────

    /// The graph as `{"nodes": [...], "edges": [...]}`.
    pub fn get_graph_json(&self) -> String {
        serde_json::to_string(self.sync.graph()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Strict-mode lint findings as a JSON array (empty when strict is off).
    pub fn get_diagnostics_json(&self) -> String {
        serde_json::to_string(self.sync.diagnostics()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Drop a node at `(x, y)`. Coordinates are rounded to whole units.
    pub fn move_node(&mut self, node_id: &str, x: f64, y: f64) -> bool {
        let Some(id) = self.known_node(node_id) else {
            return false;
        };
        let to = Position::new(x.round() as i64, y.round() as i64);
        self.edit(EditEvent::MoveNode { id, to }, &format!("Move {node_id}"))
    }

    /// Connect two nodes. Anchors are `top`, `right`, `bottom` or `left`.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_anchor: &str,
        target_anchor: &str,
    ) -> bool {
        let (Some(source_id), Some(target_id)) = (self.known_node(source), self.known_node(target))
        else {
            return false;
        };
        let anchors = source_anchor
            .parse::<Anchor>()
            .and_then(|s| target_anchor.parse::<Anchor>().map(|t| (s, t)));
        let (source_anchor, target_anchor) = match anchors {
            Ok(pair) => pair,
            Err(err) => {
                log::warn!("connect rejected: {err}");
                return false;
            }
        };
        self.edit(
            EditEvent::Connect {
                source: source_id,
                target: target_id,
                source_anchor,
                target_anchor,
            },
            &format!("Connect {source} → {target}"),
        )
    }

    /// Delete an edge by the id found in the graph JSON (`A->B#0`).
    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        let Some(id) = self.sync.graph().find_edge(edge_id) else {
            return accepted(Err(EditError::UnknownEdge(edge_id.to_string())));
        };
        self.edit(EditEvent::RemoveEdge { id }, &format!("Delete {edge_id}"))
    }

    // ─── Drag gestures ───────────────────────────────────────────────────

    /// Start a drag: moves until `end_drag` undo as one step.
    pub fn begin_drag(&mut self, node_id: &str) {
        self.dragging = NodeId::get(node_id);
        self.commands.begin_batch(&self.sync);
    }

    pub fn end_drag(&mut self) {
        let description = match self.dragging.take() {
            Some(id) => format!("Move {id}"),
            None => "Move".to_string(),
        };
        self.commands.end_batch(&self.sync, &description);
    }

    // ─── Undo / Redo ─────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let undone = self.commands.undo(&mut self.sync).is_some();
        self.text_dirty |= undone;
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.commands.redo(&mut self.sync).is_some();
        self.text_dirty |= redone;
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    // ─── Settings ────────────────────────────────────────────────────────

    pub fn set_strict(&mut self, strict: bool) {
        self.sync.set_strict(strict);
    }
}

impl AmCanvas {
    pub fn controller(&self) -> &SyncController {
        &self.sync
    }

    fn known_node(&self, label: &str) -> Option<NodeId> {
        let id = NodeId::get(label);
        if id.is_none() {
            log::warn!("edit rejected: {}", EditError::UnknownNode(label.to_string()));
        }
        id
    }

    fn edit(&mut self, event: EditEvent, description: &str) -> bool {
        let before = self.sync.text().to_string();
        let ok = accepted(self.commands.execute(&mut self.sync, event, description));
        self.text_dirty |= self.sync.text() != before;
        ok
    }
}

fn accepted(result: Result<(), EditError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log::warn!("edit rejected: {err}");
            false
        }
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("AppMap WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
