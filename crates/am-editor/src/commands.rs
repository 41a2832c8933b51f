//! Undo/Redo command stack.
//!
//! Every edit is recorded as a text snapshot pair: the document before and
//! after. Undo and redo replay a snapshot through the sync controller as a
//! text edit, so the graph is always rebuilt from text and never patched in
//! place.
//!
//! Drag gestures emit many moves; `begin_batch`/`end_batch` fold them into a
//! single undo step.

use crate::sync::{EditEvent, SyncController};
use am_core::error::EditError;

/// One undoable step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub text_before: String,
    pub text_after: String,
    pub description: String,
}

/// Manages undo/redo stacks with batch grouping for drag gestures.
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Text snapshot captured at the start of a batch.
    batch_snapshot: Option<String>,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
        }
    }

    /// Start a batch group. Edits until the matching `end_batch()` apply
    /// live but undo as one step.
    pub fn begin_batch(&mut self, sync: &SyncController) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(sync.text().to_string());
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and the text
    /// changed, one snapshot command is pushed.
    pub fn end_batch(&mut self, sync: &SyncController, description: &str) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0
            && let Some(before) = self.batch_snapshot.take()
        {
            self.record(before, sync.text(), description);
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Submit an edit through the controller and record it for undo.
    ///
    /// Follow-up edits queued by listeners are part of the same step.
    pub fn execute(
        &mut self,
        sync: &mut SyncController,
        event: EditEvent,
        description: &str,
    ) -> Result<(), EditError> {
        let before = sync.text().to_string();
        let result = sync.submit(event);
        if self.batch_depth == 0 {
            self.record(before, sync.text(), description);
        }
        result
    }

    /// Undo the last command. Returns its description.
    pub fn undo(&mut self, sync: &mut SyncController) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        replay(sync, &cmd.text_before);
        let desc = cmd.description.clone();
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command. Returns its description.
    pub fn redo(&mut self, sync: &mut SyncController) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        replay(sync, &cmd.text_after);
        let desc = cmd.description.clone();
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the step `undo()` would revert.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description.as_str())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
    }

    fn record(&mut self, text_before: String, text_after: &str, description: &str) {
        if text_before == text_after {
            return;
        }
        self.undo_stack.push(Command {
            text_before,
            text_after: text_after.to_string(),
            description: description.to_string(),
        });
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // Clear redo stack on new action
        self.redo_stack.clear();
    }
}

fn replay(sync: &mut SyncController, text: &str) {
    if let Err(err) = sync.set_text(text) {
        // Replacing text can't fail by itself; only listener follow-ups can.
        log::warn!("follow-up edit failed during undo/redo: {err}");
    }
}
