//! A user's editing session: stored document, sync controller and history.

use crate::commands::CommandStack;
use crate::store::{DocumentStore, StoreError, UserId};
use crate::sync::{EditEvent, SyncConfig, SyncController};
use am_core::error::EditError;

/// Undo depth for interactive sessions.
pub const DEFAULT_UNDO_DEPTH: usize = 100;

pub struct EditorSession<S: DocumentStore> {
    store: S,
    user: UserId,
    sync: SyncController,
    history: CommandStack,
    /// Text as of the last successful load or save.
    saved_text: String,
}

impl<S: DocumentStore> EditorSession<S> {
    /// Load the user's document and start a session on it.
    ///
    /// Loading is best-effort: if the store fails, the session starts on an
    /// empty document and the error is handed back next to it.
    pub fn open(store: S, user: UserId, config: SyncConfig) -> (Self, Option<StoreError>) {
        let (text, error) = match store.load(&user) {
            Ok(text) => (text, None),
            Err(err) => {
                log::warn!("failed to load document for {user}: {err}");
                (String::new(), Some(err))
            }
        };
        let session = Self {
            store,
            user,
            sync: SyncController::from_text(&text, config),
            history: CommandStack::new(DEFAULT_UNDO_DEPTH),
            saved_text: text,
        };
        (session, error)
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut SyncController {
        &mut self.sync
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    pub fn text(&self) -> &str {
        self.sync.text()
    }

    /// Whether the text differs from what was last loaded or saved.
    pub fn is_dirty(&self) -> bool {
        self.sync.text() != self.saved_text
    }

    /// Apply an edit and record it for undo.
    pub fn apply(&mut self, event: EditEvent, description: &str) -> Result<(), EditError> {
        self.history.execute(&mut self.sync, event, description)
    }

    pub fn begin_batch(&mut self) {
        self.history.begin_batch(&self.sync);
    }

    pub fn end_batch(&mut self, description: &str) {
        self.history.end_batch(&self.sync, description);
    }

    pub fn undo(&mut self) -> Option<String> {
        self.history.undo(&mut self.sync)
    }

    pub fn redo(&mut self) -> Option<String> {
        self.history.redo(&mut self.sync)
    }

    /// Write the current text to the store. On failure the text is kept and
    /// the session stays dirty.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let text = self.sync.text();
        match self.store.save(&self.user, text) {
            Ok(()) => {
                self.saved_text = text.to_string();
                Ok(())
            }
            Err(err) => {
                log::warn!("failed to save document for {}: {err}", self.user);
                Err(err)
            }
        }
    }

    /// Save only when there is something new. Returns whether a save ran.
    pub fn save_if_dirty(&mut self) -> Result<bool, StoreError> {
        if !self.is_dirty() {
            return Ok(false);
        }
        self.save().map(|()| true)
    }
}
