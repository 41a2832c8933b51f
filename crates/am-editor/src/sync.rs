//! Bidirectional sync controller: graph edits ↔ AppMap text.
//!
//! The text is the single source of truth. Two directions feed it:
//!
//! - **Text → Graph**: the user types; the controller enters `TextDriven`,
//!   re-parses the whole document into a fresh `Graph`, and returns to
//!   `Idle`.
//! - **Graph → Text**: the user drags, connects or deletes on the canvas; the
//!   controller enters `GraphDriven`, rewrites only the affected line of
//!   text, then runs exactly one forward parse so origin lines stay
//!   authoritative, and returns to `Idle`.
//!
//! Listeners hear about every completed translation while the controller is
//! still in the driving state. Edits they submit in response go into a queue
//! and run after the current cycle finishes. A translation never triggers
//! the opposite translation recursively.

use am_core::error::EditError;
use am_core::id::NodeId;
use am_core::layout::PlacementConfig;
use am_core::lint::{LintDiagnostic, lint_document};
use am_core::model::{Anchor, EdgeId, Graph, Position};
use am_core::parser::parse_with;
use am_core::reconcile;
use std::collections::VecDeque;

/// Which translation, if any, is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    /// Forward translation after a text edit.
    TextDriven,
    /// Reverse translation after a graph edit, then one forward translation.
    GraphDriven,
}

/// An edit arriving at the controller, from either side.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// The text editor replaced the document.
    ReplaceText(String),
    /// A node was dropped at a new position.
    MoveNode { id: NodeId, to: Position },
    /// Two nodes were connected by a gesture.
    Connect {
        source: NodeId,
        target: NodeId,
        source_anchor: Anchor,
        target_anchor: Anchor,
    },
    /// An edge was deleted.
    RemoveEdge { id: EdgeId },
}

impl EditEvent {
    pub fn is_text_edit(&self) -> bool {
        matches!(self, EditEvent::ReplaceText(_))
    }
}

/// Controller settings.
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Lint every cycle and log findings (output is never changed).
    pub strict: bool,
    /// Placement policy built fresh for every parse.
    pub placement: PlacementConfig,
}

/// Edits waiting for the current cycle to finish.
#[derive(Debug, Default)]
pub struct EditQueue {
    pending: VecDeque<EditEvent>,
}

impl EditQueue {
    pub fn push(&mut self, event: EditEvent) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn pop(&mut self) -> Option<EditEvent> {
        self.pending.pop_front()
    }
}

/// What a listener sees after a translation completes.
#[derive(Debug, Clone, Copy)]
pub struct SyncCycle<'a> {
    /// The state the cycle ran in (never `Idle`).
    pub state: SyncState,
    pub text: &'a str,
    pub graph: &'a Graph,
    /// Strict-mode findings; empty when strict mode is off.
    pub diagnostics: &'a [LintDiagnostic],
}

/// Observer of completed cycles, typically the rendering layer.
pub trait SyncListener {
    fn synced(&mut self, cycle: &SyncCycle<'_>, queue: &mut EditQueue);
}

/// The sync controller holds the authoritative text, the graph parsed from
/// it, and the state machine arbitrating between the two directions.
pub struct SyncController {
    text: String,
    graph: Graph,
    state: SyncState,
    queue: EditQueue,
    config: SyncConfig,
    diagnostics: Vec<LintDiagnostic>,
    listeners: Vec<Box<dyn SyncListener>>,
    /// Number of completed forward translations.
    revision: u64,
}

impl SyncController {
    /// Create a controller with an empty document.
    pub fn new(config: SyncConfig) -> Self {
        Self::from_text("", config)
    }

    /// Create a controller from AppMap text.
    pub fn from_text(text: &str, config: SyncConfig) -> Self {
        let mut controller = Self {
            text: text.to_string(),
            graph: Graph::new(),
            state: SyncState::Idle,
            queue: EditQueue::default(),
            config,
            diagnostics: Vec::new(),
            listeners: Vec::new(),
            revision: 0,
        };
        controller.forward();
        controller
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn diagnostics(&self) -> &[LintDiagnostic] {
        &self.diagnostics
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Turn strict mode on or off. Takes effect on the next cycle.
    pub fn set_strict(&mut self, strict: bool) {
        self.config.strict = strict;
        if !strict {
            self.diagnostics.clear();
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn SyncListener>) {
        self.listeners.push(listener);
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Submit an edit. When idle, the edit runs immediately along with any
    /// follow-ups listeners queue; otherwise it waits its turn.
    ///
    /// Returns the first contract violation among the edits that ran. A
    /// rejected edit leaves text and graph unchanged.
    pub fn submit(&mut self, event: EditEvent) -> Result<(), EditError> {
        self.queue.push(event);
        if self.state != SyncState::Idle {
            log::debug!(
                "sync busy ({:?}); {} edit(s) queued",
                self.state,
                self.queue.len()
            );
            return Ok(());
        }
        self.drain()
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        self.submit(EditEvent::ReplaceText(text.into()))
    }

    pub fn move_node(&mut self, id: NodeId, to: Position) -> Result<(), EditError> {
        self.submit(EditEvent::MoveNode { id, to })
    }

    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        source_anchor: Anchor,
        target_anchor: Anchor,
    ) -> Result<(), EditError> {
        self.submit(EditEvent::Connect {
            source,
            target,
            source_anchor,
            target_anchor,
        })
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Result<(), EditError> {
        self.submit(EditEvent::RemoveEdge { id })
    }

    // ─── State machine ───────────────────────────────────────────────────

    fn drain(&mut self) -> Result<(), EditError> {
        let mut first_error = None;
        while let Some(event) = self.queue.pop() {
            if let Err(err) = self.run_cycle(event) {
                log::warn!("edit rejected: {err}");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn run_cycle(&mut self, event: EditEvent) -> Result<(), EditError> {
        let driving = if event.is_text_edit() {
            SyncState::TextDriven
        } else {
            SyncState::GraphDriven
        };
        self.transition(driving);
        let result = self.translate(event);
        if result.is_ok() {
            self.notify();
        }
        self.transition(SyncState::Idle);
        result
    }

    fn transition(&mut self, to: SyncState) {
        log::debug!("sync {:?} → {:?}", self.state, to);
        self.state = to;
    }

    fn translate(&mut self, event: EditEvent) -> Result<(), EditError> {
        let text = match event {
            EditEvent::ReplaceText(text) => text,
            EditEvent::MoveNode { id, to } => {
                reconcile::move_node_in(&self.text, &self.graph, id.as_str(), to)?
            }
            EditEvent::Connect {
                source,
                target,
                source_anchor,
                target_anchor,
            } => reconcile::connect_in(
                &self.text,
                &self.graph,
                source.as_str(),
                target.as_str(),
                source_anchor,
                target_anchor,
            )?,
            EditEvent::RemoveEdge { id } => {
                reconcile::remove_edge_in(&self.text, &self.graph, id)?
            }
        };
        self.text = text;
        self.forward();
        Ok(())
    }

    /// Text → Graph. Always a full re-parse.
    fn forward(&mut self) {
        let mut placement = self.config.placement.build();
        self.graph = parse_with(&self.text, placement.as_mut());
        self.revision += 1;

        if self.config.strict {
            self.diagnostics = lint_document(&self.text);
            for diag in &self.diagnostics {
                log::warn!("line {}: [{}] {}", diag.line + 1, diag.rule, diag.message);
            }
        }
    }

    fn notify(&mut self) {
        let cycle = SyncCycle {
            state: self.state,
            text: &self.text,
            graph: &self.graph,
            diagnostics: &self.diagnostics,
        };
        for listener in &mut self.listeners {
            listener.synced(&cycle, &mut self.queue);
        }
    }
}
