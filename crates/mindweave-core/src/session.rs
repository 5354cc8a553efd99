//! The editing session: one authoritative graph, its history, and change notification.
//!
//! Both the outline and the canvas views are projections of [`EditingSession::graph`]; they
//! subscribe for [`GraphChange`] events and re-render, and never hold copies of their own.
//!
//! Continuous gestures are split into explicit phases so that many intermediate updates collapse
//! into one undoable step:
//! - drag: `begin_drag` records a snapshot, `update_drag` moves freely, `end_drag` keeps the
//!   final position;
//! - text edit: `begin_text_edit` remembers the pre-edit graph, `update_text_edit` changes the
//!   label per keystroke, `end_text_edit` records one snapshot if the label actually changed.

use crate::config::EditorConfig;
use crate::geom::Point;
use crate::history::HistoryManager;
use crate::ids::{ConnectionId, NodeId};
use crate::layout::LayoutEngine;
use crate::model::{ConnectionStyle, Graph, NodeStyle};
use crate::mutation::MutationEngine;
use crate::outline::{OutlineRow, outline};
use crate::styles::StyleSelection;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum GraphChange {
    NodeAdded { id: NodeId, parent: NodeId },
    NodesRemoved { ids: Vec<NodeId> },
    NodeUpdated { id: NodeId },
    ConnectionUpdated { id: ConnectionId },
    NodeMoved { id: NodeId, position: Point },
    StyleUnified,
    Reset,
    /// The whole graph was replaced by undo or redo.
    Restored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Graph, &GraphChange)>;

/// Serializable form of a session, for resuming after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub graph: Graph,
    pub history: HistoryManager,
}

#[derive(Debug)]
struct TextEdit {
    node: NodeId,
    before: Graph,
    original: String,
}

pub struct EditingSession {
    engine: MutationEngine,
    config: EditorConfig,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    drag: Option<NodeId>,
    text_edit: Option<TextEdit>,
}

impl std::fmt::Debug for EditingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditingSession")
            .field("engine", &self.engine)
            .field("observers", &self.observers.len())
            .field("drag", &self.drag)
            .field("text_edit", &self.text_edit)
            .finish()
    }
}

impl EditingSession {
    /// Starts a brand-new map with a lone center node at the configured default position.
    pub fn new(center_text: impl Into<String>, config: EditorConfig) -> Self {
        let graph = Graph::new(center_text, config.default_center);
        Self::with_graph(graph, config)
    }

    /// Opens an existing graph (e.g. a local draft) with empty history.
    ///
    /// Every public way of obtaining a [`Graph`] (constructors and deserialization) validates it.
    pub fn with_graph(graph: Graph, config: EditorConfig) -> Self {
        let engine = MutationEngine::new(graph, &config);
        Self::from_engine(engine, config)
    }

    /// Resumes a saved session after checking the graph invariants.
    ///
    /// The configured history capacity wins over the one saved with the state.
    pub fn restore(state: SessionState, config: EditorConfig) -> Result<Self> {
        state.graph.validate()?;
        let mut history = state.history;
        history.set_capacity(config.history_capacity);
        let engine = MutationEngine::from_parts(
            state.graph,
            history,
            LayoutEngine::new(config.layout.clone()),
        );
        Ok(Self::from_engine(engine, config))
    }

    fn from_engine(engine: MutationEngine, config: EditorConfig) -> Self {
        Self {
            engine,
            config,
            observers: Vec::new(),
            next_subscription: 0,
            drag: None,
            text_edit: None,
        }
    }

    pub fn to_state(&self) -> SessionState {
        let mut state = SessionState {
            graph: self.engine.graph().clone(),
            history: self.engine.history().clone(),
        };
        if let Some(edit) = &self.text_edit {
            if text_of(&state.graph, edit.node) != Some(edit.original.as_str()) {
                state.history.snapshot(&edit.before);
            }
        }
        state
    }

    pub fn graph(&self) -> &Graph {
        self.engine.graph()
    }

    pub fn history(&self) -> &HistoryManager {
        self.engine.history()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn outline(&self) -> Vec<OutlineRow> {
        outline(self.engine.graph())
    }

    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&Graph, &GraphChange) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn add_child_node(&mut self, parent: NodeId, text: impl Into<String>) -> Result<NodeId> {
        self.settle_gestures();
        let id = self.engine.add_child_node(parent, text)?;
        self.notify(GraphChange::NodeAdded { id, parent });
        Ok(id)
    }

    pub fn delete_node(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        self.settle_gestures();
        let removed: Vec<NodeId> = self.engine.delete_node(id)?.into_iter().collect();
        self.notify(GraphChange::NodesRemoved {
            ids: removed.clone(),
        });
        Ok(removed)
    }

    pub fn update_node_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        self.settle_gestures();
        self.engine.update_node_text(id, text)?;
        self.notify(GraphChange::NodeUpdated { id });
        Ok(())
    }

    pub fn update_node_note(&mut self, id: NodeId, note: impl Into<String>) -> Result<()> {
        self.settle_gestures();
        self.engine.update_node_note(id, note)?;
        self.notify(GraphChange::NodeUpdated { id });
        Ok(())
    }

    pub fn update_connection_reason(
        &mut self,
        id: ConnectionId,
        reason: impl Into<String>,
    ) -> Result<()> {
        self.settle_gestures();
        self.engine.update_connection_reason(id, reason)?;
        self.notify(GraphChange::ConnectionUpdated { id });
        Ok(())
    }

    pub fn set_node_style(&mut self, id: NodeId, style: NodeStyle) -> Result<()> {
        self.settle_gestures();
        self.engine.set_node_style(id, style)?;
        self.notify(GraphChange::NodeUpdated { id });
        Ok(())
    }

    pub fn set_connection_style(&mut self, id: ConnectionId, style: ConnectionStyle) -> Result<()> {
        self.settle_gestures();
        self.engine.set_connection_style(id, style)?;
        self.notify(GraphChange::ConnectionUpdated { id });
        Ok(())
    }

    pub fn unify_style(&mut self, selection: &StyleSelection) {
        self.settle_gestures();
        self.engine.unify_style(selection);
        self.notify(GraphChange::StyleUnified);
    }

    /// Replaces the map with a lone center node at the configured default position.
    pub fn reset_graph(&mut self, center_text: impl Into<String>) {
        self.settle_gestures();
        let position = self.config.default_center;
        self.engine.reset_graph(center_text, position);
        self.notify(GraphChange::Reset);
    }

    /// Moves a node as one undoable step (a drag with a single update).
    pub fn move_node(&mut self, id: NodeId, dx: f64, dy: f64) -> Result<Point> {
        self.begin_drag(id)?;
        let position = self.update_drag(dx, dy)?;
        self.end_drag();
        position.ok_or(Error::NodeNotFound { id })
    }

    pub fn begin_drag(&mut self, id: NodeId) -> Result<()> {
        self.settle_gestures();
        if !self.engine.graph().contains_node(id) {
            return Err(Error::NodeNotFound { id });
        }
        self.engine.snapshot();
        self.drag = Some(id);
        Ok(())
    }

    /// Moves the dragged node. Returns `None` when no drag is in progress.
    pub fn update_drag(&mut self, dx: f64, dy: f64) -> Result<Option<Point>> {
        let Some(id) = self.drag else {
            return Ok(None);
        };
        let position = self.engine.move_node(id, dx, dy)?;
        self.notify(GraphChange::NodeMoved { id, position });
        Ok(Some(position))
    }

    pub fn end_drag(&mut self) -> Option<NodeId> {
        self.drag.take()
    }

    pub fn dragging(&self) -> Option<NodeId> {
        self.drag
    }

    pub fn begin_text_edit(&mut self, id: NodeId) -> Result<()> {
        self.settle_gestures();
        let original = text_of(self.engine.graph(), id)
            .ok_or(Error::NodeNotFound { id })?
            .to_string();
        self.text_edit = Some(TextEdit {
            node: id,
            before: self.engine.graph().clone(),
            original,
        });
        Ok(())
    }

    /// Changes the label being edited without recording history.
    pub fn update_text_edit(&mut self, text: impl Into<String>) -> bool {
        let Some(id) = self.text_edit.as_ref().map(|e| e.node) else {
            return false;
        };
        self.engine.set_text_unrecorded(id, text.into());
        self.notify(GraphChange::NodeUpdated { id });
        true
    }

    /// Finishes the edit; returns whether an undo step was recorded.
    pub fn end_text_edit(&mut self) -> bool {
        let Some(edit) = self.text_edit.take() else {
            return false;
        };
        let changed = text_of(self.engine.graph(), edit.node) != Some(edit.original.as_str());
        if changed {
            self.engine.push_snapshot_of(&edit.before);
        }
        changed
    }

    pub fn undo(&mut self) -> bool {
        self.settle_gestures();
        let restored = self.engine.undo();
        if restored {
            self.notify(GraphChange::Restored);
        }
        restored
    }

    pub fn redo(&mut self) -> bool {
        self.settle_gestures();
        let restored = self.engine.redo();
        if restored {
            self.notify(GraphChange::Restored);
        }
        restored
    }

    fn settle_gestures(&mut self) {
        self.drag = None;
        self.end_text_edit();
    }

    fn notify(&mut self, change: GraphChange) {
        let graph = self.engine.graph();
        for (_, observer) in &mut self.observers {
            observer(graph, &change);
        }
    }
}

fn text_of(graph: &Graph, id: NodeId) -> Option<&str> {
    graph.node(id).map(|n| n.text.as_str())
}
