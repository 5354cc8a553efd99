//! Structural edits over a [`Graph`].
//!
//! Every edit validates its target first, then records an undo snapshot, then mutates. A failed
//! edit leaves both the graph and the history untouched. [`MutationEngine::move_node`] is the
//! exception: it never snapshots, so callers draw the undo boundary around a whole drag.

use crate::config::EditorConfig;
use crate::geom::{Point, vector};
use crate::history::HistoryManager;
use crate::ids::{ConnectionId, NodeId};
use crate::layout::LayoutEngine;
use crate::model::{Connection, ConnectionStyle, Graph, Node, NodeStyle};
use crate::styles::{StyleSelection, unify_style};
use crate::{Error, Result};
use indexmap::IndexSet;

#[derive(Debug, Clone)]
pub struct MutationEngine {
    graph: Graph,
    history: HistoryManager,
    layout: LayoutEngine,
}

impl MutationEngine {
    pub fn new(graph: Graph, config: &EditorConfig) -> Self {
        Self::from_parts(
            graph,
            HistoryManager::new(config.history_capacity),
            LayoutEngine::new(config.layout.clone()),
        )
    }

    pub fn from_parts(graph: Graph, history: HistoryManager, layout: LayoutEngine) -> Self {
        Self {
            graph,
            history,
            layout,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn into_parts(self) -> (Graph, HistoryManager) {
        (self.graph, self.history)
    }

    /// Records the current graph as an undo point.
    pub fn snapshot(&mut self) {
        self.history.snapshot(&self.graph);
    }

    /// Adds an empty-or-labeled child under `parent`, placed by the layout engine.
    pub fn add_child_node(&mut self, parent: NodeId, text: impl Into<String>) -> Result<NodeId> {
        let position = self
            .layout
            .place_child(&self.graph, parent)
            .ok_or(Error::ParentNotFound { id: parent })?;

        self.snapshot();
        let node = Node::new(text, position, false);
        let id = node.id;
        let connection = Connection::new(parent, id);
        tracing::debug!(node = %id, parent = %parent, x = position.x, y = position.y, "added node");
        self.graph.push_child(node, connection);
        Ok(id)
    }

    /// Removes `id` and everything reachable from it. Returns the removed node ids.
    pub fn delete_node(&mut self, id: NodeId) -> Result<IndexSet<NodeId>> {
        let node = self.graph.node(id).ok_or(Error::NodeNotFound { id })?;
        if node.is_center {
            return Err(Error::CannotDeleteCenter);
        }

        let doomed = self.graph.subtree_of(id);
        self.snapshot();
        let removed_connections = self.graph.remove_nodes(&doomed);
        tracing::debug!(
            node = %id,
            nodes = doomed.len(),
            connections = removed_connections,
            "deleted subtree"
        );
        Ok(doomed)
    }

    /// Sets a node's label. Renaming the center also renames the map.
    pub fn update_node_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        self.require_node(id)?;
        self.snapshot();
        self.set_text_unrecorded(id, text.into());
        Ok(())
    }

    pub fn update_node_note(&mut self, id: NodeId, note: impl Into<String>) -> Result<()> {
        self.require_node(id)?;
        self.snapshot();
        if let Some(node) = self.graph.node_mut(id) {
            node.note = note.into();
        }
        Ok(())
    }

    pub fn update_connection_reason(
        &mut self,
        id: ConnectionId,
        reason: impl Into<String>,
    ) -> Result<()> {
        self.require_connection(id)?;
        self.snapshot();
        if let Some(connection) = self.graph.connection_mut(id) {
            connection.reason = reason.into();
        }
        Ok(())
    }

    pub fn set_node_style(&mut self, id: NodeId, style: NodeStyle) -> Result<()> {
        self.require_node(id)?;
        self.snapshot();
        if let Some(node) = self.graph.node_mut(id) {
            node.style = style;
        }
        Ok(())
    }

    pub fn set_connection_style(&mut self, id: ConnectionId, style: ConnectionStyle) -> Result<()> {
        self.require_connection(id)?;
        self.snapshot();
        if let Some(connection) = self.graph.connection_mut(id) {
            connection.style = style;
        }
        Ok(())
    }

    /// Applies one style to every node and connection, as a single undoable step.
    pub fn unify_style(&mut self, selection: &StyleSelection) {
        self.snapshot();
        unify_style(
            &mut self.graph,
            &selection.node_style,
            &selection.connection_style,
        );
    }

    /// Shifts a node by `(dx, dy)`. Does not snapshot.
    pub fn move_node(&mut self, id: NodeId, dx: f64, dy: f64) -> Result<Point> {
        let node = self.graph.node_mut(id).ok_or(Error::NodeNotFound { id })?;
        node.position += vector(dx, dy);
        Ok(node.position)
    }

    /// Replaces the whole graph with a lone center node.
    pub fn reset_graph(&mut self, center_text: impl Into<String>, center_position: Point) {
        self.snapshot();
        self.graph = Graph::new(center_text, center_position);
        tracing::debug!(center = ?self.graph.center_id(), "reset graph");
    }

    /// Restores the most recent snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.graph) {
            Some(previous) => {
                self.graph = previous;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.graph) {
            Some(next) => {
                self.graph = next;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_text_unrecorded(&mut self, id: NodeId, text: String) {
        let Some(node) = self.graph.node_mut(id) else {
            return;
        };
        let is_center = node.is_center;
        if is_center {
            node.text.clone_from(&text);
            self.graph.center_text = text;
        } else {
            node.text = text;
        }
    }

    pub(crate) fn push_snapshot_of(&mut self, graph: &Graph) {
        self.history.snapshot(graph);
    }

    fn require_node(&self, id: NodeId) -> Result<()> {
        if self.graph.contains_node(id) {
            Ok(())
        } else {
            Err(Error::NodeNotFound { id })
        }
    }

    fn require_connection(&self, id: ConnectionId) -> Result<()> {
        if self.graph.connection(id).is_some() {
            Ok(())
        } else {
            Err(Error::ConnectionNotFound { id })
        }
    }
}
