//! Bounded undo/redo history of whole-graph snapshots.
//!
//! A snapshot is taken once per user-intent boundary (before a structural edit, before a drag
//! begins, when a text edit session ends), never per drag frame or keystroke. Snapshots are
//! owned copies; later edits to the live graph cannot reach them.

use crate::model::Graph;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[cfg(test)]
mod tests;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryManager {
    capacity: usize,
    /// Pre-edit states, oldest first.
    undo: VecDeque<Graph>,
    /// States undone away from, most recently undone last.
    redo: Vec<Graph>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the bound, dropping the oldest snapshots that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    /// Records `graph` as the state to return to on the next undo.
    ///
    /// Abandons any redo future. When full, the oldest snapshot is dropped.
    pub fn snapshot(&mut self, graph: &Graph) {
        self.redo.clear();
        self.undo.push_back(graph.clone());
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        tracing::trace!(depth = self.undo.len(), "history snapshot");
    }

    /// Returns the most recent snapshot, remembering `current` for [`HistoryManager::redo`].
    pub fn undo(&mut self, current: &Graph) -> Option<Graph> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current.clone());
        Some(previous)
    }

    pub fn redo(&mut self, current: &Graph) -> Option<Graph> {
        let next = self.redo.pop()?;
        self.undo.push_back(current.clone());
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
