//! Bulk styling and the three persisted favorite style presets.

use crate::ids::FavoriteId;
use crate::model::{ConnectionStyle, Graph, NodeStyle, STYLE_TOLERANCE};
use crate::store::{FAVORITES_KEY, KeyValueStore, load_json, save_json};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};


pub const FAVORITE_SLOT_COUNT: usize = 3;

/// The style a caller is about to apply. Picking a favorite only fills this in; the graph is
/// touched when the selection is passed to [`unify_style`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSelection {
    pub node_style: NodeStyle,
    pub connection_style: ConnectionStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStyle {
    pub id: FavoriteId,
    pub name: String,
    pub node_style: NodeStyle,
    pub connection_style: ConnectionStyle,
}

impl FavoriteStyle {
    pub fn placeholder(slot: usize) -> Self {
        Self {
            id: FavoriteId::new(),
            name: format!("Style {}", slot + 1),
            node_style: NodeStyle::default(),
            connection_style: ConnectionStyle::default(),
        }
    }

    /// True once either style differs from the library defaults by more than the tolerance.
    pub fn is_configured(&self) -> bool {
        !self
            .node_style
            .approx_eq(&NodeStyle::default(), STYLE_TOLERANCE)
            || !self
                .connection_style
                .approx_eq(&ConnectionStyle::default(), STYLE_TOLERANCE)
    }

    pub fn selection(&self) -> StyleSelection {
        StyleSelection {
            node_style: self.node_style,
            connection_style: self.connection_style,
        }
    }
}

/// Overwrites the style of every node and every connection in `graph`.
pub fn unify_style(graph: &mut Graph, node_style: &NodeStyle, connection_style: &ConnectionStyle) {
    for node in graph.nodes_mut() {
        node.style = *node_style;
    }
    for connection in graph.connections_mut() {
        connection.style = *connection_style;
    }
    tracing::debug!(
        nodes = graph.node_count(),
        connections = graph.connections().len(),
        "unified style"
    );
}

/// Favorite style slots backed by a [`KeyValueStore`].
#[derive(Debug)]
pub struct StyleEngine<S> {
    store: S,
    slots: Vec<FavoriteStyle>,
}

impl<S: KeyValueStore> StyleEngine<S> {
    /// Loads the slots from `store`, creating placeholders for any that are missing.
    pub fn load(mut store: S) -> Result<Self> {
        let stored: Vec<FavoriteStyle> = load_json(&store, FAVORITES_KEY)?.unwrap_or_default();
        let complete = stored.len() == FAVORITE_SLOT_COUNT;

        let mut slots: Vec<FavoriteStyle> =
            stored.into_iter().take(FAVORITE_SLOT_COUNT).collect();
        while slots.len() < FAVORITE_SLOT_COUNT {
            slots.push(FavoriteStyle::placeholder(slots.len()));
        }
        if !complete {
            save_json(&mut store, FAVORITES_KEY, &slots)?;
        }
        Ok(Self { store, slots })
    }

    pub fn slots(&self) -> &[FavoriteStyle] {
        &self.slots
    }

    pub fn get_style(&self, slot: usize) -> Option<&FavoriteStyle> {
        self.slots.get(slot)
    }

    pub fn is_slot_configured(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(FavoriteStyle::is_configured)
    }

    pub fn save_to_slot(&mut self, slot: usize, style: StyleSelection) -> Result<()> {
        let favorite = self.slot_mut(slot)?;
        favorite.node_style = style.node_style;
        favorite.connection_style = style.connection_style;
        tracing::debug!(slot, "saved favorite style");
        self.persist()
    }

    pub fn rename_slot(&mut self, slot: usize, name: impl Into<String>) -> Result<()> {
        self.slot_mut(slot)?.name = name.into();
        self.persist()
    }

    pub fn reset_slot(&mut self, slot: usize) -> Result<()> {
        *self.slot_mut(slot)? = FavoriteStyle::placeholder(slot);
        self.persist()
    }

    /// Copies a favorite into a working selection.
    pub fn apply_favorite(&self, slot: usize) -> Result<StyleSelection> {
        self.slots
            .get(slot)
            .map(FavoriteStyle::selection)
            .ok_or(Error::InvalidStyleSlot { index: slot })
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut FavoriteStyle> {
        self.slots
            .get_mut(slot)
            .ok_or(Error::InvalidStyleSlot { index: slot })
    }

    fn persist(&mut self) -> Result<()> {
        save_json(&mut self.store, FAVORITES_KEY, &self.slots)?;
        Ok(())
    }
}
