use super::style::{ConnectionStyle, NodeStyle};
use crate::geom::Point;
use crate::ids::{ConnectionId, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub text: String,
    pub position: Point,
    pub is_center: bool,
    pub style: NodeStyle,
    #[serde(default)]
    pub note: String,
}

impl Node {
    pub fn new(text: impl Into<String>, position: Point, is_center: bool) -> Self {
        Self {
            id: NodeId::new(),
            text: text.into(),
            position,
            is_center,
            style: NodeStyle::default_for(is_center),
            note: String::new(),
        }
    }

    pub fn center(text: impl Into<String>, position: Point) -> Self {
        Self::new(text, position, true)
    }
}

/// A directed, labeled edge from a parent node to one of its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    #[serde(default)]
    pub reason: String,
    pub style: ConnectionStyle,
}

impl Connection {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            id: ConnectionId::new(),
            from_node_id: from,
            to_node_id: to,
            reason: String::new(),
            style: ConnectionStyle::default(),
        }
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.from_node_id == id || self.to_node_id == id
    }
}
