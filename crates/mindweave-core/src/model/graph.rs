use super::node::{Connection, Node};
use crate::geom::Point;
use crate::ids::{ConnectionId, NodeId};
use crate::{Error, Result};
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// A mind map: one center node and a tree of connected child nodes.
///
/// This is also the unit of undo history; cloning a `Graph` yields a fully independent copy.
/// Node order is insertion order and is significant for index display.
///
/// Deserializing runs [`Graph::validate`], so a graph read back from storage always holds the
/// tree invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "GraphRepr")]
pub struct Graph {
    pub center_text: String,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphRepr {
    center_text: String,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl TryFrom<GraphRepr> for Graph {
    type Error = Error;

    fn try_from(repr: GraphRepr) -> Result<Self> {
        Self::from_parts(repr.center_text, repr.nodes, repr.connections)
    }
}

impl Graph {
    /// Creates a graph holding a single center node.
    pub fn new(center_text: impl Into<String>, center_position: Point) -> Self {
        let center_text = center_text.into();
        Self {
            nodes: vec![Node::center(center_text.clone(), center_position)],
            center_text,
            connections: Vec::new(),
        }
    }

    /// Assembles a graph from parts and checks every structural invariant.
    pub fn from_parts(
        center_text: impl Into<String>,
        nodes: Vec<Node>,
        connections: Vec<Connection>,
    ) -> Result<Self> {
        let graph = Self {
            center_text: center_text.into(),
            nodes,
            connections,
        };
        graph.validate()?;
        Ok(graph)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn center(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_center)
    }

    pub fn center_id(&self) -> Option<NodeId> {
        self.center().map(|n| n.id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Position of a node in the ordered node collection.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Direct children of `id`, in connection order.
    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.connections
            .iter()
            .filter(|c| c.from_node_id == id)
            .map(|c| c.to_node_id)
            .collect()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.connections
            .iter()
            .filter(|c| c.from_node_id == id)
            .count()
    }

    pub fn incoming_connection(&self, id: NodeId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.to_node_id == id)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.incoming_connection(id).map(|c| c.from_node_id)
    }

    /// Whether `a` is reachable from `of` by following outgoing connections.
    ///
    /// A node is never its own descendant.
    pub fn is_descendant(&self, a: NodeId, of: NodeId) -> bool {
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack = vec![of];
        while let Some(cur) = stack.pop() {
            if !seen.insert(cur) {
                continue;
            }
            for child in self.children_of(cur) {
                if child == a {
                    return true;
                }
                stack.push(child);
            }
        }
        false
    }

    /// `id` plus every node transitively reachable from it, in discovery order.
    ///
    /// Computed as a fixed point: any node whose incoming connection starts inside the set joins
    /// the set, until a full pass adds nothing.
    pub fn subtree_of(&self, id: NodeId) -> IndexSet<NodeId> {
        let mut closure = IndexSet::new();
        closure.insert(id);
        loop {
            let mut changed = false;
            for c in &self.connections {
                if closure.contains(&c.from_node_id) && closure.insert(c.to_node_id) {
                    changed = true;
                }
            }
            if !changed {
                return closure;
            }
        }
    }

    /// Number of connections between the center and `id`, or `None` if `id` is unreachable.
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut cur = id;
        while let Some(node) = self.node(cur) {
            if node.is_center {
                return Some(depth);
            }
            cur = self.parent_of(cur)?;
            depth += 1;
            if depth > self.nodes.len() {
                return None;
            }
        }
        None
    }

    /// Checks the structural invariants: one center, connection endpoints present, every
    /// non-center node has exactly one parent, and every node is reachable from the center.
    pub fn validate(&self) -> Result<()> {
        let centers = self.nodes.iter().filter(|n| n.is_center).count();
        if centers != 1 {
            return Err(violation(format!(
                "expected exactly one center node, found {centers}"
            )));
        }

        let mut ids: FxHashSet<NodeId> = FxHashSet::default();
        for n in &self.nodes {
            if !ids.insert(n.id) {
                return Err(violation(format!("duplicate node id {}", n.id)));
            }
        }

        let mut incoming: FxHashMap<NodeId, usize> = FxHashMap::default();
        for c in &self.connections {
            if !ids.contains(&c.from_node_id) || !ids.contains(&c.to_node_id) {
                return Err(violation(format!(
                    "connection {} references a missing node",
                    c.id
                )));
            }
            *incoming.entry(c.to_node_id).or_default() += 1;
        }

        for n in &self.nodes {
            let count = incoming.get(&n.id).copied().unwrap_or(0);
            let expected = if n.is_center { 0 } else { 1 };
            if count != expected {
                return Err(violation(format!(
                    "node {} has {count} incoming connections, expected {expected}",
                    n.id
                )));
            }
        }

        // With one parent per node, full reachability from the center rules out cycles.
        let Some(center) = self.center_id() else {
            return Err(violation("missing center node".to_string()));
        };
        let reachable = self.subtree_of(center);
        if reachable.len() != self.nodes.len() {
            return Err(violation(format!(
                "{} node(s) are not reachable from the center",
                self.nodes.len() - reachable.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub(crate) fn connection_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.connections.iter_mut().find(|c| c.id == id)
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub(crate) fn connections_mut(&mut self) -> &mut [Connection] {
        &mut self.connections
    }

    pub(crate) fn push_child(&mut self, node: Node, connection: Connection) {
        debug_assert_eq!(connection.to_node_id, node.id);
        self.nodes.push(node);
        self.connections.push(connection);
    }

    /// Drops every node in `ids` and every connection touching one of them.
    pub(crate) fn remove_nodes(&mut self, ids: &IndexSet<NodeId>) -> usize {
        let before = self.connections.len();
        self.connections
            .retain(|c| !ids.contains(&c.from_node_id) && !ids.contains(&c.to_node_id));
        self.nodes.retain(|n| !ids.contains(&n.id));
        before - self.connections.len()
    }
}

fn violation(message: String) -> Error {
    Error::InvariantViolation { message }
}
