//! Indented outline projection of a graph.

use crate::ids::NodeId;
use crate::model::Graph;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineRow {
    pub node_id: NodeId,
    pub depth: usize,
    /// Position of the node in the graph's node collection.
    pub index: usize,
}

/// Pre-order walk from the center; siblings appear in connection order.
pub fn outline(graph: &Graph) -> Vec<OutlineRow> {
    let Some(center) = graph.center_id() else {
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(graph.node_count());
    let mut stack = vec![(center, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let Some(index) = graph.index_of(id) else {
            continue;
        };
        rows.push(OutlineRow {
            node_id: id,
            depth,
            index,
        });
        if rows.len() > graph.node_count() {
            // Only reachable for graphs that break the tree invariant.
            break;
        }
        for child in graph.children_of(id).into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    rows
}
