//! Deterministic placement of newly created nodes.
//!
//! Children of the center fan out over a fixed angle sequence, one ring further out for every
//! full pass through the sequence. Children of any other node continue in the direction of the
//! branch (grandparent to parent) and spread over a narrow arc at a fixed distance. Equal inputs
//! always produce equal positions.

use crate::config::LayoutOptions;
use crate::geom::{Angle, Point, polar};
use crate::ids::NodeId;
use crate::model::Graph;

#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
}

impl LayoutEngine {
    pub fn new(mut options: LayoutOptions) -> Self {
        if options.angle_sequence_deg.is_empty() {
            options.angle_sequence_deg = LayoutOptions::default().angle_sequence_deg;
        }
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Position for the next child of `parent`, or `None` if `parent` is not in `graph`.
    pub fn place_child(&self, graph: &Graph, parent: NodeId) -> Option<Point> {
        let parent_node = graph.node(parent)?;
        let existing = graph.child_count(parent);

        if parent_node.is_center {
            let sequence = &self.options.angle_sequence_deg;
            let angle = Angle::degrees(sequence[existing % sequence.len()]);
            let ring = (existing / sequence.len()) as f64;
            let distance = self.options.center_distance + ring * self.options.ring_step;
            return Some(parent_node.position + polar(angle, distance));
        }

        let base_angle = graph
            .parent_of(parent)
            .and_then(|gp| graph.node(gp))
            .map(|gp| (parent_node.position - gp.position).angle_from_x_axis())
            .unwrap_or_else(Angle::zero);

        // The offset only looks at the children that already exist.
        let spread = self.options.spread_angle_deg;
        let k = existing as f64;
        let offset = Angle::degrees(k * spread - k * spread / 2.0);

        Some(parent_node.position + polar(base_angle + offset, self.options.branch_distance))
    }
}
