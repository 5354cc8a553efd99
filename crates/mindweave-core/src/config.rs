use crate::geom::{Point, point};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tunables for [`LayoutEngine`](crate::LayoutEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Fan-out directions (degrees) for children of the center, cycled in order.
    pub angle_sequence_deg: Vec<f64>,
    /// Distance of the first ring of center children.
    pub center_distance: f64,
    /// Extra distance per completed ring around the center.
    pub ring_step: f64,
    /// Distance of a child from a non-center parent.
    pub branch_distance: f64,
    /// Arc used to spread children of a non-center parent.
    pub spread_angle_deg: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            angle_sequence_deg: vec![-90.0, -30.0, 30.0, 150.0, -150.0],
            center_distance: 160.0,
            ring_step: 100.0,
            branch_distance: 120.0,
            spread_angle_deg: 45.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuotaLimits {
    pub local_draft_capacity: usize,
    pub monthly_server_saves: u32,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            local_draft_capacity: 12,
            monthly_server_saves: 3,
        }
    }
}

/// Editor-wide configuration. Every field has a default, so partial JSON overrides are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub layout: LayoutOptions,
    pub history_capacity: usize,
    /// Where the center node of a brand-new map is placed.
    pub default_center: Point,
    pub quota: QuotaLimits,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            history_capacity: 20,
            default_center: point(200.0, 300.0),
            quota: QuotaLimits::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })?;
        if config.layout.angle_sequence_deg.is_empty() {
            return Err(Error::InvalidConfig {
                message: "layout.angleSequenceDeg must not be empty".to_string(),
            });
        }
        Ok(config)
    }
}
