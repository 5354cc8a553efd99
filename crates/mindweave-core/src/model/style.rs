use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Per-channel tolerance used when comparing styles for equality.
pub const STYLE_TOLERANCE: f64 = 0.01;

/// A color as four component values in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Component-wise comparison, each channel within `tolerance`.
    pub fn approx_eq(&self, other: &Rgba, tolerance: f64) -> bool {
        (self.r - other.r).abs() <= tolerance
            && (self.g - other.g).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
            && (self.a - other.a).abs() <= tolerance
    }

    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }
}

/// Visual style of a node.
///
/// Serializes to the flat `fillR .. textA` payload consumed by persistence collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeStylePayload", into = "NodeStylePayload")]
pub struct NodeStyle {
    pub fill_color: Rgba,
    pub border_color: Rgba,
    pub text_color: Rgba,
}

impl NodeStyle {
    /// Default style of the center node.
    pub const CENTER: NodeStyle = NodeStyle {
        fill_color: Rgba::opaque(0.29, 0.56, 0.89),
        border_color: Rgba::opaque(0.17, 0.35, 0.63),
        text_color: Rgba::WHITE,
    };

    /// Default style of every other node.
    pub const BRANCH: NodeStyle = NodeStyle {
        fill_color: Rgba::WHITE,
        border_color: Rgba::opaque(0.6, 0.6, 0.6),
        text_color: Rgba::opaque(0.13, 0.13, 0.13),
    };

    pub fn default_for(is_center: bool) -> Self {
        if is_center { Self::CENTER } else { Self::BRANCH }
    }

    pub fn approx_eq(&self, other: &NodeStyle, tolerance: f64) -> bool {
        self.fill_color.approx_eq(&other.fill_color, tolerance)
            && self.border_color.approx_eq(&other.border_color, tolerance)
            && self.text_color.approx_eq(&other.text_color, tolerance)
    }

    pub fn encode(&self) -> String {
        encode_payload(self)
    }

    pub fn decode(text: &str) -> Result<Self> {
        decode_payload(text)
    }
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self::BRANCH
    }
}

/// Visual style of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConnectionStylePayload", into = "ConnectionStylePayload")]
pub struct ConnectionStyle {
    pub line_color: Rgba,
    pub line_width: f64,
}

impl ConnectionStyle {
    pub const DEFAULT: ConnectionStyle = ConnectionStyle {
        line_color: Rgba::opaque(0.5, 0.5, 0.5),
        line_width: 2.0,
    };

    pub fn approx_eq(&self, other: &ConnectionStyle, tolerance: f64) -> bool {
        self.line_color.approx_eq(&other.line_color, tolerance)
            && (self.line_width - other.line_width).abs() <= tolerance
    }

    pub fn encode(&self) -> String {
        encode_payload(self)
    }

    pub fn decode(text: &str) -> Result<Self> {
        decode_payload(text)
    }
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// The field names and their order are part of the persisted format.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeStylePayload {
    fill_r: f64,
    fill_g: f64,
    fill_b: f64,
    fill_a: f64,
    border_r: f64,
    border_g: f64,
    border_b: f64,
    border_a: f64,
    text_r: f64,
    text_g: f64,
    text_b: f64,
    text_a: f64,
}

impl From<NodeStyle> for NodeStylePayload {
    fn from(style: NodeStyle) -> Self {
        let NodeStyle {
            fill_color: fill,
            border_color: border,
            text_color: text,
        } = style;
        Self {
            fill_r: fill.r,
            fill_g: fill.g,
            fill_b: fill.b,
            fill_a: fill.a,
            border_r: border.r,
            border_g: border.g,
            border_b: border.b,
            border_a: border.a,
            text_r: text.r,
            text_g: text.g,
            text_b: text.b,
            text_a: text.a,
        }
    }
}

impl From<NodeStylePayload> for NodeStyle {
    fn from(p: NodeStylePayload) -> Self {
        Self {
            fill_color: Rgba::new(p.fill_r, p.fill_g, p.fill_b, p.fill_a),
            border_color: Rgba::new(p.border_r, p.border_g, p.border_b, p.border_a),
            text_color: Rgba::new(p.text_r, p.text_g, p.text_b, p.text_a),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionStylePayload {
    line_r: f64,
    line_g: f64,
    line_b: f64,
    line_a: f64,
    line_width: f64,
}

impl From<ConnectionStyle> for ConnectionStylePayload {
    fn from(style: ConnectionStyle) -> Self {
        Self {
            line_r: style.line_color.r,
            line_g: style.line_color.g,
            line_b: style.line_color.b,
            line_a: style.line_color.a,
            line_width: style.line_width,
        }
    }
}

impl From<ConnectionStylePayload> for ConnectionStyle {
    fn from(p: ConnectionStylePayload) -> Self {
        Self {
            line_color: Rgba::new(p.line_r, p.line_g, p.line_b, p.line_a),
            line_width: p.line_width,
        }
    }
}

fn encode_payload<T: Serialize>(value: &T) -> String {
    // Plain structs of finite floats always serialize.
    serde_json::to_string(value).unwrap_or_default()
}

fn decode_payload<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::InvalidStylePayload {
        message: e.to_string(),
    })
}
