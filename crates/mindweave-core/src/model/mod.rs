mod graph;
mod node;
mod style;

#[cfg(test)]
mod tests;

pub use graph::Graph;
pub use node::{Connection, Node};
pub use style::{ConnectionStyle, NodeStyle, Rgba, STYLE_TOLERANCE};
