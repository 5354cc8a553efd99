#![forbid(unsafe_code)]

//! `mindweave` is a headless mind map editing core in Rust.
//!
//! It re-exports [`mindweave_core`]; see that crate for the data model and services.
//!
//! ```
//! use mindweave::{EditingSession, EditorConfig};
//!
//! let mut session = EditingSession::new("Holiday", EditorConfig::default());
//! let center = session.graph().center_id().expect("new maps have a center");
//! let beach = session.add_child_node(center, "Beach")?;
//! assert_eq!(session.graph().parent_of(beach), Some(center));
//!
//! session.undo();
//! assert_eq!(session.graph().node_count(), 1);
//! # Ok::<(), mindweave::Error>(())
//! ```

pub use mindweave_core::*;
