#![forbid(unsafe_code)]

//! Headless mind map editing core.
//!
//! A mind map is a tree of idea nodes hanging off a single center node, joined by labeled
//! connections. This crate owns the parts with real invariants and state:
//! - [`Graph`]: nodes and connections, with tree-invariant queries and validation
//! - [`LayoutEngine`]: deterministic placement of newly created nodes
//! - [`MutationEngine`]: structural edits that snapshot into [`HistoryManager`] first
//! - [`StyleEngine`]: bulk styling and three persisted favorite presets
//! - [`DraftQuotaManager`]: local draft capacity and the monthly server-save quota
//! - [`EditingSession`]: the authoritative graph plus gesture phases and change notification
//!
//! Remote storage is reached only through the [`RemotePersistence`] trait; local state goes
//! through a [`KeyValueStore`]. Nothing here holds global state, so every service can be
//! instantiated in isolation.

pub mod config;
pub mod drafts;
pub mod error;
pub mod geom;
pub mod history;
pub mod ids;
pub mod layout;
pub mod model;
pub mod mutation;
pub mod outline;
pub mod remote;
pub mod session;
pub mod store;
pub mod styles;

pub use config::{EditorConfig, LayoutOptions, QuotaLimits};
pub use drafts::{DraftQuotaManager, DraftQuotaState, LocalDraft};
pub use error::{Error, Result};
pub use history::HistoryManager;
pub use ids::{ConnectionId, DraftId, FavoriteId, NodeId};
pub use layout::LayoutEngine;
pub use model::{Connection, ConnectionStyle, Graph, Node, NodeStyle, Rgba};
pub use mutation::MutationEngine;
pub use outline::{OutlineRow, outline};
pub use remote::{
    IncrementalSync, RemoteDraft, RemoteDraftId, RemoteError, RemoteNodeId, RemotePersistence,
    RemotePostId, SyncReport, publish, save_remote_draft,
};
pub use session::{EditingSession, GraphChange, SessionState, SubscriptionId};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use styles::{FAVORITE_SLOT_COUNT, FavoriteStyle, StyleEngine, StyleSelection, unify_style};
