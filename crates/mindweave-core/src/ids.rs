//! Opaque identifiers.
//!
//! All ids are random v4 UUIDs. They stay stable for the lifetime of an editing session and are
//! the keys used when a graph is persisted incrementally to a remote collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

opaque_id!(
    /// Identifies a [`Node`](crate::Node) within a graph.
    NodeId
);
opaque_id!(
    /// Identifies a [`Connection`](crate::Connection) within a graph.
    ConnectionId
);
opaque_id!(
    /// Identifies a locally stored draft.
    DraftId
);
opaque_id!(FavoriteId);
