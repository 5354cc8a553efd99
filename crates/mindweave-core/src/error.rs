use crate::ids::{ConnectionId, NodeId};
use crate::remote::RemoteError;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parent node not found: {id}")]
    ParentNotFound { id: NodeId },

    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    #[error("Connection not found: {id}")]
    ConnectionNotFound { id: ConnectionId },

    #[error("The center node cannot be deleted")]
    CannotDeleteCenter,

    #[error("Local draft storage is full ({capacity} drafts)")]
    LocalDraftCapacityExceeded { capacity: usize },

    #[error("Monthly server save quota exhausted ({limit} saves per month)")]
    ServerQuotaExceeded { limit: u32 },

    #[error("Remote persistence failed: {0}")]
    RemotePersistenceFailed(#[from] RemoteError),

    #[error("Favorite style slot out of range: {index}")]
    InvalidStyleSlot { index: usize },

    #[error("Invalid style payload: {message}")]
    InvalidStylePayload { message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Graph invariant violated: {message}")]
    InvariantViolation { message: String },
}
