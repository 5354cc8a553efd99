//! The remote persistence collaborator and the publish workflow built on it.
//!
//! The in-memory graph stays authoritative: nothing here rolls a graph back when a remote call
//! fails, and nothing retries. Callers decide whether to retry or keep the map as a local draft.

use crate::drafts::DraftQuotaManager;
use crate::ids::{ConnectionId, DraftId, NodeId};
use crate::model::{Connection, Graph, Node};
use crate::store::KeyValueStore;
use crate::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {message}")]
    Request { message: String },

    #[error("request rejected: {message}")]
    Rejected { message: String },

    #[error("unknown remote record: {id}")]
    NotFound { id: String },
}

macro_rules! remote_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

remote_id!(RemotePostId);
remote_id!(RemoteNodeId);
remote_id!(RemoteDraftId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDraft {
    pub id: RemoteDraftId,
    pub user_id: String,
    pub graph: Graph,
}

/// Server-side storage for posts and drafts.
///
/// Implementations are expected to be cheap to share; every method takes `&self`.
#[allow(async_fn_in_trait)]
pub trait RemotePersistence {
    /// Submits a complete graph once. Nodes are submitted with their local ids.
    async fn create_post(
        &self,
        center_text: &str,
        nodes: &[Node],
        connections: &[Connection],
    ) -> std::result::Result<RemotePostId, RemoteError>;

    async fn add_node(
        &self,
        post: &RemotePostId,
        text: &str,
        x: f64,
        y: f64,
        is_center: bool,
    ) -> std::result::Result<RemoteNodeId, RemoteError>;

    async fn add_connection(
        &self,
        post: &RemotePostId,
        from: &RemoteNodeId,
        to: &RemoteNodeId,
        reason: &str,
    ) -> std::result::Result<(), RemoteError>;

    async fn create_draft(
        &self,
        user_id: &str,
        graph: &Graph,
    ) -> std::result::Result<RemoteDraftId, RemoteError>;

    async fn update_draft(
        &self,
        id: &RemoteDraftId,
        graph: &Graph,
    ) -> std::result::Result<(), RemoteError>;

    async fn delete_draft(&self, id: &RemoteDraftId) -> std::result::Result<(), RemoteError>;

    async fn list_drafts(&self, user_id: &str)
    -> std::result::Result<Vec<RemoteDraft>, RemoteError>;
}

/// Tracks which local nodes and connections already exist on a remote post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalSync {
    post_id: RemotePostId,
    nodes: IndexMap<NodeId, RemoteNodeId>,
    connections: IndexSet<ConnectionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub nodes_added: usize,
    pub connections_added: usize,
}

impl IncrementalSync {
    /// Starts tracking a post created from `graph`; its nodes are known remotely by local id.
    pub fn after_post(post_id: RemotePostId, graph: &Graph) -> Self {
        Self {
            post_id,
            nodes: graph
                .nodes()
                .iter()
                .map(|n| (n.id, RemoteNodeId(n.id.to_string())))
                .collect(),
            connections: graph.connections().iter().map(|c| c.id).collect(),
        }
    }

    pub fn post_id(&self) -> &RemotePostId {
        &self.post_id
    }

    pub fn remote_node_id(&self, id: NodeId) -> Option<&RemoteNodeId> {
        self.nodes.get(&id)
    }

    /// Whether `graph` holds nodes or connections the remote has not seen yet.
    pub fn has_pending(&self, graph: &Graph) -> bool {
        graph.nodes().iter().any(|n| !self.nodes.contains_key(&n.id))
            || graph
                .connections()
                .iter()
                .any(|c| !self.connections.contains(&c.id))
    }

    /// Sends every node, then every connection, added since the last push, in insertion order.
    ///
    /// On failure the entries pushed so far stay recorded, so a later call resumes.
    pub async fn push<R: RemotePersistence>(
        &mut self,
        graph: &Graph,
        remote: &R,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for node in graph.nodes() {
            if self.nodes.contains_key(&node.id) {
                continue;
            }
            let remote_id = remote
                .add_node(
                    &self.post_id,
                    &node.text,
                    node.position.x,
                    node.position.y,
                    node.is_center,
                )
                .await?;
            tracing::debug!(node = %node.id, remote = %remote_id, "pushed node");
            self.nodes.insert(node.id, remote_id);
            report.nodes_added += 1;
        }

        for connection in graph.connections() {
            if self.connections.contains(&connection.id) {
                continue;
            }
            let (Some(from), Some(to)) = (
                self.nodes.get(&connection.from_node_id),
                self.nodes.get(&connection.to_node_id),
            ) else {
                continue;
            };
            remote
                .add_connection(&self.post_id, from, to, &connection.reason)
                .await?;
            self.connections.insert(connection.id);
            report.connections_added += 1;
        }

        Ok(report)
    }
}

/// Publishes `graph` as a new post, charging the monthly quota.
///
/// Order matters: the quota is checked first, the remote post is created, the local draft the
/// graph came from is deleted, and only then is the quota incremented. A failed remote call
/// returns before any bookkeeping changes.
pub async fn publish<R, S>(
    graph: &Graph,
    local_draft: Option<DraftId>,
    quota: &mut DraftQuotaManager<S>,
    remote: &R,
) -> Result<IncrementalSync>
where
    R: RemotePersistence,
    S: KeyValueStore,
{
    if !quota.can_save_to_server()? {
        let limit = quota.limits().monthly_server_saves;
        tracing::warn!(limit, "publish blocked by monthly quota");
        return Err(Error::ServerQuotaExceeded { limit });
    }

    let post_id = match remote
        .create_post(&graph.center_text, graph.nodes(), graph.connections())
        .await
    {
        Ok(id) => id,
        Err(err) => {
            tracing::warn!(%err, "publish failed");
            return Err(err.into());
        }
    };

    if let Some(draft) = local_draft {
        quota.delete_local_draft(draft)?;
    }
    let used = quota.increment_server_save_count()?;
    tracing::info!(post = %post_id, used, "published post");

    Ok(IncrementalSync::after_post(post_id, graph))
}

/// Mirrors a graph to a remote draft: creates one when `existing` is `None`, updates otherwise.
pub async fn save_remote_draft<R: RemotePersistence>(
    remote: &R,
    user_id: &str,
    existing: Option<&RemoteDraftId>,
    graph: &Graph,
) -> Result<RemoteDraftId> {
    match existing {
        Some(id) => {
            remote.update_draft(id, graph).await?;
            Ok(id.clone())
        }
        None => Ok(remote.create_draft(user_id, graph).await?),
    }
}
