use crate::storage::Storage;
use crate::transport::Transport;
use crate::types::{ClusterView, Message, NodeId, QueryReply};
use std::sync::Arc;
use tracing::{debug, info, warn};

const WRITE_KEYWORDS: [&str; 6] = ["INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Read,
    Write,
}

/// Case-insensitive keyword scan over the raw statement text. A keyword
/// anywhere in the text counts, identifiers included.
pub fn classify(sql: &str) -> QueryKind {
    let upper = sql.to_uppercase();
    if WRITE_KEYWORDS.iter().any(|kw| upper.contains(kw)) {
        QueryKind::Write
    } else {
        QueryKind::Read
    }
}

/// CRC32 of the exact statement text. Detects accidental corruption of a
/// replicated statement in transit; not a security mechanism.
pub fn query_checksum(sql: &str) -> u32 {
    crc32fast::hash(sql.as_bytes())
}

/// Executes client queries against the storage collaborator and fans writes
/// out to every peer. Replication is fire-and-forget: no acknowledgement, no
/// retry, and no visibility into per-replica outcomes.
pub struct ReplicationEngine {
    view: Arc<ClusterView>,
    storage: Arc<dyn Storage>,
    transport: Arc<Transport>,
}

impl ReplicationEngine {
    pub fn new(view: Arc<ClusterView>, storage: Arc<dyn Storage>, transport: Arc<Transport>) -> Self {
        Self {
            view,
            storage,
            transport,
        }
    }

    pub async fn execute_client_query(&self, sql: &str) -> QueryReply {
        let node = self.view.self_id();
        let kind = classify(sql);
        info!("client query on node {}: {}", node, sql);

        let result = match kind {
            QueryKind::Read => self.storage.fetch_rows(sql).await.map(Some),
            QueryKind::Write => self.storage.run_write(sql).await.map(|_| None),
        };

        match result {
            Ok(data) => {
                if kind == QueryKind::Write {
                    let checksum = query_checksum(sql);
                    debug!("replicating write (checksum {:08x})", checksum);
                    let msg = Message::Replicate {
                        sql: sql.to_string(),
                        checksum,
                        origin: node,
                    };
                    self.transport.broadcast(&self.view.peers, &msg).await;
                }
                QueryReply::Success { node, data }
            }
            Err(e) => {
                warn!("query failed on node {}: {}", node, e);
                QueryReply::Error {
                    node,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Apply path for a `REPLICATE` message. A checksum mismatch drops the
    /// statement; execution failure is logged and never reported back to the
    /// origin, so replicas may silently diverge.
    pub async fn apply_replicated(&self, sql: &str, checksum: u32, origin: NodeId) {
        if query_checksum(sql) != checksum {
            warn!("checksum mismatch on replicated statement from node {}, dropping", origin);
            return;
        }
        debug!("applying replicated statement from node {}", origin);
        if let Err(e) = self.storage.run_write(sql).await {
            warn!("replicated statement from node {} failed: {}", origin, e);
        }
    }
}
