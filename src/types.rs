use serde::{Deserialize, Serialize};

pub type NodeId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub id: NodeId,
    pub host: String,
    pub port: u16,
    pub storage_port: u16,
}

impl NodeDescriptor {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Static membership for the lifetime of the process: the local descriptor
/// plus every other configured node. Never mutated after load.
#[derive(Debug, Clone)]
pub struct ClusterView {
    pub local: NodeDescriptor,
    pub peers: Vec<NodeDescriptor>,
}

impl ClusterView {
    pub fn self_id(&self) -> NodeId {
        self.local.id
    }

    pub fn peer(&self, id: NodeId) -> Option<&NodeDescriptor> {
        self.peers.iter().find(|p| p.id == id)
    }

    pub fn higher_peers(&self) -> Vec<&NodeDescriptor> {
        self.peers.iter().filter(|p| p.id > self.local.id).collect()
    }
}

/// The full inter-node and client-facing message set. One message per
/// connection, dispatched by the tag field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    Heartbeat { id: NodeId },
    Election { id: NodeId },
    ElectionOk { id: NodeId },
    Coordinator { id: NodeId },
    Replicate { sql: String, checksum: u32, origin: NodeId },
    ClientQuery { sql: String },
    GetCoordinator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueryReply {
    Success {
        node: NodeId,
        data: Option<Vec<serde_json::Value>>,
    },
    Error {
        node: NodeId,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorReply {
    pub status: String,
    pub coordinator_id: Option<NodeId>,
}

impl CoordinatorReply {
    pub fn new(coordinator_id: Option<NodeId>) -> Self {
        Self {
            status: "success".to_string(),
            coordinator_id,
        }
    }
}
