use crate::types::{ClusterView, NodeDescriptor, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub data_dir: PathBuf,

    #[serde(default)]
    pub timing: TimingSettings,

    pub nodes: Vec<NodeDescriptor>,
}

/// All intervals in milliseconds. Defaults: heartbeats every 2s, monitor
/// sweep every 5s with a 10s expiry, a 2s election takeover wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSettings {
    pub heartbeat_interval_ms: u64,
    pub monitor_interval_ms: u64,
    pub liveness_timeout_ms: u64,
    pub election_timeout_ms: u64,
    pub peer_send_timeout_ms: u64,
    pub client_timeout_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: 2_000,
            monitor_interval_ms: 5_000,
            liveness_timeout_ms: 10_000,
            election_timeout_ms: 2_000,
            peer_send_timeout_ms: 2_000,
            client_timeout_ms: 5_000,
        }
    }
}

impl TimingSettings {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_millis(self.liveness_timeout_ms)
    }

    pub fn election_timeout(&self) -> Duration {
        Duration::from_millis(self.election_timeout_ms)
    }

    pub fn peer_send_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_send_timeout_ms)
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_millis(self.client_timeout_ms)
    }
}

impl ClusterConfig {
    pub fn load(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read cluster config {:?}: {}", path, e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("malformed cluster config {:?}: {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &PathBuf) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.nodes.is_empty() {
            anyhow::bail!("cluster config lists no nodes");
        }
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id) {
                anyhow::bail!("duplicate node id {} in cluster config", node.id);
            }
        }
        Ok(())
    }

    /// Splits the membership into the local descriptor and its peers.
    /// A process started with an id the config does not list must not come up.
    pub fn view_for(&self, node_id: NodeId) -> anyhow::Result<ClusterView> {
        let local = self
            .nodes
            .iter()
            .find(|n| n.id == node_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("node id {} is not in the cluster config", node_id))?;
        let peers = self
            .nodes
            .iter()
            .filter(|n| n.id != node_id)
            .cloned()
            .collect();
        Ok(ClusterView { local, peers })
    }

    /// Three-node localhost cluster, the layout the environment scripts set up.
    pub fn sample() -> Self {
        let nodes = (0..3)
            .map(|i| NodeDescriptor {
                id: i,
                host: "127.0.0.1".to_string(),
                port: 5000 + i as u16,
                storage_port: 3307 + i as u16,
            })
            .collect();
        Self {
            data_dir: PathBuf::from("./shoal-data"),
            timing: TimingSettings::default(),
            nodes,
        }
    }
}
