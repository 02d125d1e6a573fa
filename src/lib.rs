pub mod config;
pub mod daemon;
pub mod election;
pub mod error;
pub mod replication;
pub mod server;
pub mod state;
pub mod storage;
pub mod transport;
pub mod types;

pub use config::{ClusterConfig, TimingSettings};
pub use daemon::ShoalDaemon;
pub use election::ElectionEngine;
pub use error::Error;
pub use replication::{classify, query_checksum, QueryKind, ReplicationEngine};
pub use state::{ClusterState, SweepReport};
pub use storage::{SqliteStorage, Storage, StorageError};
pub use transport::Transport;
pub use types::*;
