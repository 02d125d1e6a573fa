use crate::config::{ClusterConfig, TimingSettings};
use crate::election::ElectionEngine;
use crate::replication::ReplicationEngine;
use crate::server::{self, Dispatcher};
use crate::state::ClusterState;
use crate::storage::Storage;
use crate::transport::Transport;
use crate::types::{ClusterView, Message, NodeId};
use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// One node process: listener, heartbeat broadcaster, liveness monitor and
/// election engine composed over a shared cluster view and state object.
pub struct ShoalDaemon {
    view: Arc<ClusterView>,
    state: Arc<ClusterState>,
    transport: Arc<Transport>,
    election: Arc<ElectionEngine>,
    replication: Arc<ReplicationEngine>,
    timing: TimingSettings,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ShoalDaemon {
    pub fn new(config: &ClusterConfig, node_id: NodeId, storage: Arc<dyn Storage>) -> Result<Self> {
        let view = Arc::new(config.view_for(node_id)?);
        let timing = config.timing.clone();

        info!(
            "initializing node {} with {} peer(s)",
            node_id,
            view.peers.len()
        );

        let state = Arc::new(ClusterState::new(node_id));
        let transport = Arc::new(Transport::new(timing.peer_send_timeout()));
        let election = Arc::new(ElectionEngine::new(
            view.clone(),
            state.clone(),
            transport.clone(),
            timing.election_timeout(),
        ));
        let replication = Arc::new(ReplicationEngine::new(
            view.clone(),
            storage,
            transport.clone(),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            view,
            state,
            transport,
            election,
            replication,
            timing,
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub async fn run(&self) -> Result<()> {
        let listen_addr = format!("0.0.0.0:{}", self.view.local.port);
        let listener = TcpListener::bind(&listen_addr).await?;
        info!("node {} listening on {}", self.view.self_id(), listen_addr);

        let dispatcher = Arc::new(Dispatcher::new(
            self.state.clone(),
            self.election.clone(),
            self.replication.clone(),
        ));
        let server_handle = tokio::spawn(server::serve(
            listener,
            dispatcher,
            self.shutdown_rx.clone(),
        ));

        let heartbeat_handle = self.spawn_heartbeat_loop();
        let monitor_handle = self.spawn_monitor_loop();

        let election = self.election.clone();
        tokio::spawn(async move {
            election.start_election().await;
        });

        tokio::select! {
            _ = server_handle => {
                error!("listener exited unexpectedly");
            }
            _ = heartbeat_handle => {
                error!("heartbeat loop exited unexpectedly");
            }
            _ = monitor_handle => {
                error!("monitor loop exited unexpectedly");
            }
            _ = self.wait_for_shutdown() => {
                info!("shutdown signal received");
            }
        }

        Ok(())
    }

    fn spawn_heartbeat_loop(&self) -> tokio::task::JoinHandle<()> {
        let transport = self.transport.clone();
        let view = self.view.clone();
        let interval = self.timing.heartbeat_interval();
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let msg = Message::Heartbeat { id: view.self_id() };

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        transport.broadcast(&view.peers, &msg).await;
                    }
                    _ = shutdown_rx.changed() => {
                        break;
                    }
                }
            }
        })
    }

    fn spawn_monitor_loop(&self) -> tokio::task::JoinHandle<()> {
        let state = self.state.clone();
        let election = self.election.clone();
        let view = self.view.clone();
        let interval = self.timing.monitor_interval();
        let threshold = self.timing.liveness_timeout();
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = state.sweep(threshold);
                        for id in &report.expired {
                            warn!("node {} detects node {} down", view.self_id(), id);
                        }
                        if report.coordinator_expired {
                            election.start_election().await;
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        break;
                    }
                }
            }
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.view.self_id()
    }

    pub fn coordinator_id(&self) -> Option<NodeId> {
        self.state.coordinator_id()
    }

    pub fn alive_ids(&self) -> Vec<NodeId> {
        self.state.alive_ids()
    }

    async fn wait_for_shutdown(&self) {
        let mut rx = self.shutdown_rx.clone();
        while !*rx.borrow() {
            let _ = rx.changed().await;
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
