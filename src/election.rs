use crate::state::ClusterState;
use crate::transport::Transport;
use crate::types::{ClusterView, Message, NodeId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Bully election: the highest live id wins. Rounds are re-entrant; any
/// trigger (startup, coordinator expiry, an `ELECTION` from a lower id) may
/// start a new one while another is still waiting out its timeout.
pub struct ElectionEngine {
    view: Arc<ClusterView>,
    state: Arc<ClusterState>,
    transport: Arc<Transport>,
    takeover_wait: Duration,
}

impl ElectionEngine {
    pub fn new(
        view: Arc<ClusterView>,
        state: Arc<ClusterState>,
        transport: Arc<Transport>,
        takeover_wait: Duration,
    ) -> Self {
        Self {
            view,
            state,
            transport,
            takeover_wait,
        }
    }

    pub async fn start_election(&self) {
        let self_id = self.view.self_id();
        info!("node {} starting election", self_id);

        let higher = self.view.higher_peers();
        if higher.is_empty() {
            self.state.set_coordinator(self_id);
            info!("node {} has the highest id, assuming coordinator role", self_id);
            self.transport
                .broadcast(&self.view.peers, &Message::Coordinator { id: self_id })
                .await;
            return;
        }

        for peer in &higher {
            if let Err(e) = self
                .transport
                .send(peer, &Message::Election { id: self_id })
                .await
            {
                debug!("election message to node {} failed: {}", peer.id, e);
            }
        }

        // The one intentional blocking delay in the control path. The state
        // lock is not held here, so a COORDINATOR announcement arriving
        // during the wait still lands.
        tokio::time::sleep(self.takeover_wait).await;

        if self.state.declare_if_unset() {
            info!("node {} heard no coordinator, taking over", self_id);
            self.transport
                .broadcast(&self.view.peers, &Message::Coordinator { id: self_id })
                .await;
        }
    }

    /// `ELECTION` from a peer. A lower sender gets a best-effort ELECTION_OK
    /// over a new outbound connection, then this node runs its own round. A
    /// higher sender proceeds independently and needs no reply.
    pub async fn handle_election(&self, sender: NodeId) {
        let self_id = self.view.self_id();
        if sender >= self_id {
            debug!("ignoring election message from node {}", sender);
            return;
        }
        if let Some(peer) = self.view.peer(sender) {
            if let Err(e) = self
                .transport
                .send(peer, &Message::ElectionOk { id: self_id })
                .await
            {
                debug!("election ok to node {} failed: {}", sender, e);
            }
        }
        self.start_election().await;
    }

    /// `COORDINATOR` announcement: unconditional, last writer wins.
    pub fn handle_coordinator(&self, id: NodeId) {
        self.state.set_coordinator(id);
        info!("node {} accepts coordinator {}", self.view.self_id(), id);
    }

    /// `ELECTION_OK` carries no blocking semantics: the takeover timeout is
    /// the only thing that ends a round.
    pub fn handle_election_ok(&self, sender: NodeId) {
        debug!("election ok from node {}", sender);
    }
}
