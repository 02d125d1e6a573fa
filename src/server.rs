use crate::election::ElectionEngine;
use crate::replication::ReplicationEngine;
use crate::state::ClusterState;
use crate::types::{CoordinatorReply, Message};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, error, warn};

/// Inter-node messages must fit in a single read; there is no framing beyond
/// one message per connection.
pub const INBOUND_BUF_SIZE: usize = 8 * 1024;

/// Routes one decoded message to the component that owns it.
pub struct Dispatcher {
    state: Arc<ClusterState>,
    election: Arc<ElectionEngine>,
    replication: Arc<ReplicationEngine>,
}

impl Dispatcher {
    pub fn new(
        state: Arc<ClusterState>,
        election: Arc<ElectionEngine>,
        replication: Arc<ReplicationEngine>,
    ) -> Self {
        Self {
            state,
            election,
            replication,
        }
    }

    async fn dispatch(&self, msg: Message, stream: &mut TcpStream) {
        match msg {
            Message::Heartbeat { id } => {
                self.state.record_heartbeat(id);
            }
            Message::Election { id } => {
                self.election.handle_election(id).await;
            }
            Message::ElectionOk { id } => {
                self.election.handle_election_ok(id);
            }
            Message::Coordinator { id } => {
                self.election.handle_coordinator(id);
            }
            Message::Replicate {
                sql,
                checksum,
                origin,
            } => {
                self.replication.apply_replicated(&sql, checksum, origin).await;
            }
            Message::ClientQuery { sql } => {
                let reply = self.replication.execute_client_query(&sql).await;
                write_reply(stream, &reply).await;
            }
            Message::GetCoordinator => {
                let reply = CoordinatorReply::new(self.state.coordinator_id());
                write_reply(stream, &reply).await;
            }
        }
    }
}

async fn write_reply<T: serde::Serialize>(stream: &mut TcpStream, reply: &T) {
    match serde_json::to_vec(reply) {
        Ok(payload) => {
            if let Err(e) = stream.write_all(&payload).await {
                warn!("failed to write reply: {}", e);
            }
        }
        Err(e) => error!("failed to encode reply: {}", e),
    }
}

async fn handle_connection(mut stream: TcpStream, dispatcher: Arc<Dispatcher>) {
    let mut buf = vec![0u8; INBOUND_BUF_SIZE];
    let n = match stream.read(&mut buf).await {
        Ok(0) => return,
        Ok(n) => n,
        Err(e) => {
            debug!("connection read failed: {}", e);
            return;
        }
    };

    match serde_json::from_slice::<Message>(&buf[..n]) {
        Ok(msg) => dispatcher.dispatch(msg, &mut stream).await,
        Err(e) => {
            // Undecodable inter-node traffic is dropped without a response.
            debug!("dropping undecodable message: {}", e);
        }
    }
}

/// Accept loop. Each connection gets its own task; the listener stops when
/// the shutdown signal flips.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let dispatcher = dispatcher.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, dispatcher).await;
                        });
                    }
                    Err(e) => {
                        warn!("accept failed: {}", e);
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                break;
            }
        }
    }
}
