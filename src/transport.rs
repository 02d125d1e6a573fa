use crate::error::Error;
use crate::types::{Message, NodeDescriptor};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Replies from request/response exchanges are read in a single pass.
pub const REPLY_BUF_SIZE: usize = 16 * 1024;

/// One JSON object per connection. Sends are fire-and-forget: an unreachable
/// peer looks exactly like a peer that is down, so failures are reported to
/// the caller but carry no retry semantics.
pub struct Transport {
    connect_timeout: Duration,
}

impl Transport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub async fn send(&self, target: &NodeDescriptor, msg: &Message) -> Result<(), Error> {
        let payload = serde_json::to_vec(msg)?;
        let addr = target.addr();
        let mut stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr.as_str()))
            .await
            .map_err(|_| Error::SendTimeout { addr: addr.clone() })?
            .map_err(Error::Unreachable)?;
        stream.write_all(&payload).await.map_err(Error::Unreachable)?;
        Ok(())
    }

    pub async fn broadcast(&self, peers: &[NodeDescriptor], msg: &Message) {
        for peer in peers {
            if let Err(e) = self.send(peer, msg).await {
                debug!("send to node {} failed: {}", peer.id, e);
            }
        }
    }

    /// Sends one message and waits for exactly one reply object, the client
    /// side of `CLIENT_QUERY` / `GET_COORDINATOR`. The reply must arrive in
    /// a single read.
    pub async fn request(
        &self,
        target: &NodeDescriptor,
        msg: &Message,
        timeout: Duration,
    ) -> Result<Vec<u8>, Error> {
        let payload = serde_json::to_vec(msg)?;
        let addr = target.addr();
        match tokio::time::timeout(timeout, exchange(&addr, &payload)).await {
            Ok(result) => result,
            Err(_) => Err(Error::SendTimeout { addr }),
        }
    }
}

async fn exchange(addr: &str, payload: &[u8]) -> Result<Vec<u8>, Error> {
    let mut stream = TcpStream::connect(addr).await.map_err(Error::Unreachable)?;
    stream.write_all(payload).await.map_err(Error::Unreachable)?;
    let mut buf = vec![0u8; REPLY_BUF_SIZE];
    let n = stream.read(&mut buf).await.map_err(Error::Unreachable)?;
    buf.truncate(n);
    Ok(buf)
}
