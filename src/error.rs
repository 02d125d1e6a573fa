/// Failures the coordination core can hit at runtime. Inter-node paths
/// absorb these locally; only client-facing paths turn them into replies.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("peer unreachable: {0}")]
    Unreachable(#[source] std::io::Error),

    #[error("send to {addr} timed out")]
    SendTimeout { addr: String },

    #[error("protocol decode: {0}")]
    Decode(#[from] serde_json::Error),
}
