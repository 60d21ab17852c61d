use crate::transport::TransportEvent;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use party_core::{ChannelId, PeerId};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Identifies one connection instance for a peer.
///
/// A peer id can be reused after its record is replaced; the epoch keeps
/// late callbacks of the old connection from touching the new record.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ConnectionKey {
    pub peer_id: PeerId,
    pub epoch: u64,
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.peer_id, self.epoch)
    }
}

/// A peer connection together with its negotiated data channel.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    /// Create an offer and apply it as the local description.
    async fn create_offer(&self) -> Result<String>;

    /// Apply a remote offer.
    async fn set_remote_offer(&self, sdp: String) -> Result<()>;

    /// Create an answer and apply it as the local description.
    async fn create_answer(&self) -> Result<String>;

    /// Apply a remote answer.
    async fn set_remote_answer(&self, sdp: String) -> Result<()>;

    /// Current local description, if any was applied.
    async fn local_description(&self) -> Option<String>;

    async fn add_ice_candidate(&self, candidate: String) -> Result<()>;

    fn is_channel_open(&self) -> bool;

    async fn send(&self, data: Bytes) -> Result<()>;

    /// Detach every callback and release the connection.
    async fn close(&self) -> Result<()>;
}

/// Creates connections whose data channel is pre-negotiated with `channel_id`.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(
        &self,
        key: ConnectionKey,
        channel_id: ChannelId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerConnection>>;
}
