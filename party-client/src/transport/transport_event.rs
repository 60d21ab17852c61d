use crate::transport::ConnectionKey;
use bytes::Bytes;

/// Callbacks raised by a peer connection, delivered to the party driver.
#[derive(Debug)]
pub enum TransportEvent {
    /// The negotiated data channel reached the open state.
    ChannelOpen(ConnectionKey),

    /// The data channel or its connection went away.
    ChannelClosed(ConnectionKey),

    /// Binary frame received on the data channel.
    Message(ConnectionKey, Bytes),

    /// A local ICE candidate was discovered and must be relayed to the peer.
    CandidateGenerated(ConnectionKey, String),
}

impl TransportEvent {
    pub fn key(&self) -> &ConnectionKey {
        match self {
            TransportEvent::ChannelOpen(key)
            | TransportEvent::ChannelClosed(key)
            | TransportEvent::Message(key, _)
            | TransportEvent::CandidateGenerated(key, _) => key,
        }
    }
}
