use serde::{Deserialize, Serialize};

/// Frame carried over a peer data channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Packet {
    System(SystemMessage),
    Chat(ChatMessage),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SystemMessage {
    /// Liveness probe; receivers drop it.
    KeepAlive { timestamp: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
}

impl Packet {
    pub fn keep_alive(timestamp: u64) -> Self {
        Packet::System(SystemMessage::KeepAlive { timestamp })
    }

    pub fn chat(text: impl Into<String>) -> Self {
        Packet::Chat(ChatMessage { text: text.into() })
    }

    pub fn encode(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
