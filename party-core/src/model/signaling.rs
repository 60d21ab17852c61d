use crate::model::channel::RawChannelId;
use crate::model::party::PartyCode;
use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Messages routed through the rendezvous relay.
///
/// Peer-addressed variants carry the recipient when sent and the sender
/// when received; the relay rewrites the id while routing. Channel ids are
/// carried as sent and validated by the receiver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all = "snake_case")]
pub enum RelayMessage {
    CreateParty,
    JoinCode {
        code: PartyCode,
    },
    JoinParty {
        code: PartyCode,
    },
    JoinFailed,
    JoinSuccess {
        host_id: PeerId,
        #[serde(default)]
        channel_id: RawChannelId,
    },
    NewPlayer {
        peer_id: PeerId,
        #[serde(default)]
        channel_id: RawChannelId,
    },
    #[serde(rename = "rtc_offer")]
    Offer {
        peer_id: PeerId,
        sdp: String,
    },
    #[serde(rename = "rtc_answer")]
    Answer {
        peer_id: PeerId,
        sdp: String,
    },
    #[serde(rename = "rtc_candidate")]
    IceCandidate {
        peer_id: PeerId,
        candidate: String,
    },
}

impl RelayMessage {
    /// Event name on the relay wire.
    pub fn event(&self) -> &'static str {
        match self {
            RelayMessage::CreateParty => "create_party",
            RelayMessage::JoinCode { .. } => "join_code",
            RelayMessage::JoinParty { .. } => "join_party",
            RelayMessage::JoinFailed => "join_failed",
            RelayMessage::JoinSuccess { .. } => "join_success",
            RelayMessage::NewPlayer { .. } => "new_player",
            RelayMessage::Offer { .. } => "rtc_offer",
            RelayMessage::Answer { .. } => "rtc_answer",
            RelayMessage::IceCandidate { .. } => "rtc_candidate",
        }
    }
}
