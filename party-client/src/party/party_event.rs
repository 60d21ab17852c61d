use party_core::{PartyCode, PeerId, PeerRole};
use std::fmt;

/// Notifications for whatever renders the party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartyEvent {
    /// The relay assigned a code to the party we host.
    PartyHosted { code: PartyCode },

    /// The relay rejected our join code.
    JoinFailed { code: PartyCode },

    /// The relay accepted our join code; negotiation with the host starts.
    Joined { code: PartyCode, host_id: PeerId },

    PeerAdded { peer_id: PeerId, role: PeerRole },

    /// The data channel to this peer is open.
    PeerConnected { peer_id: PeerId },

    PeerClosed { peer_id: PeerId, reason: CloseReason },

    Message { from: PeerId, text: String },

    /// Setting up a connection failed. Not retried.
    ConnectionError { peer_id: PeerId, reason: String },

    /// The local party session was reset.
    PartyLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    ChannelClosed,
    NegotiationFailed,
    LivenessTimeout,
    Replaced,
    SessionEnded,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            CloseReason::ChannelClosed => "channel closed",
            CloseReason::NegotiationFailed => "negotiation failed",
            CloseReason::LivenessTimeout => "channel never opened",
            CloseReason::Replaced => "replaced by a new connection",
            CloseReason::SessionEnded => "party ended",
        };
        f.write_str(reason)
    }
}
