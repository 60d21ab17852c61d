mod channel;
mod packet;
mod party;
mod peer;
mod signaling;

pub use channel::{ChannelId, InvalidChannelId, RawChannelId};
pub use packet::{ChatMessage, Packet, SystemMessage};
pub use party::{BlankPartyCode, PartyCode, PartyRole};
pub use peer::{PeerId, PeerRole};
pub use signaling::{IceServerConfig, RelayMessage};
