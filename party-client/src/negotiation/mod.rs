mod negotiation_outcome;
mod negotiation_state;
mod peer_record;
mod peer_worker;
mod registry;

pub(crate) use negotiation_outcome::*;
pub use negotiation_state::*;
pub use peer_record::PeerSnapshot;
pub(crate) use peer_record::PeerRecord;
pub(crate) use peer_worker::*;
pub(crate) use registry::*;
