mod error;
pub mod liveness;
pub mod negotiation;
pub mod party;
pub mod signaling;
pub mod transport;

pub use error::PartyError;
pub use liveness::LivenessConfig;
pub use negotiation::{NegotiationState, PeerSnapshot};
pub use party::*;
pub use signaling::*;
pub use transport::*;
