use crate::transport::ConnectionKey;
use anyhow::Result;

/// Result of an asynchronous negotiation step, posted back to the driver.
#[derive(Debug)]
pub(crate) enum NegotiationOutcome {
    OfferCreated {
        key: ConnectionKey,
        result: Result<String>,
    },

    /// `local_sdp` is what gets relayed, whether or not `result` succeeded.
    AnswerCreated {
        key: ConnectionKey,
        result: Result<String>,
        local_sdp: Option<String>,
    },

    AnswerApplied {
        key: ConnectionKey,
        result: Result<()>,
    },
}

impl NegotiationOutcome {
    pub(crate) fn key(&self) -> &ConnectionKey {
        match self {
            NegotiationOutcome::OfferCreated { key, .. }
            | NegotiationOutcome::AnswerCreated { key, .. }
            | NegotiationOutcome::AnswerApplied { key, .. } => key,
        }
    }
}
