use std::fmt;

/// Per-peer negotiation progress.
///
/// Initiators go `New -> OfferCreated -> AnswerReceived`, responders go
/// `New -> OfferReceived -> AnswerCreated`. The data channel may open at any
/// point of that handshake, and an `Open` record never falls back to an SDP
/// state. `Closed` is terminal and reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    OfferCreated,
    OfferReceived,
    AnswerCreated,
    AnswerReceived,
    Open,
    Closed,
}

impl NegotiationState {
    pub fn can_transition_to(self, next: NegotiationState) -> bool {
        use NegotiationState::*;

        match (self, next) {
            (Closed, _) => false,
            (_, Closed) => true,
            (Open, _) => false,
            (_, Open) => true,
            (New, OfferCreated | OfferReceived) => true,
            (OfferCreated, AnswerReceived) => true,
            (OfferReceived, AnswerCreated) => true,
            _ => false,
        }
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::New => "new",
            NegotiationState::OfferCreated => "offer-created",
            NegotiationState::OfferReceived => "offer-received",
            NegotiationState::AnswerCreated => "answer-created",
            NegotiationState::AnswerReceived => "answer-received",
            NegotiationState::Open => "open",
            NegotiationState::Closed => "closed",
        };
        f.write_str(name)
    }
}
