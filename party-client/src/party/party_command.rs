use crate::PartyError;
use crate::party::PartySnapshot;
use party_core::PartyCode;
use tokio::sync::oneshot;

/// Local actions routed into the party driver.
#[derive(Debug)]
pub(crate) enum PartyCommand {
    HostParty {
        reply: oneshot::Sender<Result<(), PartyError>>,
    },

    JoinParty {
        code: PartyCode,
        reply: oneshot::Sender<Result<(), PartyError>>,
    },

    LeaveParty {
        reply: oneshot::Sender<Result<(), PartyError>>,
    },

    /// Chat text for every open channel; replies with the number of peers reached.
    Broadcast {
        text: String,
        reply: oneshot::Sender<Result<usize, PartyError>>,
    },

    Snapshot {
        reply: oneshot::Sender<PartySnapshot>,
    },
}
