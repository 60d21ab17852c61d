use thiserror::Error;

#[derive(Debug, Error)]
pub enum PartyError {
    #[error("a party is already active")]
    PartyActive,

    #[error("no active party")]
    NoActiveParty,

    #[error("failed to encode frame: {0}")]
    Encode(#[from] postcard::Error),

    #[error("party driver has shut down")]
    DriverClosed,
}
