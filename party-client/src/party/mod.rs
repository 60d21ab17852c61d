mod party_client;
mod party_command;
mod party_config;
mod party_driver;
mod party_event;
mod party_session;

pub use party_client::*;
pub(crate) use party_command::*;
pub use party_config::*;
pub use party_event::*;
pub use party_session::*;
