use crate::PartyError;
use crate::negotiation::PeerSnapshot;
use crate::party::party_driver::PartyDriver;
use crate::party::{PartyCommand, PartyConfig, PartyEvent};
use crate::signaling::RelayOutput;
use crate::transport::ConnectionFactory;
use party_core::{PartyCode, PartyRole, PeerId, RelayMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

/// Point-in-time view of the party and its peers.
#[derive(Debug, Clone)]
pub struct PartySnapshot {
    pub code: Option<PartyCode>,
    pub role: PartyRole,
    /// False while a host or join request awaits the relay's reply.
    pub confirmed: bool,
    pub peers: Vec<PeerSnapshot>,
    pub probe_active: bool,
    /// How many times the registry probe has been started.
    pub probe_starts: u64,
}

impl PartySnapshot {
    pub fn peer(&self, peer_id: &PeerId) -> Option<&PeerSnapshot> {
        self.peers.iter().find(|peer| &peer.peer_id == peer_id)
    }
}

/// Handle to a running party driver. Cloning shares the driver; dropping
/// every handle shuts it down and releases all connections.
#[derive(Clone)]
pub struct PartyClient {
    commands: mpsc::Sender<PartyCommand>,
}

impl PartyClient {
    pub fn spawn(
        config: PartyConfig,
        relay: Arc<dyn RelayOutput>,
        relay_rx: mpsc::Receiver<RelayMessage>,
        factory: Arc<dyn ConnectionFactory>,
    ) -> (Self, mpsc::UnboundedReceiver<PartyEvent>) {
        let (command_tx, command_rx) = mpsc::channel(100);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let driver = PartyDriver::new(config, relay, relay_rx, factory, command_rx, event_tx);
        tokio::spawn(driver.run());
        info!("Party client started");

        (
            Self {
                commands: command_tx,
            },
            event_rx,
        )
    }

    /// Asks the relay for a new party. The code arrives as [`PartyEvent::PartyHosted`].
    pub async fn host_party(&self) -> Result<(), PartyError> {
        self.request(|reply| PartyCommand::HostParty { reply })
            .await?
    }

    /// Asks the relay to join `code`. The outcome arrives as
    /// [`PartyEvent::Joined`] or [`PartyEvent::JoinFailed`].
    pub async fn join_party(&self, code: PartyCode) -> Result<(), PartyError> {
        self.request(|reply| PartyCommand::JoinParty { code, reply })
            .await?
    }

    pub async fn leave_party(&self) -> Result<(), PartyError> {
        self.request(|reply| PartyCommand::LeaveParty { reply })
            .await?
    }

    /// Sends a chat line to every peer with an open channel.
    pub async fn broadcast(&self, text: impl Into<String>) -> Result<usize, PartyError> {
        let text = text.into();
        self.request(|reply| PartyCommand::Broadcast { text, reply })
            .await?
    }

    pub async fn snapshot(&self) -> Result<PartySnapshot, PartyError> {
        self.request(|reply| PartyCommand::Snapshot { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> PartyCommand,
    ) -> Result<T, PartyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| PartyError::DriverClosed)?;
        reply_rx.await.map_err(|_| PartyError::DriverClosed)
    }
}
