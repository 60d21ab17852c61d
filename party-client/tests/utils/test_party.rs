use party_client::{LivenessConfig, PartyClient, PartyConfig, PartyEvent};
use party_core::{PartyCode, PeerId, RelayMessage};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::event_helpers::wait_for_event;
use super::mock_connection::{MockBehavior, MockConnectionFactory};
use super::mock_relay::MockRelayOutput;

/// A party client wired to a mock relay and mock connections.
pub struct TestParty {
    pub client: PartyClient,
    pub events: mpsc::UnboundedReceiver<PartyEvent>,
    pub relay: MockRelayOutput,
    /// Messages the party sent to the relay.
    pub relay_out: mpsc::UnboundedReceiver<RelayMessage>,
    /// Push relay messages into the party.
    pub relay_in: mpsc::Sender<RelayMessage>,
    pub factory: MockConnectionFactory,
}

impl TestParty {
    pub fn spawn(behavior: MockBehavior, liveness: LivenessConfig) -> Self {
        Self::with_factory(MockConnectionFactory::new(behavior), liveness)
    }

    pub fn with_factory(factory: MockConnectionFactory, liveness: LivenessConfig) -> Self {
        let (relay, relay_out) = MockRelayOutput::new();
        let (relay_in, relay_rx) = mpsc::channel(100);

        let config = PartyConfig {
            liveness,
            ..Default::default()
        };
        let (client, events) = PartyClient::spawn(
            config,
            Arc::new(relay.clone()),
            relay_rx,
            Arc::new(factory.clone()),
        );

        Self {
            client,
            events,
            relay,
            relay_out,
            relay_in,
            factory,
        }
    }

    /// Deliver a message as if it came from the relay.
    pub async fn from_relay(&self, message: RelayMessage) {
        self.relay_in
            .send(message)
            .await
            .expect("party is reading relay messages");
    }

    /// Host a party and confirm it with `code`.
    pub async fn host(&mut self, code: &str) {
        self.client.host_party().await.expect("host_party accepted");
        self.from_relay(RelayMessage::JoinCode { code: party_code(code) })
            .await;
        wait_for_event(&mut self.events, |e| matches!(e, PartyEvent::PartyHosted { .. })).await;
    }

    /// Join `code` and have the relay accept it with `host_id` on `channel_id`.
    pub async fn join(&mut self, code: &str, host_id: &PeerId, channel_id: u64) {
        self.client
            .join_party(party_code(code))
            .await
            .expect("join_party accepted");
        self.from_relay(RelayMessage::JoinSuccess {
            host_id: host_id.clone(),
            channel_id: channel_id.into(),
        })
        .await;
        wait_for_event(&mut self.events, |e| {
            matches!(e, PartyEvent::PeerAdded { peer_id, .. } if peer_id == host_id)
        })
        .await;
    }

    /// Announce a new player and wait until its record exists.
    pub async fn add_player(&mut self, peer_id: &PeerId, channel_id: u64) {
        self.from_relay(RelayMessage::NewPlayer {
            peer_id: peer_id.clone(),
            channel_id: channel_id.into(),
        })
        .await;
        wait_for_event(&mut self.events, |e| {
            matches!(e, PartyEvent::PeerAdded { peer_id: id, .. } if id == peer_id)
        })
        .await;
    }

    /// Wait until the party sends a relay message matching `pred`.
    pub async fn wait_for_relay<F>(&mut self, pred: F) -> RelayMessage
    where
        F: Fn(&RelayMessage) -> bool,
    {
        let wait = async {
            while let Some(message) = self.relay_out.recv().await {
                if pred(&message) {
                    return message;
                }
            }
            panic!("relay output closed");
        };
        tokio::time::timeout(std::time::Duration::from_millis(2000), wait)
            .await
            .expect("timed out waiting for relay message")
    }
}

pub fn party_code(code: &str) -> PartyCode {
    PartyCode::parse(code).expect("valid party code")
}
