use crate::negotiation::{NegotiationState, PeerStep, PeerWorker};
use crate::transport::{ConnectionKey, PeerConnection};
use party_core::{ChannelId, PeerId, PeerRole};
use std::sync::Arc;
use tracing::{debug, warn};

/// Point-in-time view of a peer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSnapshot {
    pub peer_id: PeerId,
    pub role: PeerRole,
    pub channel_id: ChannelId,
    pub state: NegotiationState,
}

/// Everything held for one remote participant. The connection and its
/// worker are owned exclusively by the record.
pub(crate) struct PeerRecord {
    key: ConnectionKey,
    role: PeerRole,
    channel_id: ChannelId,
    state: NegotiationState,
    connection: Arc<dyn PeerConnection>,
    worker: PeerWorker,
    grace_check_pending: bool,
}

impl PeerRecord {
    pub(crate) fn new(
        key: ConnectionKey,
        role: PeerRole,
        channel_id: ChannelId,
        connection: Arc<dyn PeerConnection>,
        worker: PeerWorker,
    ) -> Self {
        Self {
            key,
            role,
            channel_id,
            state: NegotiationState::New,
            connection,
            worker,
            grace_check_pending: false,
        }
    }

    pub(crate) fn key(&self) -> &ConnectionKey {
        &self.key
    }

    pub(crate) fn peer_id(&self) -> &PeerId {
        &self.key.peer_id
    }

    pub(crate) fn role(&self) -> PeerRole {
        self.role
    }

    pub(crate) fn state(&self) -> NegotiationState {
        self.state
    }

    pub(crate) fn connection(&self) -> Arc<dyn PeerConnection> {
        self.connection.clone()
    }

    /// Applies `next` if the state machine allows it.
    pub(crate) fn transition(&mut self, next: NegotiationState) -> bool {
        if !self.state.can_transition_to(next) {
            debug!(
                peer_id = %self.key.peer_id,
                "Ignoring transition {} -> {}", self.state, next
            );
            return false;
        }
        debug!(peer_id = %self.key.peer_id, "Negotiation {} -> {}", self.state, next);
        self.state = next;
        true
    }

    pub(crate) fn submit(&self, step: PeerStep) {
        if !self.worker.submit(step) {
            warn!(peer_id = %self.key.peer_id, "Peer worker is gone, step dropped");
        }
    }

    /// Marks a grace check as scheduled. Returns false if one is already pending.
    pub(crate) fn begin_grace_check(&mut self) -> bool {
        if self.grace_check_pending {
            return false;
        }
        self.grace_check_pending = true;
        true
    }

    pub(crate) fn end_grace_check(&mut self) {
        self.grace_check_pending = false;
    }

    pub(crate) fn snapshot(&self) -> PeerSnapshot {
        PeerSnapshot {
            peer_id: self.key.peer_id.clone(),
            role: self.role,
            channel_id: self.channel_id,
            state: self.state,
        }
    }

    /// Stops the worker and releases the connection.
    pub(crate) async fn close(mut self) {
        self.transition(NegotiationState::Closed);
        drop(self.worker);
        if let Err(e) = self.connection.close().await {
            warn!(peer_id = %self.key.peer_id, "Error while closing connection: {:#}", e);
        }
    }
}
