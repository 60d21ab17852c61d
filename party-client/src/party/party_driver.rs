use crate::PartyError;
use crate::liveness::LivenessMonitor;
use crate::negotiation::{
    NegotiationOutcome, NegotiationState, PeerRecord, PeerStep, PeerWorker, Registry,
};
use crate::party::{CloseReason, PartyCommand, PartyConfig, PartyEvent, PartySession, PartySnapshot};
use crate::signaling::RelayOutput;
use crate::transport::{ConnectionFactory, ConnectionKey, TransportEvent};
use anyhow::Result;
use bytes::Bytes;
use party_core::{
    ChannelId, Packet, PartyRole, PeerId, PeerRole, RawChannelId, RelayMessage, SystemMessage,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

/// Single-threaded owner of the session, the registry and the probe.
///
/// Relay messages, transport callbacks, negotiation outcomes and timers
/// all funnel into one `select!` loop, so state is only ever mutated
/// between events.
pub(crate) struct PartyDriver {
    session: PartySession,
    registry: Registry,
    liveness: LivenessMonitor,
    relay: Arc<dyn RelayOutput>,
    factory: Arc<dyn ConnectionFactory>,
    events: mpsc::UnboundedSender<PartyEvent>,
    command_rx: mpsc::Receiver<PartyCommand>,
    relay_rx: mpsc::Receiver<RelayMessage>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
    outcome_rx: mpsc::UnboundedReceiver<NegotiationOutcome>,
    outcome_tx: mpsc::UnboundedSender<NegotiationOutcome>,
    grace_rx: mpsc::UnboundedReceiver<ConnectionKey>,
    grace_tx: mpsc::UnboundedSender<ConnectionKey>,
}

impl PartyDriver {
    pub(crate) fn new(
        config: PartyConfig,
        relay: Arc<dyn RelayOutput>,
        relay_rx: mpsc::Receiver<RelayMessage>,
        factory: Arc<dyn ConnectionFactory>,
        command_rx: mpsc::Receiver<PartyCommand>,
        events: mpsc::UnboundedSender<PartyEvent>,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (grace_tx, grace_rx) = mpsc::unbounded_channel();

        Self {
            session: PartySession::new(),
            registry: Registry::new(),
            liveness: LivenessMonitor::new(config.liveness),
            relay,
            factory,
            events,
            command_rx,
            relay_rx,
            transport_rx,
            transport_tx,
            outcome_rx,
            outcome_tx,
            grace_rx,
            grace_tx,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Party event loop started");
        let mut relay_open = true;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All party handles dropped. Shutting down.");
                            break;
                        }
                    }
                }

                msg = self.relay_rx.recv(), if relay_open => {
                    match msg {
                        Some(m) => self.handle_relay_message(m).await,
                        None => {
                            // Established peers keep working without the relay.
                            warn!("Relay inbound stream closed");
                            relay_open = false;
                        }
                    }
                }

                Some(evt) = self.transport_rx.recv() => {
                    self.handle_transport_event(evt).await;
                }

                Some(outcome) = self.outcome_rx.recv() => {
                    self.handle_outcome(outcome).await;
                }

                Some(key) = self.grace_rx.recv() => {
                    self.handle_grace_check(key).await;
                }

                _ = self.liveness.tick() => {
                    self.liveness.probe(&mut self.registry, &self.grace_tx).await;
                }
            }
        }

        self.teardown(CloseReason::SessionEnded).await;
        info!("Party event loop finished");
    }

    async fn handle_command(&mut self, cmd: PartyCommand) {
        match cmd {
            PartyCommand::HostParty { reply } => {
                let result = self.session.begin_host();
                if result.is_ok() {
                    info!("Requesting a new party");
                    self.relay.send(RelayMessage::CreateParty).await;
                }
                let _ = reply.send(result);
            }

            PartyCommand::JoinParty { code, reply } => {
                let result = self.session.begin_join(code.clone());
                if result.is_ok() {
                    info!("Requesting to join party {}", code);
                    self.relay.send(RelayMessage::JoinParty { code }).await;
                }
                let _ = reply.send(result);
            }

            PartyCommand::LeaveParty { reply } => {
                if !self.session.is_active() {
                    let _ = reply.send(Err(PartyError::NoActiveParty));
                    return;
                }
                info!("Leaving party");
                self.teardown(CloseReason::SessionEnded).await;
                let _ = reply.send(Ok(()));
            }

            PartyCommand::Broadcast { text, reply } => {
                let _ = reply.send(self.broadcast(text).await);
            }

            PartyCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    async fn handle_relay_message(&mut self, msg: RelayMessage) {
        debug!("Relay event {}", msg.event());

        match msg {
            RelayMessage::JoinCode { code } => {
                if !self.session.confirm_hosted(code.clone()) {
                    warn!("Unexpected join_code {}, not waiting for one", code);
                    return;
                }
                info!("Hosting party {}", code);
                self.emit(PartyEvent::PartyHosted { code });
            }

            RelayMessage::JoinFailed => {
                let Some(code) = self.session.join_failed() else {
                    warn!("Unexpected join_failed, no join pending");
                    return;
                };
                warn!("Relay rejected party code {}", code);
                self.emit(PartyEvent::JoinFailed { code });
            }

            RelayMessage::JoinSuccess {
                host_id,
                channel_id,
            } => self.handle_join_success(host_id, channel_id).await,

            RelayMessage::NewPlayer {
                peer_id,
                channel_id,
            } => self.handle_new_player(peer_id, channel_id).await,

            RelayMessage::Offer { peer_id, sdp } => {
                let Some(record) = self.registry.get_mut(&peer_id) else {
                    warn!(%peer_id, "rtc_offer for unknown peer dropped");
                    return;
                };
                if record.role() != PeerRole::Responder {
                    warn!(%peer_id, "rtc_offer for an initiator record dropped");
                    return;
                }
                record.transition(NegotiationState::OfferReceived);
                record.submit(PeerStep::ApplyOffer(sdp));
            }

            RelayMessage::Answer { peer_id, sdp } => {
                let Some(record) = self.registry.get(&peer_id) else {
                    warn!(%peer_id, "rtc_answer for unknown peer dropped");
                    return;
                };
                if record.role() != PeerRole::Initiator {
                    warn!(%peer_id, "rtc_answer for a responder record dropped");
                    return;
                }
                record.submit(PeerStep::ApplyAnswer(sdp));
            }

            RelayMessage::IceCandidate { peer_id, candidate } => {
                let Some(record) = self.registry.get(&peer_id) else {
                    warn!(%peer_id, "rtc_candidate for unknown peer dropped");
                    return;
                };
                trace!(%peer_id, "Remote candidate {}", candidate);
                record.submit(PeerStep::AddCandidate(candidate));
            }

            RelayMessage::CreateParty | RelayMessage::JoinParty { .. } => {
                warn!("Relay echoed client-only event {}", msg.event());
            }
        }
    }

    async fn handle_join_success(&mut self, host_id: PeerId, raw_channel_id: RawChannelId) {
        if !self.session.is_join_pending() {
            warn!(%host_id, "Unexpected join_success, no join pending");
            return;
        }

        let channel_id = match ChannelId::try_from(&raw_channel_id) {
            Ok(id) => id,
            Err(e) => {
                error!(%host_id, "Cannot connect to host: {}", e);
                self.session.reset();
                self.emit(PartyEvent::ConnectionError {
                    peer_id: host_id,
                    reason: e.to_string(),
                });
                self.emit(PartyEvent::PartyLeft);
                return;
            }
        };

        let Some(code) = self.session.confirm_joined(host_id.clone()) else {
            return;
        };
        info!(%host_id, %channel_id, "Joined party {}, connecting to host", code);
        self.emit(PartyEvent::Joined {
            code,
            host_id: host_id.clone(),
        });

        match self.add_peer(host_id.clone(), PeerRole::Initiator, channel_id).await {
            Ok(key) => {
                if let Some(record) = self.registry.current(&key) {
                    record.submit(PeerStep::CreateOffer);
                }
            }
            Err(e) => {
                error!(%host_id, "Connection error: {:#}", e);
                self.emit(PartyEvent::ConnectionError {
                    peer_id: host_id.clone(),
                    reason: format!("{e:#}"),
                });
                if self.session.peer_closed(&host_id) {
                    self.emit(PartyEvent::PartyLeft);
                }
            }
        }
    }

    async fn handle_new_player(&mut self, peer_id: PeerId, raw_channel_id: RawChannelId) {
        let channel_id = match ChannelId::try_from(&raw_channel_id) {
            Ok(id) => id,
            Err(e) => {
                warn!(%peer_id, "new_player dropped: {}", e);
                return;
            }
        };

        if self.session.role() != PartyRole::Host {
            debug!(%peer_id, "new_player received while not hosting");
        }
        info!(%peer_id, %channel_id, "Player joined");

        if let Err(e) = self.add_peer(peer_id.clone(), PeerRole::Responder, channel_id).await {
            warn!(%peer_id, "Failed to create connection: {:#}", e);
        }
    }

    /// Creates the connection and its record in one step, replacing any
    /// existing record for the same peer.
    async fn add_peer(
        &mut self,
        peer_id: PeerId,
        role: PeerRole,
        channel_id: ChannelId,
    ) -> Result<ConnectionKey> {
        if let Some(existing) = self.registry.get(&peer_id).map(|r| r.key().clone()) {
            warn!(%peer_id, "Replacing existing connection");
            self.close_peer(&existing, CloseReason::Replaced).await;
        }

        let key = self.registry.next_key(peer_id.clone());
        let connection = self
            .factory
            .connect(key.clone(), channel_id, self.transport_tx.clone())
            .await?;
        let worker = PeerWorker::spawn(key.clone(), connection.clone(), self.outcome_tx.clone());

        self.registry
            .insert(PeerRecord::new(key.clone(), role, channel_id, connection, worker));
        self.liveness.ensure_running();
        debug!(%peer_id, %role, peers = self.registry.len(), "Peer record created");
        self.emit(PartyEvent::PeerAdded { peer_id, role });

        Ok(key)
    }

    async fn handle_outcome(&mut self, outcome: NegotiationOutcome) {
        let Some(record) = self.registry.current_mut(outcome.key()) else {
            debug!(key = %outcome.key(), "Outcome for a closed peer ignored");
            return;
        };
        let peer_id = record.peer_id().clone();

        match outcome {
            NegotiationOutcome::OfferCreated { key, result } => match result {
                Ok(sdp) => {
                    record.transition(NegotiationState::OfferCreated);
                    info!(%peer_id, "Sending offer");
                    self.relay.send(RelayMessage::Offer { peer_id, sdp }).await;
                }
                Err(e) => {
                    error!(%peer_id, "Connection error: {:#}", e);
                    self.fail_peer(&key, format!("{e:#}")).await;
                }
            },

            NegotiationOutcome::AnswerCreated {
                result, local_sdp, ..
            } => {
                match result {
                    Ok(_) => {
                        record.transition(NegotiationState::AnswerCreated);
                    }
                    Err(e) => {
                        error!(%peer_id, "Answer creation failed, relaying current description: {:#}", e);
                    }
                }
                info!(%peer_id, "Sending answer");
                self.relay
                    .send(RelayMessage::Answer {
                        peer_id,
                        sdp: local_sdp.unwrap_or_default(),
                    })
                    .await;
            }

            NegotiationOutcome::AnswerApplied { key, result } => match result {
                Ok(()) => {
                    record.transition(NegotiationState::AnswerReceived);
                    info!(%peer_id, "Remote answer applied");
                    self.liveness.ensure_running();
                }
                Err(e) => {
                    error!(%peer_id, "Failed to apply answer: {:#}", e);
                    self.fail_peer(&key, format!("{e:#}")).await;
                }
            },
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::ChannelOpen(key) => {
                let Some(record) = self.registry.current_mut(&key) else {
                    return;
                };
                if record.transition(NegotiationState::Open) {
                    info!(peer_id = %key.peer_id, "Peer connected");
                    self.emit(PartyEvent::PeerConnected {
                        peer_id: key.peer_id,
                    });
                }
            }

            TransportEvent::ChannelClosed(key) => {
                self.close_peer(&key, CloseReason::ChannelClosed).await;
            }

            TransportEvent::Message(key, data) => {
                if self.registry.current(&key).is_none() {
                    return;
                }
                self.handle_packet(key.peer_id, &data);
            }

            TransportEvent::CandidateGenerated(key, candidate) => {
                if self.registry.current(&key).is_none() {
                    return;
                }
                trace!(peer_id = %key.peer_id, "Local candidate {}", candidate);
                self.relay
                    .send(RelayMessage::IceCandidate {
                        peer_id: key.peer_id,
                        candidate,
                    })
                    .await;
            }
        }
    }

    fn handle_packet(&self, from: PeerId, data: &Bytes) {
        match Packet::decode(data) {
            Ok(Packet::Chat(chat)) => {
                self.emit(PartyEvent::Message {
                    from,
                    text: chat.text,
                });
            }
            Ok(Packet::System(SystemMessage::KeepAlive { .. })) => {
                trace!(peer_id = %from, "Keep-alive received");
            }
            Err(e) => warn!(peer_id = %from, "Undecodable frame: {}", e),
        }
    }

    async fn handle_grace_check(&mut self, key: ConnectionKey) {
        let Some(record) = self.registry.current_mut(&key) else {
            return;
        };
        record.end_grace_check();
        if record.connection().is_channel_open() {
            return;
        }
        info!(
            peer_id = %key.peer_id,
            state = %record.state(),
            "Channel did not open in time, closing"
        );
        self.close_peer(&key, CloseReason::LivenessTimeout).await;
    }

    async fn broadcast(&mut self, text: String) -> Result<usize, PartyError> {
        let frame = Bytes::from(Packet::chat(text).encode()?);

        let open: Vec<_> = self
            .registry
            .iter()
            .map(|record| (record.peer_id().clone(), record.connection()))
            .filter(|(_, connection)| connection.is_channel_open())
            .collect();

        let mut reached = 0;
        for (peer_id, connection) in open {
            match connection.send(frame.clone()).await {
                Ok(()) => reached += 1,
                Err(e) => warn!(%peer_id, "Failed to send message: {:#}", e),
            }
        }
        Ok(reached)
    }

    async fn fail_peer(&mut self, key: &ConnectionKey, reason: String) {
        self.emit(PartyEvent::ConnectionError {
            peer_id: key.peer_id.clone(),
            reason,
        });
        self.close_peer(key, CloseReason::NegotiationFailed).await;
    }

    /// Removes and releases the record for `key`. Repeated calls are no-ops.
    async fn close_peer(&mut self, key: &ConnectionKey, reason: CloseReason) -> bool {
        let Some(record) = self.registry.remove(key) else {
            return false;
        };
        let peer_id = record.peer_id().clone();
        info!(%peer_id, "Closing peer: {}", reason);

        record.close().await;
        if self.registry.is_empty() {
            self.liveness.stop();
        }
        self.emit(PartyEvent::PeerClosed {
            peer_id: peer_id.clone(),
            reason,
        });

        if reason != CloseReason::Replaced && self.session.peer_closed(&peer_id) {
            info!(%peer_id, "Host left, party is over");
            self.emit(PartyEvent::PartyLeft);
        }
        true
    }

    async fn teardown(&mut self, reason: CloseReason) {
        self.liveness.stop();
        for record in self.registry.drain() {
            let peer_id = record.peer_id().clone();
            record.close().await;
            self.emit(PartyEvent::PeerClosed { peer_id, reason });
        }

        if self.session.is_active() {
            self.session.reset();
            self.emit(PartyEvent::PartyLeft);
        }
    }

    fn snapshot(&self) -> PartySnapshot {
        PartySnapshot {
            code: self.session.code().cloned(),
            role: self.session.role(),
            confirmed: self.session.is_confirmed(),
            peers: self.registry.snapshots(),
            probe_active: self.liveness.is_running(),
            probe_starts: self.liveness.starts(),
        }
    }

    fn emit(&self, event: PartyEvent) {
        let _ = self.events.send(event);
    }
}
