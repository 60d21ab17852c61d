use crate::negotiation::NegotiationOutcome;
use crate::transport::{ConnectionKey, PeerConnection};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One signaling step for a single peer.
#[derive(Debug)]
pub(crate) enum PeerStep {
    CreateOffer,
    ApplyOffer(String),
    ApplyAnswer(String),
    AddCandidate(String),
}

/// Runs a peer's steps strictly in submission order, independent of
/// every other peer. Dropping the worker aborts any step in flight.
pub(crate) struct PeerWorker {
    steps: mpsc::UnboundedSender<PeerStep>,
    task: JoinHandle<()>,
}

impl PeerWorker {
    pub(crate) fn spawn(
        key: ConnectionKey,
        connection: Arc<dyn PeerConnection>,
        outcomes: mpsc::UnboundedSender<NegotiationOutcome>,
    ) -> Self {
        let (steps, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_steps(key, connection, rx, outcomes));
        Self { steps, task }
    }

    pub(crate) fn submit(&self, step: PeerStep) -> bool {
        self.steps.send(step).is_ok()
    }
}

impl Drop for PeerWorker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_steps(
    key: ConnectionKey,
    connection: Arc<dyn PeerConnection>,
    mut steps: mpsc::UnboundedReceiver<PeerStep>,
    outcomes: mpsc::UnboundedSender<NegotiationOutcome>,
) {
    // Candidates that arrive before the remote description are held back.
    let mut remote_applied = false;
    let mut pending_candidates = Vec::new();

    while let Some(step) = steps.recv().await {
        let outcome = match step {
            PeerStep::CreateOffer => {
                let result = connection.create_offer().await;
                Some(NegotiationOutcome::OfferCreated {
                    key: key.clone(),
                    result,
                })
            }

            PeerStep::ApplyOffer(sdp) => {
                let result = match connection.set_remote_offer(sdp).await {
                    Ok(()) => {
                        remote_applied = true;
                        connection.create_answer().await
                    }
                    Err(e) => Err(e),
                };
                let local_sdp = match &result {
                    Ok(sdp) => Some(sdp.clone()),
                    Err(_) => connection.local_description().await,
                };
                Some(NegotiationOutcome::AnswerCreated {
                    key: key.clone(),
                    result,
                    local_sdp,
                })
            }

            PeerStep::ApplyAnswer(sdp) => {
                let result = connection.set_remote_answer(sdp).await;
                if result.is_ok() {
                    remote_applied = true;
                }
                Some(NegotiationOutcome::AnswerApplied {
                    key: key.clone(),
                    result,
                })
            }

            PeerStep::AddCandidate(candidate) => {
                if remote_applied {
                    add_candidate(&key, connection.as_ref(), candidate).await;
                } else {
                    debug!(peer_id = %key.peer_id, "Holding ICE candidate until remote description is set");
                    pending_candidates.push(candidate);
                }
                None
            }
        };

        if remote_applied && !pending_candidates.is_empty() {
            for candidate in pending_candidates.drain(..) {
                add_candidate(&key, connection.as_ref(), candidate).await;
            }
        }

        if let Some(outcome) = outcome {
            if outcomes.send(outcome).is_err() {
                break;
            }
        }
    }
}

async fn add_candidate(key: &ConnectionKey, connection: &dyn PeerConnection, candidate: String) {
    if let Err(e) = connection.add_ice_candidate(candidate).await {
        warn!(peer_id = %key.peer_id, "Failed to add ICE candidate: {:#}", e);
    }
}
