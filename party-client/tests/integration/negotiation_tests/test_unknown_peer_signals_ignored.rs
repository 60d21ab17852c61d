use party_client::NegotiationState;
use party_core::{PeerId, RelayMessage};

use crate::integration::{create_test_party, init_tracing};
use crate::utils::wait_for_peer_state;

#[tokio::test]
async fn test_signals_for_unknown_peer_are_dropped() {
    init_tracing();

    let mut party = create_test_party();
    party.host("ABCD").await;

    let ghost = PeerId::from("ghost");
    party
        .from_relay(RelayMessage::IceCandidate {
            peer_id: ghost.clone(),
            candidate: "candidate:1".to_string(),
        })
        .await;
    party
        .from_relay(RelayMessage::Offer {
            peer_id: ghost.clone(),
            sdp: "offer".to_string(),
        })
        .await;
    party
        .from_relay(RelayMessage::Answer {
            peer_id: ghost.clone(),
            sdp: "answer".to_string(),
        })
        .await;

    // Relay messages are handled in order, so these were seen first.
    let p3 = PeerId::from("P3");
    party.add_player(&p3, 3).await;

    let snapshot = party.client.snapshot().await.unwrap();
    assert!(snapshot.peer(&ghost).is_none());
    assert_eq!(snapshot.peers.len(), 1);
    assert_eq!(party.factory.connections().await.len(), 1);
    assert_eq!(party.relay.count("rtc_answer").await, 0);
}

#[tokio::test]
async fn test_offer_for_initiator_is_dropped() {
    init_tracing();

    let mut party = create_test_party();
    let host = PeerId::from("H1");
    party.join("ABCD", &host, 7).await;

    party
        .from_relay(RelayMessage::Offer {
            peer_id: host.clone(),
            sdp: "unexpected-offer".to_string(),
        })
        .await;
    party
        .from_relay(RelayMessage::Answer {
            peer_id: host.clone(),
            sdp: "host-answer".to_string(),
        })
        .await;

    wait_for_peer_state(&party.client, &host, NegotiationState::AnswerReceived).await;
    assert_eq!(party.relay.count("rtc_answer").await, 0);

    let connection = party.factory.connection_for(&host).await;
    assert_eq!(
        connection.remote_description().await.as_deref(),
        Some("host-answer")
    );
}
