use std::time::Duration;

use party_client::NegotiationState;
use party_core::{PeerId, RelayMessage};

use crate::integration::{create_test_party, init_tracing};
use crate::utils::wait_for_peer_state;

#[tokio::test]
async fn test_local_candidates_are_relayed() {
    init_tracing();

    let mut party = create_test_party();
    party.host("ABCD").await;

    let p2 = PeerId::from("P2");
    party.add_player(&p2, 2).await;
    let connection = party.factory.connection_for(&p2).await;

    connection.emit_candidate("candidate:local-1").await;
    let relayed = party
        .wait_for_relay(|m| matches!(m, RelayMessage::IceCandidate { .. }))
        .await;
    assert_eq!(
        relayed,
        RelayMessage::IceCandidate {
            peer_id: p2,
            candidate: "candidate:local-1".to_string(),
        }
    );
}

#[tokio::test]
async fn test_remote_candidates_wait_for_remote_description() {
    init_tracing();

    let mut party = create_test_party();
    let host = PeerId::from("H1");
    party.join("ABCD", &host, 7).await;
    party
        .wait_for_relay(|m| matches!(m, RelayMessage::Offer { .. }))
        .await;

    party
        .from_relay(RelayMessage::IceCandidate {
            peer_id: host.clone(),
            candidate: "candidate:remote-1".to_string(),
        })
        .await;
    party
        .from_relay(RelayMessage::Answer {
            peer_id: host.clone(),
            sdp: "host-answer".to_string(),
        })
        .await;

    wait_for_peer_state(&party.client, &host, NegotiationState::AnswerReceived).await;
    let connection = party.factory.connection_for(&host).await;
    assert_eq!(
        connection.added_candidates().await,
        vec!["candidate:remote-1".to_string()]
    );

    party
        .from_relay(RelayMessage::IceCandidate {
            peer_id: host.clone(),
            candidate: "candidate:remote-2".to_string(),
        })
        .await;

    let applied = tokio::time::timeout(Duration::from_millis(2000), async {
        loop {
            let candidates = connection.added_candidates().await;
            if candidates.len() == 2 {
                return candidates;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("second candidate applied");
    assert_eq!(applied[1], "candidate:remote-2");
}
