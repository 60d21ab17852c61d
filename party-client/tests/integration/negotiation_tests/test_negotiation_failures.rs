use party_client::{CloseReason, PartyEvent};
use party_core::{PartyRole, PeerId, RelayMessage};

use crate::integration::{create_test_party_with, init_tracing};
use crate::utils::{MockBehavior, collect_until, party_code};

#[tokio::test]
async fn test_offer_failure_closes_host_and_ends_party() {
    init_tracing();

    let mut party = create_test_party_with(MockBehavior {
        fail_offer: true,
        ..Default::default()
    });
    let host = PeerId::from("H1");
    party.join("ABCD", &host, 7).await;

    let seen = collect_until(&mut party.events, |e| matches!(e, PartyEvent::PartyLeft)).await;
    assert!(matches!(
        &seen[0],
        PartyEvent::ConnectionError { peer_id, .. } if peer_id == &host
    ));
    assert!(seen.contains(&PartyEvent::PeerClosed {
        peer_id: host.clone(),
        reason: CloseReason::NegotiationFailed,
    }));

    assert_eq!(party.relay.count("rtc_offer").await, 0);
    assert!(party.factory.connection_for(&host).await.is_closed());

    let snapshot = party.client.snapshot().await.unwrap();
    assert!(snapshot.peers.is_empty());
    assert_eq!(snapshot.role, PartyRole::None);
    assert!(!snapshot.probe_active);
}

#[tokio::test]
async fn test_rejected_answer_closes_host() {
    init_tracing();

    let mut party = create_test_party_with(MockBehavior {
        fail_remote_answer: true,
        ..Default::default()
    });
    let host = PeerId::from("H1");
    party.join("ABCD", &host, 7).await;
    party
        .wait_for_relay(|m| matches!(m, RelayMessage::Offer { .. }))
        .await;

    party
        .from_relay(RelayMessage::Answer {
            peer_id: host.clone(),
            sdp: "bad-answer".to_string(),
        })
        .await;

    let seen = collect_until(&mut party.events, |e| matches!(e, PartyEvent::PartyLeft)).await;
    assert!(seen.contains(&PartyEvent::PeerClosed {
        peer_id: host,
        reason: CloseReason::NegotiationFailed,
    }));
}

#[tokio::test]
async fn test_connect_failure_ends_join() {
    init_tracing();

    let mut party = create_test_party_with(MockBehavior {
        fail_connect: true,
        ..Default::default()
    });
    let host = PeerId::from("H1");

    party
        .client
        .join_party(party_code("ABCD"))
        .await
        .unwrap();
    party
        .from_relay(RelayMessage::JoinSuccess {
            host_id: host.clone(),
            channel_id: 7u64.into(),
        })
        .await;

    let seen = collect_until(&mut party.events, |e| matches!(e, PartyEvent::PartyLeft)).await;
    assert!(matches!(&seen[0], PartyEvent::Joined { .. }));
    assert!(matches!(
        &seen[1],
        PartyEvent::ConnectionError { peer_id, .. } if peer_id == &host
    ));
    assert!(
        !seen
            .iter()
            .any(|e| matches!(e, PartyEvent::PeerAdded { .. }))
    );

    let snapshot = party.client.snapshot().await.unwrap();
    assert!(snapshot.peers.is_empty());
    assert_eq!(snapshot.role, PartyRole::None);
}
