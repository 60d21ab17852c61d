use party_client::PartyEvent;
use party_core::{PartyRole, PeerId, RawChannelId, RelayMessage};
use serde_json::json;

use crate::integration::{create_test_party, init_tracing};
use crate::utils::{collect_until, party_code};

#[tokio::test]
async fn test_join_success_with_invalid_channel_fails_party() {
    init_tracing();

    let mut party = create_test_party();
    let host = PeerId::from("H1");

    party
        .client
        .join_party(party_code("ABCD"))
        .await
        .unwrap();
    party
        .from_relay(RelayMessage::JoinSuccess {
            host_id: host.clone(),
            channel_id: 65535u64.into(),
        })
        .await;

    let seen = collect_until(&mut party.events, |e| matches!(e, PartyEvent::PartyLeft)).await;
    assert!(seen.iter().any(|e| matches!(
        e,
        PartyEvent::ConnectionError { peer_id, reason }
            if peer_id == &host && reason.contains("65535")
    )));
    assert!(
        !seen
            .iter()
            .any(|e| matches!(e, PartyEvent::PeerAdded { .. } | PartyEvent::Joined { .. }))
    );

    let snapshot = party.client.snapshot().await.unwrap();
    assert_eq!(snapshot.role, PartyRole::None);
    assert!(snapshot.code.is_none());
    assert!(snapshot.peers.is_empty());
    assert!(party.factory.connections().await.is_empty());
    assert_eq!(party.relay.count("rtc_offer").await, 0);
}

#[tokio::test]
async fn test_join_success_with_malformed_channel_fails_party() {
    init_tracing();

    let mut party = create_test_party();
    let host = PeerId::from("H1");

    for (raw, shown) in [(json!(-1), "-1"), (json!("abc123"), "abc123")] {
        party
            .client
            .join_party(party_code("ABCD"))
            .await
            .unwrap();
        party
            .from_relay(RelayMessage::JoinSuccess {
                host_id: host.clone(),
                channel_id: RawChannelId::from(raw),
            })
            .await;

        let seen = collect_until(&mut party.events, |e| matches!(e, PartyEvent::PartyLeft)).await;
        assert!(seen.iter().any(|e| matches!(
            e,
            PartyEvent::ConnectionError { peer_id, reason }
                if peer_id == &host && reason.contains(shown)
        )));

        let snapshot = party.client.snapshot().await.unwrap();
        assert_eq!(snapshot.role, PartyRole::None);
        assert!(!snapshot.confirmed);
    }

    // The session is free again, so a new party can start.
    party.client.host_party().await.unwrap();
    assert!(party.factory.connections().await.is_empty());
}

#[tokio::test]
async fn test_new_player_with_invalid_channel_is_dropped() {
    init_tracing();

    let mut party = create_test_party();
    party.host("ABCD").await;

    party
        .from_relay(RelayMessage::NewPlayer {
            peer_id: PeerId::from("P2"),
            channel_id: 70000u64.into(),
        })
        .await;
    party
        .from_relay(RelayMessage::NewPlayer {
            peer_id: PeerId::from("P4"),
            channel_id: RawChannelId::from("socket-id"),
        })
        .await;
    let p3 = PeerId::from("P3");
    party.add_player(&p3, 65534).await;

    let snapshot = party.client.snapshot().await.unwrap();
    assert_eq!(snapshot.peers.len(), 1);
    assert_eq!(snapshot.peers[0].peer_id, p3);
    assert_eq!(snapshot.peers[0].channel_id.get(), 65534);
    assert_eq!(snapshot.role, PartyRole::Host);
}
