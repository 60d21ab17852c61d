use party_client::{CloseReason, PartyError, PartyEvent};
use party_core::{PartyRole, PeerId};

use crate::integration::{create_test_party, init_tracing};
use crate::utils::collect_until;

#[tokio::test]
async fn test_leave_without_party_fails() {
    init_tracing();

    let party = create_test_party();

    assert!(matches!(
        party.client.leave_party().await,
        Err(PartyError::NoActiveParty)
    ));
}

#[tokio::test]
async fn test_leave_closes_every_peer() {
    init_tracing();

    let mut party = create_test_party();
    party.host("ABCD").await;

    let p2 = PeerId::from("P2");
    let p3 = PeerId::from("P3");
    party.add_player(&p2, 2).await;
    party.add_player(&p3, 3).await;

    party.client.leave_party().await.expect("leave accepted");

    let seen = collect_until(&mut party.events, |e| matches!(e, PartyEvent::PartyLeft)).await;
    for peer_id in [&p2, &p3] {
        assert!(seen.contains(&PartyEvent::PeerClosed {
            peer_id: peer_id.clone(),
            reason: CloseReason::SessionEnded,
        }));
    }

    for connection in party.factory.connections().await {
        assert!(connection.is_closed());
    }

    let snapshot = party.client.snapshot().await.unwrap();
    assert_eq!(snapshot.role, PartyRole::None);
    assert!(snapshot.code.is_none());
    assert!(snapshot.peers.is_empty());
    assert!(!snapshot.probe_active);

    assert!(matches!(
        party.client.leave_party().await,
        Err(PartyError::NoActiveParty)
    ));
}
