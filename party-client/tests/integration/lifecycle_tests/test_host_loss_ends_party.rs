use party_client::{CloseReason, PartyEvent};
use party_core::{PartyRole, PeerId};

use crate::integration::{create_test_party, init_tracing};
use crate::utils::{collect_until, party_code, wait_for_event};

#[tokio::test]
async fn test_host_channel_close_resets_joiner() {
    init_tracing();

    let mut party = create_test_party();
    let host = PeerId::from("H1");
    party.join("ABCD", &host, 7).await;

    let connection = party.factory.connection_for(&host).await;
    connection.open().await;
    wait_for_event(&mut party.events, |e| {
        matches!(e, PartyEvent::PeerConnected { .. })
    })
    .await;

    connection.remote_close().await;
    let seen = collect_until(&mut party.events, |e| matches!(e, PartyEvent::PartyLeft)).await;
    assert_eq!(
        seen,
        vec![
            PartyEvent::PeerClosed {
                peer_id: host,
                reason: CloseReason::ChannelClosed,
            },
            PartyEvent::PartyLeft,
        ]
    );

    let snapshot = party.client.snapshot().await.unwrap();
    assert_eq!(snapshot.role, PartyRole::None);
    assert!(snapshot.code.is_none());
    assert!(snapshot.peers.is_empty());

    party
        .client
        .join_party(party_code("EFGH"))
        .await
        .expect("free to join again");
}
