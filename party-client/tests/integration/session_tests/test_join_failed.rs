use party_client::PartyEvent;
use party_core::{PartyRole, RelayMessage};

use crate::integration::{create_test_party, init_tracing};
use crate::utils::{party_code, wait_for_event};

#[tokio::test]
async fn test_join_failed_resets_session() {
    init_tracing();

    let mut party = create_test_party();

    party
        .client
        .join_party(party_code("WXYZ"))
        .await
        .expect("join_party accepted");
    let request = party
        .wait_for_relay(|m| matches!(m, RelayMessage::JoinParty { .. }))
        .await;
    assert_eq!(
        request,
        RelayMessage::JoinParty {
            code: party_code("WXYZ")
        }
    );

    // The code shows while the join is pending.
    let pending = party.client.snapshot().await.unwrap();
    assert_eq!(pending.role, PartyRole::Joiner);
    assert_eq!(pending.code, Some(party_code("WXYZ")));
    assert!(!pending.confirmed);

    party.from_relay(RelayMessage::JoinFailed).await;
    let failed = wait_for_event(&mut party.events, |e| {
        matches!(e, PartyEvent::JoinFailed { .. })
    })
    .await;
    assert_eq!(
        failed,
        PartyEvent::JoinFailed {
            code: party_code("WXYZ")
        }
    );

    let snapshot = party.client.snapshot().await.unwrap();
    assert_eq!(snapshot.role, PartyRole::None);
    assert!(snapshot.code.is_none());
    assert!(snapshot.peers.is_empty());
    assert!(party.factory.connections().await.is_empty());

    // A rejected join leaves the client free to try again.
    party
        .client
        .join_party(party_code("ABCD"))
        .await
        .expect("second join accepted");
}

#[tokio::test]
async fn test_join_failed_without_pending_join_is_ignored() {
    init_tracing();

    let mut party = create_test_party();
    party.host("ABCD").await;

    party.from_relay(RelayMessage::JoinFailed).await;

    let snapshot = party.client.snapshot().await.unwrap();
    assert_eq!(snapshot.role, PartyRole::Host);
    assert_eq!(snapshot.code, Some(party_code("ABCD")));
}
