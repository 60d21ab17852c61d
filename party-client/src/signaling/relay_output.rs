use async_trait::async_trait;
use party_core::RelayMessage;

/// Outbound half of the relay transport.
///
/// Delivery is best effort: implementations log failures instead of
/// reporting them, since nothing upstream retries a relay send.
#[async_trait]
pub trait RelayOutput: Send + Sync {
    async fn send(&self, message: RelayMessage);
}
