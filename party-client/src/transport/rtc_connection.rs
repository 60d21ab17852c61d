use crate::transport::{
    ConnectionFactory, ConnectionKey, PeerConnection, TransportConfig, TransportEvent,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use party_core::ChannelId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Builds webrtc-rs connections from a shared [`TransportConfig`].
#[derive(Clone, Default)]
pub struct RtcConnectionFactory {
    config: TransportConfig,
}

impl RtcConnectionFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConnectionFactory for RtcConnectionFactory {
    async fn connect(
        &self,
        key: ConnectionKey,
        channel_id: ChannelId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerConnection>> {
        let connection = RtcConnection::new(key, channel_id, &self.config, events).await?;
        Ok(Arc::new(connection))
    }
}

pub struct RtcConnection {
    key: ConnectionKey,
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: Arc<RTCDataChannel>,
}

impl RtcConnection {
    /// Creates the peer connection and its negotiated data channel.
    /// Every callback is forwarded to `event_tx` tagged with `key`.
    pub async fn new(
        key: ConnectionKey,
        channel_id: ChannelId,
        config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        // Codecs are registered even though only a data channel is used.
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        let state_tx = event_tx.clone();
        let key_state = key.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let key = key_state.clone();

                Box::pin(async move {
                    info!(peer_id = %key.peer_id, "Peer connection state changed: {:?}", s);
                    if is_terminal(s) {
                        let _ = tx.send(TransportEvent::ChannelClosed(key)).await;
                    }
                })
            },
        ));

        // Trickle ICE: every local candidate goes out immediately.
        let ice_tx = event_tx.clone();
        let key_ice = key.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let key = key_ice.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(str_candidate) = serde_json::to_string(&json_candidate) else {
                    return;
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(key, str_candidate))
                    .await;
            })
        }));

        let data_channel = peer_connection
            .create_data_channel(
                key.peer_id.as_str(),
                Some(RTCDataChannelInit {
                    negotiated: Some(channel_id.get()),
                    ..Default::default()
                }),
            )
            .await
            .context("Failed to create negotiated data channel")?;
        debug!(peer_id = %key.peer_id, %channel_id, "Negotiated data channel created");

        let open_tx = event_tx.clone();
        let key_open = key.clone();
        data_channel.on_open(Box::new(move || {
            let tx = open_tx.clone();
            let key = key_open.clone();
            Box::pin(async move {
                info!(peer_id = %key.peer_id, "Data channel open");
                let _ = tx.send(TransportEvent::ChannelOpen(key)).await;
            })
        }));

        let close_tx = event_tx.clone();
        let key_close = key.clone();
        data_channel.on_close(Box::new(move || {
            let tx = close_tx.clone();
            let key = key_close.clone();
            Box::pin(async move {
                info!(peer_id = %key.peer_id, "Data channel closed");
                let _ = tx.send(TransportEvent::ChannelClosed(key)).await;
            })
        }));

        let msg_tx = event_tx;
        let key_msg = key.clone();
        data_channel.on_message(Box::new(move |msg: DataChannelMessage| {
            let tx = msg_tx.clone();
            let key = key_msg.clone();
            Box::pin(async move {
                let _ = tx.send(TransportEvent::Message(key, msg.data)).await;
            })
        }));

        Ok(Self {
            key,
            peer_connection,
            data_channel,
        })
    }
}

#[async_trait]
impl PeerConnection for RtcConnection {
    async fn create_offer(&self) -> Result<String> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .context("Failed to create offer")?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .context("Failed to set local description")?;
        Ok(offer.sdp)
    }

    async fn set_remote_offer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::offer(sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn set_remote_answer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::answer(sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn local_description(&self) -> Option<String> {
        self.peer_connection
            .local_description()
            .await
            .map(|desc| desc.sdp)
    }

    async fn add_ice_candidate(&self, candidate_json: String) -> Result<()> {
        let candidate: RTCIceCandidateInit =
            serde_json::from_str(&candidate_json).context("Failed to parse ICE candidate JSON")?;
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    fn is_channel_open(&self) -> bool {
        self.data_channel.ready_state() == RTCDataChannelState::Open
    }

    async fn send(&self, data: Bytes) -> Result<()> {
        self.data_channel.send(&data).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        debug!(key = %self.key, "Releasing peer connection");

        self.peer_connection
            .on_ice_candidate(Box::new(|_| Box::pin(async {})));
        self.peer_connection
            .on_peer_connection_state_change(Box::new(|_| Box::pin(async {})));
        self.data_channel.on_open(Box::new(|| Box::pin(async {})));
        self.data_channel.on_close(Box::new(|| Box::pin(async {})));
        self.data_channel.on_message(Box::new(|_| Box::pin(async {})));

        self.data_channel.close().await?;
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// `Disconnected` can still recover to `Connected`, so only these end a connection.
fn is_terminal(state: RTCPeerConnectionState) -> bool {
    matches!(
        state,
        RTCPeerConnectionState::Failed | RTCPeerConnectionState::Closed
    )
}
