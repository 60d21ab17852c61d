use crate::signaling::RelayOutput;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use party_core::RelayMessage;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Relay transport over a WebSocket carrying JSON text frames.
#[derive(Clone)]
pub struct WsRelay {
    tx: mpsc::UnboundedSender<Message>,
}

impl WsRelay {
    /// Connects to the relay. The returned receiver yields every decodable
    /// inbound message and ends when the socket closes.
    pub async fn connect(url: &str) -> Result<(Self, mpsc::Receiver<RelayMessage>)> {
        let (socket, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to relay at {url}"))?;
        info!("Connected to relay {}", url);

        let (mut sender, mut receiver) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        let (inbound_tx, inbound_rx) = mpsc::channel(256);

        let send_task = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if sender.send(msg).await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(frame) = receiver.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        let Some(msg) = decode_frame(text.as_str()) else {
                            continue;
                        };
                        if inbound_tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay socket error: {}", e);
                        break;
                    }
                }
            }

            send_task.abort();
            info!("Relay connection closed");
        });

        Ok((Self { tx }, inbound_rx))
    }
}

#[async_trait]
impl RelayOutput for WsRelay {
    async fn send(&self, message: RelayMessage) {
        debug!("Relay OUT: {}", message.event());
        match serde_json::to_string(&message) {
            Ok(json) => {
                if let Err(e) = self.tx.send(Message::Text(json.into())) {
                    error!("Failed to queue relay message {}: {:?}", message.event(), e);
                }
            }
            Err(e) => error!("Failed to serialize relay message: {}", e),
        }
    }
}

fn decode_frame(text: &str) -> Option<RelayMessage> {
    match serde_json::from_str::<RelayMessage>(text) {
        Ok(msg) => {
            debug!("Relay IN: {}", msg.event());
            Some(msg)
        }
        Err(e) => {
            warn!("Invalid relay message: {}. Text: {}", e, text);
            None
        }
    }
}
