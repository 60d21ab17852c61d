use crate::negotiation::Registry;
use crate::transport::ConnectionKey;
use bytes::Bytes;
use party_core::Packet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LivenessConfig {
    /// Period of the registry-wide probe.
    pub probe_interval: Duration,
    /// How long a channel may stay unopened before its peer is closed.
    pub open_grace: Duration,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_millis(1000),
            open_grace: Duration::from_millis(3000),
        }
    }
}

/// Single repeating probe over the whole registry.
///
/// Open channels get a keep-alive frame; unopened ones get one delayed
/// grace check, delivered back to the driver as a [`ConnectionKey`].
pub(crate) struct LivenessMonitor {
    config: LivenessConfig,
    probe: Option<Interval>,
    starts: u64,
}

impl LivenessMonitor {
    pub(crate) fn new(config: LivenessConfig) -> Self {
        Self {
            config,
            probe: None,
            starts: 0,
        }
    }

    /// Starts the probe unless it is already running. Returns true if it was started.
    pub(crate) fn ensure_running(&mut self) -> bool {
        if self.probe.is_some() {
            return false;
        }
        let period = self.config.probe_interval;
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.probe = Some(interval);
        self.starts += 1;
        debug!("Liveness probe started");
        true
    }

    pub(crate) fn stop(&mut self) {
        if self.probe.take().is_some() {
            debug!("Liveness probe stopped");
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.probe.is_some()
    }

    pub(crate) fn starts(&self) -> u64 {
        self.starts
    }

    /// Resolves on the next probe tick; never resolves while stopped.
    pub(crate) async fn tick(&mut self) {
        match self.probe.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    pub(crate) async fn probe(
        &self,
        registry: &mut Registry,
        grace_tx: &mpsc::UnboundedSender<ConnectionKey>,
    ) {
        let frame = match Packet::keep_alive(unix_millis()).encode() {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                warn!("Failed to encode keep-alive: {}", e);
                return;
            }
        };

        let mut open = Vec::new();
        for record in registry.iter_mut() {
            let connection = record.connection();
            if connection.is_channel_open() {
                open.push((record.peer_id().clone(), connection));
                continue;
            }

            if !record.begin_grace_check() {
                continue;
            }
            debug!(
                peer_id = %record.peer_id(),
                state = %record.state(),
                "Channel not open, scheduling grace check"
            );
            let key = record.key().clone();
            let tx = grace_tx.clone();
            let grace = self.config.open_grace;
            tokio::spawn(async move {
                time::sleep(grace).await;
                let _ = tx.send(key);
            });
        }

        for (peer_id, connection) in open {
            if let Err(e) = connection.send(frame.clone()).await {
                debug!(%peer_id, "Keep-alive not sent: {:#}", e);
            }
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
