// Live channel - WebSocket subscription feeding pushed snapshots into the dashboard
use crate::application::dashboard_service::DashboardService;
use crate::domain::snapshot::LiveSnapshot;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;

const UPDATE_KIND: &str = "update";

/// Decode one text frame. `Ok(None)` for well-formed frames that are not
/// `{"type": "update", "data": {...}}`.
pub fn decode_live_message(text: &str) -> Result<Option<LiveSnapshot>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("type").and_then(|t| t.as_str()) != Some(UPDATE_KIND) {
        return Ok(None);
    }
    match value.get("data") {
        Some(data) => serde_json::from_value(data.clone()).map(Some),
        None => Ok(Some(LiveSnapshot::default())),
    }
}

pub struct LiveChannel {
    url: String,
    reconnect_delay: Duration,
}

impl LiveChannel {
    pub fn new(url: String, reconnect_delay: Duration) -> Self {
        Self {
            url,
            reconnect_delay,
        }
    }

    /// Stay subscribed until `shutdown` flips, reconnecting after a fixed delay
    /// whenever the connection drops.
    pub async fn run(self, dashboard: DashboardService, mut shutdown: watch::Receiver<bool>) {
        loop {
            match self.connect_once(&dashboard, &mut shutdown).await {
                Ok(true) => break,
                Ok(false) => tracing::info!("[WS] Disconnected from {}", self.url),
                Err(e) => tracing::warn!("[WS] Error on {}: {}", self.url, e),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }
        }
        tracing::info!("[WS] Live channel closed");
    }

    /// Returns `Ok(true)` when the channel was closed because of shutdown,
    /// including while the handshake is still pending.
    async fn connect_once(
        &self,
        dashboard: &DashboardService,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<bool, tokio_tungstenite::tungstenite::Error> {
        let (stream, _) = tokio::select! {
            connected = tokio_tungstenite::connect_async(self.url.as_str()) => connected?,
            _ = shutdown_requested(shutdown) => return Ok(true),
        };
        tracing::info!("[WS] Connected to {}", self.url);
        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => handle_text(&text, dashboard).await,
                    Some(Ok(Message::Close(_))) | None => return Ok(false),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e),
                },
                _ = shutdown_requested(shutdown) => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(true);
                }
            }
        }
    }
}

/// Resolves once shutdown is set, or its sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn handle_text(text: &str, dashboard: &DashboardService) {
    match decode_live_message(text) {
        Ok(Some(snapshot)) => {
            if let Some(outcome) = dashboard.ingest_snapshot(snapshot).await {
                tracing::debug!("[WS] Snapshot {:?} -> {:?}", snapshot, outcome);
            }
        }
        Ok(None) => {}
        Err(e) => tracing::error!("[WS] Error parsing message: {}", e),
    }
}
