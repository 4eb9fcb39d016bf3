//! Public handle for the tracking gateway connection.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};

use super::connection::connection_loop;
use super::types::{RealtimeCommand, RealtimeConfig, RealtimeEvent};
use crate::channel::LocationFeed;

/// Handle for the tracking gateway connection.
///
/// All methods are non-blocking; they send commands to the background
/// connection task.
#[derive(Clone)]
pub struct RealtimeClient {
    command_tx: mpsc::Sender<RealtimeCommand>,
    connected: Arc<RwLock<bool>>,
}

impl RealtimeClient {
    /// Create a new client and start the background connection.
    /// Returns `(client, event_receiver)`.
    pub fn connect(config: RealtimeConfig) -> (Self, mpsc::Receiver<RealtimeEvent>) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (command_tx, command_rx) = mpsc::channel(64);
        let connected = Arc::new(RwLock::new(false));

        let client = Self {
            command_tx,
            connected: Arc::clone(&connected),
        };

        tokio::spawn(connection_loop(config, connected, event_tx, command_rx));

        (client, event_rx)
    }

    /// Check if connected.
    pub async fn is_connected(&self) -> bool {
        *self.connected.read().await
    }

    /// Send an event over the connection. Best-effort: if the connection
    /// is down the frame is dropped by the connection task, not queued.
    pub async fn send(&self, event: &str, payload: serde_json::Value) {
        let _ = self
            .command_tx
            .send(RealtimeCommand::Send {
                event: event.to_string(),
                payload,
            })
            .await;
    }

    /// Close the connection and stop the background task.
    pub async fn disconnect(&self) {
        let _ = self.command_tx.send(RealtimeCommand::Disconnect).await;
    }
}

#[async_trait]
impl LocationFeed for RealtimeClient {
    async fn is_connected(&self) -> bool {
        RealtimeClient::is_connected(self).await
    }

    async fn send_location(&self, payload: serde_json::Value) {
        self.send(super::types::DRIVER_LOCATION_EVENT, payload).await;
    }
}
