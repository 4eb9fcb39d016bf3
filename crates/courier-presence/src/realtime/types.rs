//! Configuration, wire format, and event/command enums for the realtime
//! connection.

use serde::{Deserialize, Serialize};

/// Event name for driver location pushes.
pub const DRIVER_LOCATION_EVENT: &str = "driver:location";

/// Configuration for the tracking gateway connection.
#[derive(Clone)]
pub struct RealtimeConfig {
    /// WebSocket URL (e.g., "wss://rt.example.com/ws").
    pub url: String,
    /// Bearer token, passed as a query parameter on connect.
    pub token: String,
    /// Reconnect base delay in seconds.
    pub reconnect_delay_secs: u64,
    /// Maximum reconnect delay in seconds.
    pub max_reconnect_delay_secs: u64,
}

impl std::fmt::Debug for RealtimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .field("max_reconnect_delay_secs", &self.max_reconnect_delay_secs)
            .finish()
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
        }
    }
}

impl RealtimeConfig {
    pub(crate) fn ws_url(&self) -> String {
        format!("{}?token={}", self.url, self.token)
    }
}

/// JSON envelope for messages on the tracking connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEvent {
    pub event: String,
    pub payload: serde_json::Value,
}

/// Events emitted by the realtime client.
#[derive(Debug, Clone)]
pub enum RealtimeEvent {
    /// WebSocket connection established.
    Connected,
    /// WebSocket connection lost.
    Disconnected,
    /// Error.
    Error(String),
}

/// Commands sent to the realtime connection task.
#[derive(Debug)]
pub(crate) enum RealtimeCommand {
    Send {
        event: String,
        payload: serde_json::Value,
    },
    Disconnect,
}
