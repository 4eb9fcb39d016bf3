//! Persistent tracking connection.
//!
//! A background WebSocket connection to the tracking gateway with
//! auto-reconnect. Sends are fire-and-forget; nothing is queued while
//! disconnected — the next periodic sample supersedes anything dropped.

mod client;
mod connection;
mod types;

pub use client::RealtimeClient;
pub use types::{RealtimeConfig, RealtimeEvent, DRIVER_LOCATION_EVENT};
