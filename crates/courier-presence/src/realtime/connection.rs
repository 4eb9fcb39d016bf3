//! Background WebSocket connection loop with auto-reconnect.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use super::types::{RealtimeCommand, RealtimeConfig, RealtimeEvent, WireEvent};

/// Background task managing the WebSocket connection with auto-reconnect.
///
/// Exits only on an explicit `Disconnect` command (or when every command
/// sender is dropped); connection failures feed the reconnect loop.
pub(crate) async fn connection_loop(
    config: RealtimeConfig,
    connected: Arc<RwLock<bool>>,
    event_tx: mpsc::Sender<RealtimeEvent>,
    mut command_rx: mpsc::Receiver<RealtimeCommand>,
) {
    let mut reconnect_delay = config.reconnect_delay_secs;

    'outer: loop {
        let url = config.ws_url();
        info!(url = %url.split('?').next().unwrap_or(""), "connecting to tracking gateway");

        match tokio::time::timeout(
            Duration::from_secs(15),
            tokio_tungstenite::connect_async(&url),
        )
        .await
        {
            Ok(Ok((ws_stream, _))) => {
                reconnect_delay = config.reconnect_delay_secs;
                *connected.write().await = true;
                let _ = event_tx.send(RealtimeEvent::Connected).await;

                let (mut ws_write, mut ws_read) = ws_stream.split();

                loop {
                    tokio::select! {
                        cmd = command_rx.recv() => match cmd {
                            Some(RealtimeCommand::Send { event, payload }) => {
                                let frame = WireEvent { event, payload };
                                match serde_json::to_string(&frame) {
                                    Ok(json) => {
                                        if ws_write.send(WsMessage::Text(json.into())).await.is_err() {
                                            warn!("send failed, dropping connection");
                                            break;
                                        }
                                    }
                                    Err(e) => warn!(error = %e, "unserializable frame dropped"),
                                }
                            }
                            Some(RealtimeCommand::Disconnect) | None => {
                                let _ = ws_write.send(WsMessage::Close(None)).await;
                                *connected.write().await = false;
                                let _ = event_tx.send(RealtimeEvent::Disconnected).await;
                                break 'outer;
                            }
                        },
                        msg = ws_read.next() => match msg {
                            Some(Ok(WsMessage::Close(_))) => {
                                info!("tracking gateway closed connection");
                                break;
                            }
                            Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {}
                            Some(Ok(other)) => {
                                // Server-to-driver traffic is not consumed here.
                                debug!(?other, "ignoring inbound frame");
                            }
                            Some(Err(e)) => {
                                warn!(error = %e, "WebSocket error");
                                break;
                            }
                            None => {
                                info!("tracking gateway stream ended");
                                break;
                            }
                        },
                    }
                }

                *connected.write().await = false;
                let _ = event_tx.send(RealtimeEvent::Disconnected).await;
            }
            Ok(Err(e)) => {
                error!(error = %e, "failed to connect to tracking gateway");
                let _ = event_tx
                    .send(RealtimeEvent::Error(format!("connection failed: {e}")))
                    .await;
            }
            Err(_elapsed) => {
                error!("WebSocket connection timed out after 15s");
                let _ = event_tx
                    .send(RealtimeEvent::Error("connection timed out after 15s".into()))
                    .await;
            }
        }

        // Bounded exponential backoff before the next attempt. Commands
        // arriving while disconnected are drained: sends are dropped (no
        // queueing), a disconnect ends the loop.
        info!(delay = reconnect_delay, "reconnecting in {} seconds", reconnect_delay);
        let backoff = tokio::time::sleep(Duration::from_secs(reconnect_delay));
        tokio::pin!(backoff);
        loop {
            tokio::select! {
                _ = &mut backoff => break,
                cmd = command_rx.recv() => match cmd {
                    Some(RealtimeCommand::Send { .. }) => {
                        debug!("disconnected, frame dropped");
                    }
                    Some(RealtimeCommand::Disconnect) | None => break 'outer,
                },
            }
        }
        reconnect_delay = (reconnect_delay * 2).min(config.max_reconnect_delay_secs);
    }
}
