//! Dual-channel location publisher.
//!
//! Each sample is pushed over two independent transports: a REST call to
//! the persistence endpoint and, when connected, a send on the tracking
//! gateway connection. No ordering or delivery guarantee holds between
//! the two, and neither blocks the other. Freshness beats completeness:
//! a new sample arrives every few seconds, so a dropped one is never
//! retried or queued.

use std::sync::Arc;

use async_trait::async_trait;
use courier_common::{DriverId, LocationSample};
use tracing::{debug, warn};

use crate::api::{DispatchApi, LocationUpdate};

/// The persistent-connection seam, kept narrow so tests can observe
/// sends and the absence of queueing.
#[async_trait]
pub trait LocationFeed: Send + Sync {
    async fn is_connected(&self) -> bool;
    async fn send_location(&self, payload: serde_json::Value);
}

/// Stateless fan-out of location samples to both transports.
pub struct PresenceChannel {
    api: Arc<dyn DispatchApi>,
    feed: Arc<dyn LocationFeed>,
    driver_id: DriverId,
}

impl PresenceChannel {
    pub fn new(api: Arc<dyn DispatchApi>, feed: Arc<dyn LocationFeed>, driver_id: DriverId) -> Self {
        Self {
            api,
            feed,
            driver_id,
        }
    }

    /// Publish one sample, fire-and-forget.
    ///
    /// The REST leg runs in its own task; a failure is logged and dropped
    /// (the next periodic sample supersedes it). The realtime leg is
    /// skipped entirely while disconnected — reconnection is the
    /// connection's own concern.
    pub async fn publish(&self, sample: &LocationSample) {
        let update = LocationUpdate {
            latitude: sample.lat,
            longitude: sample.lng,
            driver_id: self.driver_id.0.clone(),
        };
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            if let Err(e) = api.push_location(&update).await {
                warn!(error = %e, "location post failed, sample dropped");
            }
        });

        if self.feed.is_connected().await {
            let payload = serde_json::json!({
                "lat": sample.lat,
                "lng": sample.lng,
                "timestamp": sample.timestamp_ms,
            });
            self.feed.send_location(payload).await;
        } else {
            debug!("realtime disconnected, sample not sent on feed");
        }
    }
}
