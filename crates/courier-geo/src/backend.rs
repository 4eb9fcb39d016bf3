//! The platform geolocation capability boundary.

use async_trait::async_trait;
use courier_common::{LocationSample, PlatformHint};
use tokio::sync::mpsc;

use crate::types::SampleConfig;

/// Platform fault codes (matching the standard geolocation API).
pub const FAULT_PERMISSION_DENIED: i32 = 1;
pub const FAULT_POSITION_UNAVAILABLE: i32 = 2;
pub const FAULT_TIMEOUT: i32 = 3;

/// A raw fault from the platform capability, before mapping into the
/// closed `LocationError` taxonomy.
#[derive(Debug, Clone)]
pub struct BackendFault {
    pub code: i32,
    pub message: String,
}

impl BackendFault {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Updates emitted by a backend watch. A `Fault` does not end the watch;
/// the platform may recover on the next fix.
#[derive(Debug, Clone)]
pub enum WatchUpdate {
    Fix(LocationSample),
    Fault(BackendFault),
}

/// Device geolocation capability.
///
/// Implementations push watch updates into the provided channel from
/// whatever callback or polling mechanism the platform offers, and
/// identify each watch with the returned id so `stop_watch` can target it.
#[async_trait]
pub trait GeoBackend: Send + Sync {
    /// Whether the capability exists on this device at all.
    fn supported(&self) -> bool {
        true
    }

    /// Platform family, used only for user-facing permission guidance.
    fn platform(&self) -> PlatformHint {
        PlatformHint::Other
    }

    /// Resolve a single best-effort fix.
    async fn current_position(&self, config: &SampleConfig)
        -> Result<LocationSample, BackendFault>;

    /// Begin a watch, pushing updates into `updates`. Returns the
    /// backend's watch id.
    fn start_watch(&self, config: &SampleConfig, updates: mpsc::Sender<WatchUpdate>) -> u64;

    /// Stop a watch by id. Unknown ids are ignored.
    fn stop_watch(&self, id: u64);
}
