//! Configuration, snapshot, event, and command types for the session.

use std::time::Duration;

use courier_common::{
    DriverId, LocationError, LocationSample, PresenceError, PresenceState, RideStatus,
};
use courier_config::CourierConfig;
use courier_geo::SampleConfig;

use crate::handoff::SampleRoute;

/// Timing and identity configuration for a presence session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub driver_id: DriverId,
    /// Window within which a repeated toggle is ignored.
    pub debounce: Duration,
    /// Bound on how long an activation/deactivation may stay in flight
    /// before the session falls back to server truth.
    pub recovery_timeout: Duration,
    /// Periodic publish cadence while online.
    pub publish_interval: Duration,
    /// Tighter cadence while a ride is in progress.
    pub ride_publish_interval: Duration,
    /// Geolocation request options.
    pub sample: SampleConfig,
}

impl SessionConfig {
    pub fn new(driver_id: DriverId) -> Self {
        Self {
            driver_id,
            debounce: Duration::from_millis(500),
            recovery_timeout: Duration::from_secs(15),
            publish_interval: Duration::from_secs(5),
            ride_publish_interval: Duration::from_secs(2),
            sample: SampleConfig::default(),
        }
    }

    /// Build from the application config file.
    pub fn from_app_config(config: &CourierConfig, driver_id: DriverId) -> Self {
        Self {
            driver_id,
            debounce: Duration::from_millis(config.presence.debounce_ms),
            recovery_timeout: Duration::from_secs(config.presence.recovery_timeout_secs),
            publish_interval: Duration::from_secs(config.presence.publish_interval_secs),
            ride_publish_interval: Duration::from_secs(config.presence.ride_publish_interval_secs),
            sample: SampleConfig {
                high_accuracy: config.geolocation.high_accuracy,
                timeout_ms: config.geolocation.timeout_ms,
                maximum_age_ms: config.geolocation.maximum_age_ms,
            },
        }
    }
}

/// Read-only view of the session for the UI layer.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: PresenceState,
    pub last_error: Option<PresenceError>,
    pub last_sample: Option<LocationSample>,
    pub route: SampleRoute,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            state: PresenceState::Offline,
            last_error: None,
            last_sample: None,
            route: SampleRoute::Dashboard,
        }
    }
}

/// Events emitted to the UI. The UI is a pure observer; it owns no
/// transition logic.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged {
        from: PresenceState,
        to: PresenceState,
    },
    /// A transition failed; the session has already settled.
    Error(PresenceError),
    /// Transient watch fault while online. State unchanged.
    Warning(LocationError),
    /// A fresh fix, routed to its current consumer.
    Sample {
        route: SampleRoute,
        sample: LocationSample,
    },
}

/// Commands consumed by the session task. Public surface goes through
/// `PresenceHandle`; the `generation`-tagged variants are self-sends from
/// spawned work.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    Toggle {
        online: bool,
    },
    /// Manual retry/resync affordance.
    ForceReconcile,
    /// Unsolicited server truth (mount-time profile fetch).
    ServerTruth {
        online: bool,
    },
    RideStatus(RideStatus),
    Shutdown,

    ActivationResult {
        generation: u64,
        result: Result<LocationSample, PresenceError>,
    },
    DeactivationResult {
        generation: u64,
        result: Result<(), PresenceError>,
    },
    RecoveryTimeout {
        generation: u64,
    },
    TruthFetched {
        generation: u64,
        result: Result<bool, PresenceError>,
    },
    WatchUpdate {
        watch_id: u64,
        event: courier_geo::WatchEvent,
    },
    PublishTick {
        generation: u64,
    },
}
