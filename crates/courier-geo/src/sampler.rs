//! The location sampler: single-fix acquisition and the watch lifecycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use courier_common::{LocationError, LocationSample, PlatformHint};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::{
    BackendFault, GeoBackend, WatchUpdate, FAULT_PERMISSION_DENIED, FAULT_POSITION_UNAVAILABLE,
    FAULT_TIMEOUT,
};
use crate::types::SampleConfig;

/// Monotonically increasing watch handle ids.
static WATCH_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Events emitted on a watch stream. A `Fault` is a side channel: the
/// watch stays alive and the next fix may succeed.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Fix(LocationSample),
    Fault(LocationError),
}

/// Handle to an active watch. Identity is stable for the lifetime of the
/// watch; stopping and restarting produces a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchHandle {
    id: u64,
}

impl WatchHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

struct ActiveWatch {
    id: u64,
    backend_id: u64,
    forwarder: JoinHandle<()>,
}

/// Wraps a `GeoBackend` with the sampler contract: one watch at a time,
/// closed error taxonomy, idempotent stop.
pub struct LocationSampler {
    backend: Arc<dyn GeoBackend>,
    active: Mutex<Option<ActiveWatch>>,
}

impl LocationSampler {
    pub fn new(backend: Arc<dyn GeoBackend>) -> Self {
        Self {
            backend,
            active: Mutex::new(None),
        }
    }

    /// Resolve a single best-effort fix, bounded by `config.timeout_ms`.
    pub async fn acquire_once(
        &self,
        config: &SampleConfig,
    ) -> Result<LocationSample, LocationError> {
        if !self.backend.supported() {
            return Err(LocationError::Unsupported);
        }

        let timeout = Duration::from_millis(config.timeout_ms);
        match tokio::time::timeout(timeout, self.backend.current_position(config)).await {
            Ok(Ok(sample)) => Ok(sample),
            Ok(Err(fault)) => Err(map_fault(&fault, self.backend.platform())),
            Err(_elapsed) => Err(LocationError::Timeout),
        }
    }

    /// Begin a watch. If a previous watch is still active it is stopped
    /// first; the sampler never runs two watches concurrently.
    ///
    /// Returns the handle plus a receiver of `WatchEvent`s. Faults arrive
    /// on the same receiver without closing it.
    pub fn start_watch(
        &self,
        config: &SampleConfig,
    ) -> Result<(WatchHandle, mpsc::Receiver<WatchEvent>), LocationError> {
        if !self.backend.supported() {
            return Err(LocationError::Unsupported);
        }

        let (event_tx, event_rx) = mpsc::channel(64);
        let (update_tx, update_rx) = mpsc::channel(64);

        let id = WATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let backend_id = self.backend.start_watch(config, update_tx);
        let platform = self.backend.platform();
        let forwarder = tokio::spawn(forward_updates(id, update_rx, event_tx, platform));

        let mut active = self.active.lock().expect("watch lock poisoned");
        if let Some(previous) = active.take() {
            debug!(
                previous = previous.id,
                new = id,
                "stopping previous watch before starting a new one"
            );
            self.backend.stop_watch(previous.backend_id);
            previous.forwarder.abort();
        }
        *active = Some(ActiveWatch {
            id,
            backend_id,
            forwarder,
        });

        Ok((WatchHandle { id }, event_rx))
    }

    /// Stop a watch. Idempotent; a stale or already-stopped handle is a
    /// no-op.
    pub fn stop_watch(&self, handle: &WatchHandle) {
        let mut active = self.active.lock().expect("watch lock poisoned");
        let is_current = active.as_ref().is_some_and(|current| current.id == handle.id);
        if is_current {
            let current = active.take().expect("checked above");
            self.backend.stop_watch(current.backend_id);
            current.forwarder.abort();
            debug!(watch = handle.id, "watch stopped");
        } else {
            debug!(watch = handle.id, "stop_watch on inactive handle ignored");
        }
    }

    /// Id of the currently active watch, if any.
    pub fn active_watch_id(&self) -> Option<u64> {
        self.active.lock().expect("watch lock poisoned").as_ref().map(|w| w.id)
    }
}

/// Forward backend updates to the consumer, mapping faults into the
/// closed taxonomy. Faults are logged and forwarded; they never break
/// the loop.
async fn forward_updates(
    watch_id: u64,
    mut updates: mpsc::Receiver<WatchUpdate>,
    events: mpsc::Sender<WatchEvent>,
    platform: PlatformHint,
) {
    while let Some(update) = updates.recv().await {
        let event = match update {
            WatchUpdate::Fix(sample) => WatchEvent::Fix(sample),
            WatchUpdate::Fault(fault) => {
                warn!(watch = watch_id, code = fault.code, message = %fault.message, "watch fault");
                WatchEvent::Fault(map_fault(&fault, platform))
            }
        };
        if events.send(event).await.is_err() {
            // Consumer dropped the receiver; nothing left to forward to.
            break;
        }
    }
}

/// Map a platform fault into the closed `LocationError` taxonomy.
fn map_fault(fault: &BackendFault, platform: PlatformHint) -> LocationError {
    match fault.code {
        FAULT_PERMISSION_DENIED => LocationError::PermissionDenied { hint: platform },
        FAULT_POSITION_UNAVAILABLE => LocationError::PositionUnavailable,
        FAULT_TIMEOUT => LocationError::Timeout,
        code => LocationError::Unknown(format!("code {code}: {}", fault.message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use courier_common::epoch_millis;
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;

    /// Scriptable backend for sampler tests.
    struct MockBackend {
        supported: bool,
        platform: PlatformHint,
        position: Result<LocationSample, BackendFault>,
        next_watch_id: AtomicU64,
        /// Watch update senders keyed by backend watch id, so tests can
        /// drive fixes/faults after start.
        watches: StdMutex<Vec<(u64, mpsc::Sender<WatchUpdate>)>>,
        stopped: StdMutex<HashSet<u64>>,
    }

    impl MockBackend {
        fn new(position: Result<LocationSample, BackendFault>) -> Self {
            Self {
                supported: true,
                platform: PlatformHint::Other,
                position,
                next_watch_id: AtomicU64::new(100),
                watches: StdMutex::new(Vec::new()),
                stopped: StdMutex::new(HashSet::new()),
            }
        }

        fn sender_for(&self, backend_id: u64) -> mpsc::Sender<WatchUpdate> {
            self.watches
                .lock()
                .unwrap()
                .iter()
                .find(|(id, _)| *id == backend_id)
                .map(|(_, tx)| tx.clone())
                .expect("watch not started")
        }

        fn stopped_ids(&self) -> HashSet<u64> {
            self.stopped.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GeoBackend for MockBackend {
        fn supported(&self) -> bool {
            self.supported
        }

        fn platform(&self) -> PlatformHint {
            self.platform
        }

        async fn current_position(
            &self,
            _config: &SampleConfig,
        ) -> Result<LocationSample, BackendFault> {
            self.position.clone()
        }

        fn start_watch(&self, _config: &SampleConfig, updates: mpsc::Sender<WatchUpdate>) -> u64 {
            let id = self.next_watch_id.fetch_add(1, Ordering::Relaxed);
            self.watches.lock().unwrap().push((id, updates));
            id
        }

        fn stop_watch(&self, id: u64) {
            self.stopped.lock().unwrap().insert(id);
        }
    }

    fn sample(lat: f64, lng: f64) -> LocationSample {
        LocationSample {
            lat,
            lng,
            timestamp_ms: epoch_millis(),
            accuracy: Some(5.0),
        }
    }

    #[tokio::test]
    async fn acquire_once_returns_fix() {
        let backend = Arc::new(MockBackend::new(Ok(sample(10.0, 20.0))));
        let sampler = LocationSampler::new(backend);

        let fix = sampler.acquire_once(&SampleConfig::default()).await.unwrap();
        assert_eq!(fix.lat, 10.0);
        assert_eq!(fix.lng, 20.0);
    }

    #[tokio::test]
    async fn acquire_once_maps_platform_codes() {
        for (code, expected) in [
            (
                FAULT_PERMISSION_DENIED,
                LocationError::PermissionDenied {
                    hint: PlatformHint::Other,
                },
            ),
            (FAULT_POSITION_UNAVAILABLE, LocationError::PositionUnavailable),
            (FAULT_TIMEOUT, LocationError::Timeout),
        ] {
            let backend = Arc::new(MockBackend::new(Err(BackendFault::new(code, "denied"))));
            let sampler = LocationSampler::new(backend);
            let err = sampler
                .acquire_once(&SampleConfig::default())
                .await
                .unwrap_err();
            assert_eq!(err, expected);
        }
    }

    #[tokio::test]
    async fn acquire_once_unknown_code_maps_to_unknown() {
        let backend = Arc::new(MockBackend::new(Err(BackendFault::new(42, "weird"))));
        let sampler = LocationSampler::new(backend);
        let err = sampler
            .acquire_once(&SampleConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LocationError::Unknown(_)));
    }

    #[tokio::test]
    async fn acquire_once_permission_denied_carries_ios_hint() {
        let mut backend = MockBackend::new(Err(BackendFault::new(FAULT_PERMISSION_DENIED, "no")));
        backend.platform = PlatformHint::Ios;
        let sampler = LocationSampler::new(Arc::new(backend));

        let err = sampler
            .acquire_once(&SampleConfig::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LocationError::PermissionDenied {
                hint: PlatformHint::Ios
            }
        );
    }

    #[tokio::test]
    async fn acquire_once_unsupported_backend() {
        let mut backend = MockBackend::new(Ok(sample(0.0, 0.0)));
        backend.supported = false;
        let sampler = LocationSampler::new(Arc::new(backend));

        let err = sampler
            .acquire_once(&SampleConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::Unsupported);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_once_times_out_when_backend_hangs() {
        struct HangingBackend;

        #[async_trait]
        impl GeoBackend for HangingBackend {
            async fn current_position(
                &self,
                _config: &SampleConfig,
            ) -> Result<LocationSample, BackendFault> {
                std::future::pending().await
            }

            fn start_watch(
                &self,
                _config: &SampleConfig,
                _updates: mpsc::Sender<WatchUpdate>,
            ) -> u64 {
                0
            }

            fn stop_watch(&self, _id: u64) {}
        }

        let sampler = LocationSampler::new(Arc::new(HangingBackend));
        let err = sampler
            .acquire_once(&SampleConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::Timeout);
    }

    #[tokio::test]
    async fn watch_fault_does_not_end_the_stream() {
        let backend = Arc::new(MockBackend::new(Ok(sample(0.0, 0.0))));
        let sampler = LocationSampler::new(Arc::clone(&backend) as Arc<dyn GeoBackend>);

        let (handle, mut events) = sampler.start_watch(&SampleConfig::default()).unwrap();
        let tx = backend.sender_for(sampler_backend_id(&sampler));

        tx.send(WatchUpdate::Fault(BackendFault::new(
            FAULT_POSITION_UNAVAILABLE,
            "gps glitch",
        )))
        .await
        .unwrap();
        tx.send(WatchUpdate::Fix(sample(1.0, 2.0))).await.unwrap();

        let first = events.recv().await.unwrap();
        assert!(matches!(
            first,
            WatchEvent::Fault(LocationError::PositionUnavailable)
        ));
        let second = events.recv().await.unwrap();
        assert!(matches!(second, WatchEvent::Fix(s) if s.lat == 1.0 && s.lng == 2.0));

        sampler.stop_watch(&handle);
    }

    #[tokio::test]
    async fn starting_a_second_watch_stops_the_first() {
        let backend = Arc::new(MockBackend::new(Ok(sample(0.0, 0.0))));
        let sampler = LocationSampler::new(Arc::clone(&backend) as Arc<dyn GeoBackend>);

        let (first, _rx1) = sampler.start_watch(&SampleConfig::default()).unwrap();
        let first_backend_id = sampler_backend_id(&sampler);
        let (second, _rx2) = sampler.start_watch(&SampleConfig::default()).unwrap();

        assert_ne!(first.id(), second.id());
        assert!(backend.stopped_ids().contains(&first_backend_id));
        assert_eq!(sampler.active_watch_id(), Some(second.id()));
    }

    #[tokio::test]
    async fn stop_watch_is_idempotent() {
        let backend = Arc::new(MockBackend::new(Ok(sample(0.0, 0.0))));
        let sampler = LocationSampler::new(Arc::clone(&backend) as Arc<dyn GeoBackend>);

        let (handle, _rx) = sampler.start_watch(&SampleConfig::default()).unwrap();
        sampler.stop_watch(&handle);
        sampler.stop_watch(&handle); // second stop is a no-op
        assert_eq!(sampler.active_watch_id(), None);

        // Stopping a handle that was never active is also a no-op.
        sampler.stop_watch(&WatchHandle { id: 9999 });
    }

    /// Backend id of the sampler's current watch (test helper).
    fn sampler_backend_id(sampler: &LocationSampler) -> u64 {
        sampler
            .active
            .lock()
            .unwrap()
            .as_ref()
            .map(|w| w.backend_id)
            .expect("no active watch")
    }
}
