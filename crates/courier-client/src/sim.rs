//! Simulated geolocation backend for desktop runs.
//!
//! Desktop machines have no GPS; this backend replays a slow drift
//! around a configured start position so the presence pipeline can be
//! exercised end to end.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use courier_common::{epoch_millis, LocationSample};
use courier_geo::backend::{BackendFault, GeoBackend, WatchUpdate};
use courier_geo::SampleConfig;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const FIX_PERIOD: Duration = Duration::from_secs(2);
/// Per-fix drift in degrees, roughly a slow city crawl.
const DRIFT_STEP: f64 = 0.0001;

pub struct SimulatedBackend {
    lat: f64,
    lng: f64,
    next_id: AtomicU64,
    watches: Mutex<HashMap<u64, JoinHandle<()>>>,
}

impl SimulatedBackend {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            next_id: AtomicU64::new(1),
            watches: Mutex::new(HashMap::new()),
        }
    }

    fn sample_at(&self, step: u64) -> LocationSample {
        wander(self.lat, self.lng, step)
    }
}

// Deterministic wander: alternate the drift direction so the simulated
// driver circles the start position.
fn wander(lat: f64, lng: f64, step: u64) -> LocationSample {
    let phase = (step % 40) as f64;
    let swing = if phase < 20.0 { phase } else { 40.0 - phase };
    LocationSample {
        lat: lat + swing * DRIFT_STEP,
        lng: lng + swing * DRIFT_STEP * 0.5,
        timestamp_ms: epoch_millis(),
        accuracy: Some(8.0),
    }
}

#[async_trait]
impl GeoBackend for SimulatedBackend {
    async fn current_position(
        &self,
        _config: &SampleConfig,
    ) -> Result<LocationSample, BackendFault> {
        Ok(self.sample_at(0))
    }

    fn start_watch(&self, _config: &SampleConfig, updates: mpsc::Sender<WatchUpdate>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (lat, lng) = (self.lat, self.lng);
        let task = tokio::spawn(async move {
            let mut step = 0u64;
            let mut interval = tokio::time::interval(FIX_PERIOD);
            loop {
                interval.tick().await;
                if updates
                    .send(WatchUpdate::Fix(wander(lat, lng, step)))
                    .await
                    .is_err()
                {
                    break;
                }
                step += 1;
            }
        });
        self.watches.lock().expect("watch map poisoned").insert(id, task);
        id
    }

    fn stop_watch(&self, id: u64) {
        if let Some(task) = self.watches.lock().expect("watch map poisoned").remove(&id) {
            task.abort();
        }
    }
}
