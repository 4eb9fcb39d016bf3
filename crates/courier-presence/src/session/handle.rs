//! UI-facing handle to a running presence session.

use std::sync::Arc;

use courier_common::{LocationSample, PresenceError, PresenceState, RideStatus};
use tokio::sync::{mpsc, RwLock};

use super::types::{SessionCommand, SessionSnapshot};
use crate::handoff::SampleRoute;

/// Cheap-to-clone handle. Reads come from a shared snapshot; requests go
/// to the session task as commands and are validated there — the handle
/// itself owns no transition logic.
#[derive(Clone)]
pub struct PresenceHandle {
    pub(crate) command_tx: mpsc::Sender<SessionCommand>,
    pub(crate) snapshot: Arc<RwLock<SessionSnapshot>>,
}

impl PresenceHandle {
    pub async fn state(&self) -> PresenceState {
        self.snapshot.read().await.state
    }

    pub async fn last_error(&self) -> Option<PresenceError> {
        self.snapshot.read().await.last_error.clone()
    }

    pub async fn last_sample(&self) -> Option<LocationSample> {
        self.snapshot.read().await.last_sample
    }

    pub async fn route(&self) -> SampleRoute {
        self.snapshot.read().await.route
    }

    /// Request a presence toggle. Debounced, refused while a transition
    /// is in flight, and a no-op when already in the requested state.
    pub async fn request_toggle(&self, online: bool) {
        let _ = self.command_tx.send(SessionCommand::Toggle { online }).await;
    }

    /// Manual retry/resync: re-trigger server-truth reconciliation
    /// without waiting for the recovery timer.
    pub async fn force_reconcile(&self) {
        let _ = self.command_tx.send(SessionCommand::ForceReconcile).await;
    }

    /// Feed in server-reported truth from a mount-time profile fetch.
    /// Ignored while a transition is in flight.
    pub async fn server_truth_observed(&self, online: bool) {
        let _ = self
            .command_tx
            .send(SessionCommand::ServerTruth { online })
            .await;
    }

    /// Inform the session of an active-ride status change.
    pub async fn ride_status_changed(&self, status: RideStatus) {
        let _ = self
            .command_tx
            .send(SessionCommand::RideStatus(status))
            .await;
    }

    /// Stop the session task, releasing the watch and timers.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(SessionCommand::Shutdown).await;
    }
}
