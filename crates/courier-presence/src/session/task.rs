//! The session task: owns every piece of mutable presence state.

use std::sync::Arc;

use courier_common::{ApiError, LocationSample, PresenceError, PresenceState};
use courier_geo::{LocationSampler, WatchEvent, WatchHandle};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::handle::PresenceHandle;
use super::types::{SessionCommand, SessionConfig, SessionEvent, SessionSnapshot};
use crate::api::DispatchApi;
use crate::channel::PresenceChannel;
use crate::handoff::ActiveRideHandoff;

/// Entry point for running a presence session.
pub struct PresenceSession;

impl PresenceSession {
    /// Spawn the session task. Returns the UI handle and the event
    /// receiver. The session starts `Offline`; mount-time server truth
    /// is fed in through `PresenceHandle::server_truth_observed`.
    pub fn start(
        config: SessionConfig,
        sampler: Arc<LocationSampler>,
        api: Arc<dyn DispatchApi>,
        channel: Arc<PresenceChannel>,
    ) -> (PresenceHandle, mpsc::Receiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(64);
        let snapshot = Arc::new(RwLock::new(SessionSnapshot::default()));

        let task = SessionTask {
            config,
            sampler,
            api,
            channel,
            snapshot: Arc::clone(&snapshot),
            events: event_tx,
            command_tx: command_tx.clone(),
            state: PresenceState::Offline,
            generation: 0,
            last_toggle_at: None,
            recovery: None,
            ticker: None,
            watch: None,
            last_sample: None,
            handoff: ActiveRideHandoff::new(),
        };
        tokio::spawn(task.run(command_rx));

        (
            PresenceHandle {
                command_tx,
                snapshot,
            },
            event_rx,
        )
    }
}

struct ActiveWatch {
    handle: WatchHandle,
    drain: JoinHandle<()>,
}

struct SessionTask {
    config: SessionConfig,
    sampler: Arc<LocationSampler>,
    api: Arc<dyn DispatchApi>,
    channel: Arc<PresenceChannel>,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    events: mpsc::Sender<SessionEvent>,
    /// For self-sends from spawned work (timers, network results).
    command_tx: mpsc::Sender<SessionCommand>,

    state: PresenceState,
    /// Transition attempt token. Results tagged with an older generation
    /// are stale and must no-op.
    generation: u64,
    last_toggle_at: Option<Instant>,
    recovery: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
    watch: Option<ActiveWatch>,
    last_sample: Option<LocationSample>,
    handoff: ActiveRideHandoff,
}

impl SessionTask {
    async fn run(mut self, mut command_rx: mpsc::Receiver<SessionCommand>) {
        while let Some(command) = command_rx.recv().await {
            if self.handle_command(command).await {
                break;
            }
        }
        self.stop_ticker();
        self.stop_watch();
        self.cancel_recovery();
        debug!("presence session stopped");
    }

    /// Returns `true` when the session should shut down.
    async fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Toggle { online } => self.on_toggle(online).await,
            SessionCommand::ForceReconcile => self.on_force_reconcile().await,
            SessionCommand::ServerTruth { online } => self.on_server_truth(online).await,
            SessionCommand::RideStatus(status) => self.on_ride_status(status).await,
            SessionCommand::ActivationResult { generation, result } => {
                self.on_activation_result(generation, result).await
            }
            SessionCommand::DeactivationResult { generation, result } => {
                self.on_deactivation_result(generation, result).await
            }
            SessionCommand::RecoveryTimeout { generation } => {
                self.on_recovery_timeout(generation).await
            }
            SessionCommand::TruthFetched { generation, result } => {
                self.on_truth_fetched(generation, result).await
            }
            SessionCommand::WatchUpdate { watch_id, event } => {
                self.on_watch_update(watch_id, event).await
            }
            SessionCommand::PublishTick { generation } => self.on_publish_tick(generation).await,
            SessionCommand::Shutdown => return true,
        }
        false
    }

    // -----------------------------------------------------------------
    // Toggle handling
    // -----------------------------------------------------------------

    async fn on_toggle(&mut self, online: bool) {
        let now = Instant::now();
        if let Some(previous) = self.last_toggle_at {
            if now.duration_since(previous) < self.config.debounce {
                debug!(online, "toggle debounced");
                return;
            }
        }
        if !self.state.is_settled() {
            debug!(online, state = %self.state, "toggle ignored, transition in flight");
            return;
        }
        if self.state.is_online() == online {
            debug!(online, "toggle ignored, already in requested state");
            return;
        }

        self.last_toggle_at = Some(now);
        if online {
            self.begin_activation().await;
        } else {
            self.begin_deactivation().await;
        }
    }

    async fn begin_activation(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        self.set_state(PresenceState::Activating).await;
        self.arm_recovery(generation);

        let sampler = Arc::clone(&self.sampler);
        let api = Arc::clone(&self.api);
        let sample_config = self.config.sample;
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = async {
                let sample = sampler
                    .acquire_once(&sample_config)
                    .await
                    .map_err(PresenceError::from)?;
                let profile = api.activate().await.map_err(activation_error)?;
                if profile.is_online() {
                    Ok(sample)
                } else {
                    Err(PresenceError::ActivationRejected(format!(
                        "server kept status {:?}",
                        profile.status
                    )))
                }
            }
            .await;
            let _ = tx
                .send(SessionCommand::ActivationResult { generation, result })
                .await;
        });
    }

    async fn begin_deactivation(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        self.set_state(PresenceState::Deactivating).await;
        self.arm_recovery(generation);
        // Publishing stops immediately; the watch survives until the
        // server confirms.
        self.stop_ticker();

        let api = Arc::clone(&self.api);
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = api
                .deactivate()
                .await
                .map(|_profile| ())
                .map_err(deactivation_error);
            let _ = tx
                .send(SessionCommand::DeactivationResult { generation, result })
                .await;
        });
    }

    async fn on_activation_result(
        &mut self,
        generation: u64,
        result: Result<LocationSample, PresenceError>,
    ) {
        if generation != self.generation || self.state != PresenceState::Activating {
            debug!(generation, "stale activation result discarded");
            return;
        }
        self.cancel_recovery();

        match result {
            Ok(sample) => {
                self.store_sample(sample).await;
                self.set_state(PresenceState::Online).await;
                self.ensure_watch().await;
                self.ensure_ticker();
            }
            Err(error) => {
                warn!(%error, "activation failed");
                self.set_error(error).await;
                self.set_state(PresenceState::Offline).await;
            }
        }
    }

    async fn on_deactivation_result(
        &mut self,
        generation: u64,
        result: Result<(), PresenceError>,
    ) {
        if generation != self.generation || self.state != PresenceState::Deactivating {
            debug!(generation, "stale deactivation result discarded");
            return;
        }
        self.cancel_recovery();

        match result {
            Ok(()) => {
                self.stop_watch();
                self.set_state(PresenceState::Offline).await;
            }
            Err(error) => {
                warn!(%error, "deactivation failed, resuming online");
                self.set_error(error).await;
                self.set_state(PresenceState::Online).await;
                self.ensure_ticker();
            }
        }
    }

    // -----------------------------------------------------------------
    // Recovery & reconciliation
    // -----------------------------------------------------------------

    async fn on_recovery_timeout(&mut self, generation: u64) {
        if generation != self.generation {
            debug!(generation, "stale recovery timeout discarded");
            return;
        }
        if !matches!(
            self.state,
            PresenceState::Activating | PresenceState::Deactivating
        ) {
            return;
        }
        warn!(state = %self.state, "transition hung, falling back to server truth");
        self.recovery = None;
        self.set_state(PresenceState::StuckRecovering).await;
        self.spawn_truth_fetch(generation);
    }

    async fn on_force_reconcile(&mut self) {
        if self.state.is_settled() {
            debug!("force reconcile ignored while settled");
            return;
        }
        info!(state = %self.state, "manual reconciliation requested");
        self.cancel_recovery();
        if self.state != PresenceState::StuckRecovering {
            self.set_state(PresenceState::StuckRecovering).await;
        }
        self.spawn_truth_fetch(self.generation);
    }

    fn spawn_truth_fetch(&self, generation: u64) {
        let api = Arc::clone(&self.api);
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = api
                .fetch_profile()
                .await
                .map(|profile| profile.is_online())
                .map_err(|e| PresenceError::ReconciliationFailed(e.to_string()));
            let _ = tx
                .send(SessionCommand::TruthFetched { generation, result })
                .await;
        });
    }

    async fn on_truth_fetched(&mut self, generation: u64, result: Result<bool, PresenceError>) {
        if generation != self.generation || self.state != PresenceState::StuckRecovering {
            debug!(generation, "stale truth fetch discarded");
            return;
        }
        match result {
            Ok(online) => {
                info!(online, "reconciled to server truth");
                self.reconcile_to(online).await;
            }
            Err(error) => {
                // Stay stuck; the manual retry affordance re-fetches.
                warn!(%error, "reconciliation fetch failed");
                self.set_error(error).await;
            }
        }
    }

    async fn on_server_truth(&mut self, online: bool) {
        if !self.state.is_settled() {
            // An eventually-consistent read must not race a
            // user-initiated transition.
            debug!(online, state = %self.state, "unsolicited server truth ignored");
            return;
        }
        if self.state.is_online() != online {
            info!(online, "server truth differs from local state, reconciling");
            self.reconcile_to(online).await;
        }
    }

    /// Adopt the server's notion of presence. Going online this way does
    /// not replay the activate call; the watch and ticker are started
    /// only if not already running.
    async fn reconcile_to(&mut self, online: bool) {
        if online {
            self.set_state(PresenceState::Online).await;
            self.ensure_watch().await;
            self.ensure_ticker();
        } else {
            self.stop_ticker();
            self.stop_watch();
            self.set_state(PresenceState::Offline).await;
        }
    }

    // -----------------------------------------------------------------
    // Samples & publishing
    // -----------------------------------------------------------------

    async fn on_watch_update(&mut self, watch_id: u64, event: WatchEvent) {
        let current = self.watch.as_ref().map(|w| w.handle.id());
        if current != Some(watch_id) {
            debug!(watch_id, "update from a stopped watch discarded");
            return;
        }
        match event {
            WatchEvent::Fix(sample) => {
                self.store_sample(sample).await;
                let _ = self
                    .events
                    .send(SessionEvent::Sample {
                        route: self.handoff.route(),
                        sample,
                    })
                    .await;
            }
            WatchEvent::Fault(error) => {
                // One bad fix must not take the driver offline.
                debug!(%error, "transient watch fault");
                let _ = self.events.send(SessionEvent::Warning(error)).await;
            }
        }
    }

    async fn on_publish_tick(&mut self, generation: u64) {
        if generation != self.generation || self.state != PresenceState::Online {
            debug!(generation, "stale publish tick discarded");
            return;
        }
        if let Some(sample) = self.last_sample {
            // Possibly stale by one tick; acceptable, the next fix
            // supersedes it.
            self.channel.publish(&sample).await;
        }
    }

    async fn on_ride_status(&mut self, status: courier_common::RideStatus) {
        let route_changed = self.handoff.observe(status);
        self.snapshot.write().await.route = self.handoff.route();
        if route_changed && self.state == PresenceState::Online {
            // Same watch, new cadence.
            self.stop_ticker();
            self.ensure_ticker();
        }
    }

    // -----------------------------------------------------------------
    // Resource management
    // -----------------------------------------------------------------

    async fn ensure_watch(&mut self) {
        if self.watch.is_some() {
            return;
        }
        match self.sampler.start_watch(&self.config.sample) {
            Ok((handle, mut events)) => {
                let watch_id = handle.id();
                let tx = self.command_tx.clone();
                let drain = tokio::spawn(async move {
                    while let Some(event) = events.recv().await {
                        if tx
                            .send(SessionCommand::WatchUpdate { watch_id, event })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                });
                self.watch = Some(ActiveWatch { handle, drain });
                debug!(watch_id, "watch started");
            }
            Err(error) => {
                warn!(%error, "could not start location watch");
                let _ = self.events.send(SessionEvent::Warning(error)).await;
            }
        }
    }

    fn stop_watch(&mut self) {
        if let Some(watch) = self.watch.take() {
            self.sampler.stop_watch(&watch.handle);
            watch.drain.abort();
        }
    }

    fn ensure_ticker(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let period = if self.handoff.ride_active() {
            self.config.ride_publish_interval
        } else {
            self.config.publish_interval
        };
        let generation = self.generation;
        let tx = self.command_tx.clone();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if tx
                    .send(SessionCommand::PublishTick { generation })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn arm_recovery(&mut self, generation: u64) {
        self.cancel_recovery();
        let timeout = self.config.recovery_timeout;
        let tx = self.command_tx.clone();
        self.recovery = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx
                .send(SessionCommand::RecoveryTimeout { generation })
                .await;
        }));
    }

    fn cancel_recovery(&mut self) {
        if let Some(recovery) = self.recovery.take() {
            recovery.abort();
        }
    }

    // -----------------------------------------------------------------
    // Snapshot & events
    // -----------------------------------------------------------------

    async fn set_state(&mut self, to: PresenceState) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        self.snapshot.write().await.state = to;
        info!(%from, %to, generation = self.generation, "presence state changed");
        let _ = self.events.send(SessionEvent::StateChanged { from, to }).await;
    }

    async fn set_error(&mut self, error: PresenceError) {
        self.snapshot.write().await.last_error = Some(error.clone());
        let _ = self.events.send(SessionEvent::Error(error)).await;
    }

    async fn store_sample(&mut self, sample: LocationSample) {
        self.last_sample = Some(sample);
        self.snapshot.write().await.last_sample = Some(sample);
    }
}

fn activation_error(error: ApiError) -> PresenceError {
    match error {
        ApiError::Network(message) => PresenceError::NetworkUnavailable(message),
        other => PresenceError::ActivationRejected(other.to_string()),
    }
}

fn deactivation_error(error: ApiError) -> PresenceError {
    match error {
        ApiError::Network(message) => PresenceError::NetworkUnavailable(message),
        other => PresenceError::DeactivationRejected(other.to_string()),
    }
}
