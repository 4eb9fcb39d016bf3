mod cli;
mod sim;

use std::sync::Arc;

use courier_common::{DriverId, PresenceError, RideStatus};
use courier_config::CourierConfig;
use courier_geo::{GeoBackend, LocationSampler};
use courier_presence::{
    DispatchApi, HttpDispatchApi, LocationFeed, PresenceChannel, PresenceSession, RealtimeClient,
    RealtimeConfig, RealtimeEvent, SessionConfig, SessionEvent,
};
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("courier: {e}");
        std::process::exit(1);
    }
}

async fn run() -> courier_common::Result<()> {
    let args = cli::parse();

    // Load config first so the logging filter can come from it. An
    // explicitly passed path must exist and parse; the default path
    // falls back to defaults so a fresh install still starts.
    let config = match args.config.as_deref() {
        Some(path) => courier_config::load_from_path(std::path::Path::new(path))?,
        None => courier_config::load_config().unwrap_or_else(|e| {
            eprintln!("config load failed, using defaults: {e}");
            CourierConfig::default()
        }),
    };

    let directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                directive
                    .parse()
                    .unwrap_or_else(|_| "courier=info".parse().unwrap()),
            ),
        )
        .init();

    info!("Courier v{} starting", env!("CARGO_PKG_VERSION"));

    let (lat, lng) = cli::parse_position(&args.simulate).unwrap_or_else(|| {
        warn!("could not parse --simulate '{}', using default", args.simulate);
        (52.2297, 21.0122)
    });
    let driver_id = DriverId(args.driver_id.clone());

    // Wiring: simulated GPS -> sampler -> session -> dual-channel publish.
    let backend: Arc<dyn GeoBackend> = Arc::new(sim::SimulatedBackend::new(lat, lng));
    let sampler = Arc::new(LocationSampler::new(backend));
    let api: Arc<dyn DispatchApi> = Arc::new(HttpDispatchApi::new(&config.api));

    let (realtime, mut realtime_events) = RealtimeClient::connect(RealtimeConfig {
        url: config.realtime.url.clone(),
        token: config.api.token.clone(),
        reconnect_delay_secs: config.realtime.reconnect_delay_secs,
        max_reconnect_delay_secs: config.realtime.max_reconnect_delay_secs,
    });
    tokio::spawn(async move {
        while let Some(event) = realtime_events.recv().await {
            match event {
                RealtimeEvent::Connected => info!("tracking gateway connected"),
                RealtimeEvent::Disconnected => info!("tracking gateway disconnected"),
                RealtimeEvent::Error(message) => warn!(%message, "tracking gateway error"),
            }
        }
    });

    let channel = Arc::new(PresenceChannel::new(
        Arc::clone(&api),
        Arc::new(realtime.clone()) as Arc<dyn LocationFeed>,
        driver_id.clone(),
    ));
    let (handle, mut events) = PresenceSession::start(
        SessionConfig::from_app_config(&config, driver_id),
        sampler,
        Arc::clone(&api),
        channel,
    );

    // Mount-time reconciliation: the server's view wins, once.
    match api.fetch_profile().await {
        Ok(profile) => handle.server_truth_observed(profile.is_online()).await,
        Err(e) => warn!(error = %e, "startup profile fetch failed"),
    }

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::StateChanged { from, to } => println!("state: {from} -> {to}"),
                SessionEvent::Error(error) => {
                    println!("error: {error}");
                    if let PresenceError::Location(location) = &error {
                        println!("  hint: {}", location.guidance());
                    }
                }
                SessionEvent::Warning(warning) => println!("warning: {warning}"),
                SessionEvent::Sample { route, sample } => {
                    println!("[{route:?}] fix {:.5},{:.5}", sample.lat, sample.lng)
                }
            }
        }
    });

    println!("commands: on | off | retry | ride | done | status | quit");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "on" => handle.request_toggle(true).await,
            "off" => handle.request_toggle(false).await,
            "retry" => handle.force_reconcile().await,
            "ride" => handle.ride_status_changed(RideStatus::InProgress).await,
            "done" => handle.ride_status_changed(RideStatus::Completed).await,
            "status" => {
                println!("state: {}", handle.state().await);
                if let Some(sample) = handle.last_sample().await {
                    println!("last fix: {:.5},{:.5}", sample.lat, sample.lng);
                }
                if let Some(error) = handle.last_error().await {
                    println!("last error: {error}");
                }
            }
            "quit" | "exit" => break,
            "" => {}
            other => println!("unknown command: {other}"),
        }
    }

    handle.shutdown().await;
    realtime.disconnect().await;
    info!("shutdown complete");
    Ok(())
}
