use chrono::Utc;
use firedrone_dashboard::dashboard::{DashboardState, Notification, NotificationLevel};
use firedrone_dashboard::intake::{
    FileStore, FixedPosition, GeolocationProvider, KeyValueStore, MemoryStore, ReportDraft,
    ReportInbox, ReportIntake, Unsupported,
};
use firedrone_dashboard::sequencer::{self, DashboardEvent, SequencerHandle};
use firedrone_dashboard::{DashboardConfig, DashboardError};
use firedrone_shared::{Incident, IncidentId};
use std::sync::Arc;
use tokio::sync::mpsc;

use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = DashboardConfig::from_env()?;

    info!("Fire-response drone command starting");
    info!("  Time scale: {}", config.time_scale);

    let store: Arc<dyn KeyValueStore> = match &config.inbox_dir {
        Some(dir) => Arc::new(FileStore::new(dir)),
        None => Arc::new(MemoryStore::new()),
    };
    info!("  Report inbox: {} store, key {:?}", store.name(), config.inbox_key);
    let inbox = ReportInbox::new(store, config.inbox_key.clone());

    let geolocation: Arc<dyn GeolocationProvider> = match config.device_position {
        Some(position) => Arc::new(FixedPosition(position)),
        None => Arc::new(Unsupported),
    };
    let state = DashboardState::seeded(&config, Utc::now());
    let intake = ReportIntake::new(state.directory.clone(), geolocation);
    let drone_id = state.roster.first_available().map(|d| d.id.clone());

    // A report filed from the report page before the dashboard loads
    file_report(&intake, &inbox).await;

    let (handle, mut events, sequencer_task) = sequencer::spawn(state, config.time_scale);

    let pending = load_pending(&inbox, &handle).await?;
    let latest = pending.last().map(|r| r.id.clone());
    for report in pending {
        handle.report_incident(report).await?;
    }

    dispatch(&handle, drone_id, latest).await;

    // Main event loop
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    let done = matches!(
                        event,
                        DashboardEvent::RunFinished { .. } | DashboardEvent::RunCancelled { .. }
                    );
                    handle_event(&event);
                    if done {
                        break;
                    }
                }
                None => {
                    error!("Sequencer event channel closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, cancelling the active run");
                // Keep looping until the RunCancelled event comes through
                if !handle.cancel_dispatch("operator interrupt").await? {
                    break;
                }
            }
        }
    }

    let snapshot = handle.snapshot().await?;
    info!(
        "Open incidents: {}, log entries: {}",
        snapshot.active_incidents().count(),
        snapshot.log.len()
    );
    debug!("Final map view: {}", serde_json::to_string(&snapshot.view)?);

    handle.shutdown().await?;
    drain_remaining(&mut events);
    sequencer_task.await?;
    Ok(())
}

/// Take the pending reports; a corrupt inbox is reported and skipped
async fn load_pending(
    inbox: &ReportInbox,
    handle: &SequencerHandle,
) -> anyhow::Result<Vec<Incident>> {
    match inbox.drain().await {
        Ok(reports) => Ok(reports),
        Err(DashboardError::Codec(e)) => {
            error!("Discarded corrupt pending reports: {}", e);
            handle
                .notify(Notification::error(format!(
                    "Pending fire reports could not be read: {}",
                    e
                )))
                .await?;
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Fill in a report the way the report page would and queue it
async fn file_report(intake: &ReportIntake, inbox: &ReportInbox) {
    let mut draft = ReportDraft::new("Thick smoke from a rooftop near the roundabout.", "");
    if let Err(e) = intake.locate(&mut draft).await {
        warn!("{}; picking a location from the list", e);
        if let Some(first) = intake.directory().locations().first() {
            draft.pick_location(first.name.clone());
        }
    }

    match intake.submit(draft) {
        Ok(report) => {
            if let Err(e) = inbox.push(report).await {
                error!("Failed to queue report: {}", e);
            }
        }
        Err(e) => warn!("Report rejected: {}", e),
    }
}

/// Point the dashboard at the newest report and dispatch a drone to it
async fn dispatch(
    handle: &SequencerHandle,
    drone_id: Option<String>,
    latest: Option<IncidentId>,
) {
    if let Some(id) = latest {
        if let Err(e) = handle.select_incident(Some(id)).await {
            warn!("Could not select the new report: {}", e);
        }
    }

    let Some(drone_id) = drone_id else {
        warn!("No drone available for dispatch");
        return;
    };

    match handle.start_dispatch(&drone_id).await {
        Ok(run_id) => info!("Dispatched {} ({})", drone_id, run_id),
        Err(e) => warn!("Dispatch failed: {}", e),
    }
}

fn handle_event(event: &DashboardEvent) {
    match event {
        DashboardEvent::LogAppended(entry) => info!("[LOG] {}", entry),
        DashboardEvent::StageEntered {
            run_id,
            drone_id,
            stage,
            position,
        } => {
            debug!("[MAP] {} {} at {} ({})", run_id, drone_id, position, stage);
        }
        DashboardEvent::RunFinished { run_id, drone_id } => {
            info!("[MAP] {} finished, {} back on the pad", run_id, drone_id);
        }
        DashboardEvent::RunCancelled {
            run_id,
            drone_id,
            reason,
        } => {
            warn!("[MAP] {} cancelled for {}: {}", run_id, drone_id, reason);
        }
        DashboardEvent::Notify(n) => match n.level {
            NotificationLevel::Error => error!("[TOAST] {}", n.message),
            NotificationLevel::Info | NotificationLevel::Success => {
                info!("[TOAST] {}", n.message)
            }
        },
    }
}

fn drain_remaining(events: &mut mpsc::UnboundedReceiver<DashboardEvent>) {
    while let Ok(event) = events.try_recv() {
        handle_event(&event);
    }
}
