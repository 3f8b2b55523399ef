//! Sequencer task
//!
//! Runs the [`Sequencer`] on a single tokio task. Callers talk to it through
//! a cloneable [`SequencerHandle`]; stage wakeups come back in as commands on
//! the same queue, so every mutation is applied in order on one task.

use super::engine::{Sequencer, Wakeup};
use super::run::RunId;
use super::timer::ScheduledTask;
use super::DashboardEvent;
use crate::dashboard::{DashboardSnapshot, DashboardState, Notification};
use crate::error::{DashboardError, Result};
use firedrone_shared::{DroneStatus, Incident, IncidentId, IncidentStatus};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

enum Command {
    StartDispatch {
        drone_id: String,
        reply: oneshot::Sender<Result<RunId>>,
    },
    CancelDispatch {
        reason: String,
        reply: oneshot::Sender<bool>,
    },
    /// Posted by the scheduled wakeup of a run
    Advance { run_id: RunId },
    SelectIncident {
        id: Option<IncidentId>,
        reply: oneshot::Sender<Result<()>>,
    },
    ReportIncident {
        incident: Incident,
        reply: oneshot::Sender<()>,
    },
    UpdateDroneStatus {
        drone_id: String,
        status: DroneStatus,
        reply: oneshot::Sender<Result<()>>,
    },
    UpdateIncidentStatus {
        id: IncidentId,
        status: IncidentStatus,
        reply: oneshot::Sender<Result<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<DashboardSnapshot>,
    },
    Notify {
        notification: Notification,
        reply: oneshot::Sender<()>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle to the sequencer task.
///
/// The task stops when `shutdown` is called or the last handle is dropped;
/// either way the active run's pending wakeup is cancelled.
#[derive(Clone)]
pub struct SequencerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

/// Start the sequencer task over `state`
pub fn spawn(
    state: DashboardState,
    time_scale: f64,
) -> (
    SequencerHandle,
    mpsc::UnboundedReceiver<DashboardEvent>,
    JoinHandle<()>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let sequencer = Sequencer::new(state, time_scale, event_tx);
    let wakeups = tx.downgrade();
    let task = tokio::spawn(async move {
        sequencer_loop(sequencer, rx, wakeups).await;
    });

    (SequencerHandle { tx }, event_rx, task)
}

async fn sequencer_loop(
    mut sequencer: Sequencer,
    mut rx: mpsc::UnboundedReceiver<Command>,
    wakeups: mpsc::WeakUnboundedSender<Command>,
) {
    info!("[SEQ] Sequencer started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::StartDispatch { drone_id, reply } => {
                let result = match sequencer.start_dispatch(&drone_id) {
                    Ok(wakeup) => {
                        schedule(&mut sequencer, &wakeups, wakeup);
                        Ok(wakeup.run_id)
                    }
                    Err(e) => Err(e),
                };
                let _ = reply.send(result);
            }
            Command::CancelDispatch { reason, reply } => {
                let _ = reply.send(sequencer.cancel_dispatch(&reason));
            }
            Command::Advance { run_id } => {
                if let Some(wakeup) = sequencer.advance(run_id) {
                    schedule(&mut sequencer, &wakeups, wakeup);
                }
            }
            Command::SelectIncident { id, reply } => {
                let _ = reply.send(sequencer.select_incident(id));
            }
            Command::ReportIncident { incident, reply } => {
                sequencer.report_incident(incident);
                let _ = reply.send(());
            }
            Command::UpdateDroneStatus {
                drone_id,
                status,
                reply,
            } => {
                let _ = reply.send(sequencer.update_drone_status(&drone_id, status));
            }
            Command::UpdateIncidentStatus { id, status, reply } => {
                let _ = reply.send(sequencer.update_incident_status(&id, status));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(sequencer.snapshot());
            }
            Command::Notify {
                notification,
                reply,
            } => {
                sequencer.notify(notification);
                let _ = reply.send(());
            }
            Command::Shutdown { reply } => {
                sequencer.teardown();
                let _ = reply.send(());
                break;
            }
        }
    }

    sequencer.teardown();
    info!("[SEQ] Sequencer stopped");
}

/// Arm the wakeup that moves the run to its next stage
fn schedule(
    sequencer: &mut Sequencer,
    wakeups: &mpsc::WeakUnboundedSender<Command>,
    wakeup: Wakeup,
) {
    let wakeups = wakeups.clone();
    let run_id = wakeup.run_id;
    debug!("[SEQ] {} next stage in {:?}", run_id, wakeup.after);

    let task = ScheduledTask::after(wakeup.after, move || {
        if let Some(tx) = wakeups.upgrade() {
            let _ = tx.send(Command::Advance { run_id });
        }
    });
    sequencer.arm(run_id, task);
}

impl SequencerHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .map_err(|_| DashboardError::Closed)?;
        response.await.map_err(|_| DashboardError::Closed)
    }

    /// Dispatch a drone to the currently selected incident
    pub async fn start_dispatch(&self, drone_id: &str) -> Result<RunId> {
        let drone_id = drone_id.to_string();
        self.request(|reply| Command::StartDispatch { drone_id, reply })
            .await?
    }

    /// Abort the active run; returns false if there was none
    pub async fn cancel_dispatch(&self, reason: &str) -> Result<bool> {
        let reason = reason.to_string();
        self.request(|reply| Command::CancelDispatch { reason, reply })
            .await
    }

    pub async fn select_incident(&self, id: Option<IncidentId>) -> Result<()> {
        self.request(|reply| Command::SelectIncident { id, reply })
            .await?
    }

    pub async fn report_incident(&self, incident: Incident) -> Result<()> {
        self.request(|reply| Command::ReportIncident { incident, reply })
            .await
    }

    pub async fn update_drone_status(&self, drone_id: &str, status: DroneStatus) -> Result<()> {
        let drone_id = drone_id.to_string();
        self.request(|reply| Command::UpdateDroneStatus {
            drone_id,
            status,
            reply,
        })
        .await?
    }

    pub async fn update_incident_status(
        &self,
        id: IncidentId,
        status: IncidentStatus,
    ) -> Result<()> {
        self.request(|reply| Command::UpdateIncidentStatus { id, status, reply })
            .await?
    }

    pub async fn snapshot(&self) -> Result<DashboardSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Show a notification raised outside the sequencer
    pub async fn notify(&self, notification: Notification) -> Result<()> {
        self.request(|reply| Command::Notify {
            notification,
            reply,
        })
        .await
    }

    /// Stop the task, cancelling any pending stage wakeup
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }
}
