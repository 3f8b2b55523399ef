//! Dispatch sequencing
//!
//! This module handles:
//! - Validating dispatch requests against the single run slot
//! - Walking a run through the stage table on its dwell schedule
//! - Cancelling pending stage wakeups on abort or teardown
//! - Serializing all dashboard mutation through one task

mod actor;
mod engine;
mod run;
mod timer;

pub use actor::{spawn, SequencerHandle};
pub use engine::{Sequencer, Wakeup};
pub use run::{DispatchRun, RunId};
pub use timer::ScheduledTask;

use crate::dashboard::Notification;
use firedrone_shared::{Coordinate, Stage};

/// Events emitted by the sequencer for the map, panels and log view
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// A status log entry was appended
    LogAppended(String),
    /// The active run entered a stage
    StageEntered {
        run_id: RunId,
        drone_id: String,
        stage: Stage,
        position: Coordinate,
    },
    /// The run reached Ready and was discarded
    RunFinished { run_id: RunId, drone_id: String },
    /// The run was aborted before Ready
    RunCancelled {
        run_id: RunId,
        drone_id: String,
        reason: String,
    },
    /// Transient user notification
    Notify(Notification),
}
