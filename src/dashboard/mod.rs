//! Dashboard state owned by the sequencer
//!
//! This module holds:
//! - The incident store and its selection
//! - The drone roster
//! - The append-only status log
//! - Map view snapshots and user notifications

mod incidents;
mod log;
mod roster;
mod view;

pub use incidents::IncidentStore;
pub use log::LogSink;
pub use roster::DroneRoster;
pub use view::{ActiveDrone, DashboardSnapshot, MapView};

use crate::config::DashboardConfig;
use chrono::{DateTime, Utc};
use firedrone_shared::{defaults, seed, Coordinate, Directory, Drone, Incident};

/// Severity of a transient user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A transient toast shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Shared mutable state of one dashboard session
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub incidents: IncidentStore,
    pub roster: DroneRoster,
    pub log: LogSink,
    pub directory: Directory,
    pub map_center: Coordinate,
    pub map_zoom: u8,
}

impl DashboardState {
    pub fn new(directory: Directory, incidents: Vec<Incident>, drones: Vec<Drone>) -> Self {
        let mut log = LogSink::new();
        log.append(defaults::LOG_BANNER);

        Self {
            incidents: IncidentStore::new(incidents),
            roster: DroneRoster::new(drones),
            log,
            directory,
            map_center: defaults::MAP_CENTER,
            map_zoom: defaults::MAP_ZOOM,
        }
    }

    /// The built-in fleet and incidents over the Kaduna directory
    pub fn seeded(config: &DashboardConfig, now: DateTime<Utc>) -> Self {
        let mut state = Self::new(Directory::kaduna(), seed::incidents(now), seed::drones());
        state.map_center = config.map_center;
        state.map_zoom = config.map_zoom;
        state
    }
}
