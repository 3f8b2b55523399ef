//! Error taxonomy for the dashboard
//!
//! Every error is recovered at the boundary that detects it and surfaced to
//! the user as a notification; none of them stop the dashboard.

use firedrone_shared::{codec::CodecError, DroneStatus, IncidentId};
use thiserror::Error;

/// Bad user input or a request the current state does not allow
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("No incident selected to dispatch to.")]
    NoIncidentSelected,

    #[error("Incident {0} is already resolved")]
    IncidentResolved(IncidentId),

    #[error("Unknown drone: {0}")]
    UnknownDrone(String),

    #[error("{name} is not available (status: {status})")]
    DroneUnavailable { name: String, status: DroneStatus },

    #[error("{0} is already on a dispatch run")]
    DispatchActive(String),

    #[error("{0} is part of the active dispatch run")]
    Busy(String),
}

/// A name that should resolve in the directory or stores did not
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Could not find drone station: {0}")]
    StationNotFound(String),

    #[error("Incident not found: {0}")]
    IncidentNotFound(IncidentId),
}

/// The host environment cannot provide something the user asked for
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvironmentError {
    #[error("Geolocation is not supported on this device.")]
    GeolocationUnsupported,

    #[error("Unable to retrieve your location: {0}")]
    GeolocationDenied(String),
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("Report inbox is corrupt: {0}")]
    Codec(#[from] CodecError),

    #[error("Report store error: {0}")]
    Store(#[from] std::io::Error),

    #[error("Sequencer is not running")]
    Closed,
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
