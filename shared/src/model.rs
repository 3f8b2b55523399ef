//! Domain records: incidents, drones, stations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `[lon, lat]` pair, serialized as a two-element array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Caller-assigned incident identifier. Seed data uses integers, reports
/// coming from other producers may use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncidentId {
    Number(u64),
    Text(String),
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidentId::Number(n) => write!(f, "{}", n),
            IncidentId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for IncidentId {
    fn from(n: u64) -> Self {
        IncidentId::Number(n)
    }
}

impl From<&str> for IncidentId {
    fn from(s: &str) -> Self {
        IncidentId::Text(s.to_string())
    }
}

impl From<String> for IncidentId {
    fn from(s: String) -> Self {
        IncidentId::Text(s)
    }
}

/// Lifecycle of an incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentStatus {
    Reported,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IncidentStatus::Reported => "Reported",
            IncidentStatus::InProgress => "In Progress",
            IncidentStatus::Resolved => "Resolved",
        };
        f.write_str(s)
    }
}

/// A reported fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub location: String,
    pub coords: Coordinate,
    pub status: IncidentStatus,
    pub report: String,
    pub timestamp: DateTime<Utc>,
}

impl Incident {
    /// Create a freshly reported incident
    pub fn new(
        id: impl Into<IncidentId>,
        location: impl Into<String>,
        coords: Coordinate,
        report: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            coords,
            status: IncidentStatus::Reported,
            report: report.into(),
            timestamp,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == IncidentStatus::Resolved
    }
}

/// Roster-level drone status. The sequencer's stage label is tracked
/// separately and never stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DroneStatus {
    Available,
    Charging,
    #[serde(rename = "En Route")]
    EnRoute,
    #[serde(rename = "On Site")]
    OnSite,
    Returning,
}

impl fmt::Display for DroneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DroneStatus::Available => "Available",
            DroneStatus::Charging => "Charging",
            DroneStatus::EnRoute => "En Route",
            DroneStatus::OnSite => "On Site",
            DroneStatus::Returning => "Returning",
        };
        f.write_str(s)
    }
}

/// A drone in the fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub id: String,
    pub name: String,
    pub model: String,
    pub status: DroneStatus,
    /// Name of the home station
    pub station: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl Drone {
    pub fn is_available(&self) -> bool {
        self.status == DroneStatus::Available
    }
}

/// A named point on the map (drone stations and report locations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub coords: Coordinate,
}

impl Station {
    pub fn new(name: impl Into<String>, coords: Coordinate) -> Self {
        Self {
            name: name.into(),
            coords,
        }
    }
}
