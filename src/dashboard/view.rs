//! Map view snapshot
//!
//! Everything the map surface needs to render one frame. The map never calls
//! back into the sequencer.

use super::DashboardState;
use crate::sequencer::DispatchRun;
use firedrone_shared::{
    state_machine::progress_percent, Coordinate, Drone, Incident, IncidentId, Stage, Station,
};
use serde::Serialize;

/// Marker descriptor for the drone currently on a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveDrone {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub incidents: Vec<Incident>,
    pub stations: Vec<Station>,
    /// `[station, incident]` of the active run
    pub path: Option<[Coordinate; 2]>,
    pub active_drone: Option<ActiveDrone>,
    pub stage: Option<&'static str>,
    pub stage_image: Option<&'static str>,
    pub position: Option<Coordinate>,
    pub selected_incident: Option<IncidentId>,
}

impl MapView {
    pub fn build(state: &DashboardState, run: Option<&DispatchRun>) -> Self {
        Self {
            center: state.map_center,
            zoom: state.map_zoom,
            incidents: state.incidents.list().to_vec(),
            stations: state.directory.stations().to_vec(),
            path: run.map(|r| r.path),
            active_drone: run.map(|r| ActiveDrone {
                id: r.drone_id.clone(),
                name: r.drone_name.clone(),
                image_url: r.drone_image.clone(),
            }),
            stage: run.map(|r| r.stage().label()),
            stage_image: run.and_then(|r| r.stage().image()),
            position: run.map(|r| r.position()),
            selected_incident: state.incidents.selected_id().cloned(),
        }
    }
}

/// Full read-out of the dashboard for callers outside the sequencer task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub incidents: Vec<Incident>,
    pub drones: Vec<Drone>,
    pub log: Vec<String>,
    pub view: MapView,
    #[serde(skip)]
    pub stage: Option<Stage>,
    pub progress: u8,
}

impl DashboardSnapshot {
    pub fn build(state: &DashboardState, run: Option<&DispatchRun>) -> Self {
        let stage = run.map(|r| r.stage());
        Self {
            incidents: state.incidents.list().to_vec(),
            drones: state.roster.list().to_vec(),
            log: state.log.entries().to_vec(),
            view: MapView::build(state, run),
            stage,
            progress: progress_percent(stage),
        }
    }

    /// Incidents still open
    pub fn active_incidents(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.iter().filter(|i| !i.is_resolved())
    }

    pub fn drone(&self, id: &str) -> Option<&Drone> {
        self.drones.iter().find(|d| d.id == id)
    }

    pub fn incident(&self, id: &IncidentId) -> Option<&Incident> {
        self.incidents.iter().find(|i| &i.id == id)
    }
}
