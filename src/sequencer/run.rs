//! The private state of one dispatch run

use super::timer::ScheduledTask;
use firedrone_shared::{
    Coordinate, DispatchStateMachine, Drone, Endpoint, Incident, IncidentId, Stage,
    TransitionResult,
};
use std::fmt;

/// Identifies a run so late timer wakeups can be told apart from current ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// One drone working one incident through the stage table
#[derive(Debug)]
pub struct DispatchRun {
    pub id: RunId,
    pub drone_id: String,
    pub drone_name: String,
    pub drone_image: String,
    pub incident_id: IncidentId,
    pub location: String,
    /// `[station, incident]`
    pub path: [Coordinate; 2],
    fsm: DispatchStateMachine,
    timer: Option<ScheduledTask>,
}

impl DispatchRun {
    pub fn new(id: RunId, drone: &Drone, incident: &Incident, station: Coordinate) -> Self {
        Self {
            id,
            drone_id: drone.id.clone(),
            drone_name: drone.name.clone(),
            drone_image: drone.image_url.clone(),
            incident_id: incident.id.clone(),
            location: incident.location.clone(),
            path: [station, incident.coords],
            fsm: DispatchStateMachine::new(),
            timer: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.fsm.stage()
    }

    pub fn advance(&mut self) -> TransitionResult {
        self.fsm.advance()
    }

    /// Marker position: one of the two path endpoints, never in between
    pub fn position(&self) -> Coordinate {
        match self.stage().position() {
            Endpoint::Station => self.path[0],
            Endpoint::Incident => self.path[1],
        }
    }

    /// Hold the pending wakeup. Replacing it aborts the previous one.
    pub fn set_timer(&mut self, task: ScheduledTask) {
        self.timer = Some(task);
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn references_drone(&self, drone_id: &str) -> bool {
        self.drone_id == drone_id
    }

    pub fn references_incident(&self, incident_id: &IncidentId) -> bool {
        &self.incident_id == incident_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use firedrone_shared::seed;

    fn phoenix_run() -> DispatchRun {
        let drone = &seed::drones()[0];
        let incident = &seed::incidents(Utc::now())[0];
        DispatchRun::new(RunId(1), drone, incident, Coordinate::new(7.46, 10.54))
    }

    #[test]
    fn test_path_and_position() {
        let mut run = phoenix_run();
        assert_eq!(run.path, [Coordinate::new(7.46, 10.54), Coordinate::new(7.4439, 10.52)]);
        assert_eq!(run.position(), run.path[0]);

        run.advance(); // TakingOff
        assert_eq!(run.position(), run.path[0]);
        run.advance(); // EnRoute
        assert_eq!(run.position(), run.path[1]);
    }

    #[test]
    fn test_references() {
        let run = phoenix_run();
        assert!(run.references_drone("phoenix-1"));
        assert!(!run.references_drone("aqua-jet-3"));
        assert!(run.references_incident(&IncidentId::Number(1)));
        assert!(!run.has_pending_timer());
        assert_eq!(run.id.to_string(), "run-1");
    }
}
