//! Dispatch sequencer core
//!
//! Owns the dashboard state and the single run slot. Every mutation goes
//! through here; timing is left to the caller, which schedules the returned
//! [`Wakeup`] and feeds it back through [`Sequencer::advance`].

use super::run::{DispatchRun, RunId};
use super::timer::ScheduledTask;
use super::DashboardEvent;
use crate::dashboard::{DashboardSnapshot, DashboardState, MapView, Notification};
use crate::error::{LookupError, Result, ValidationError};
use firedrone_shared::{
    state_machine::is_valid_transition, DroneStatus, Incident, IncidentId, IncidentStatus,
    TransitionResult,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The next stage boundary of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    pub run_id: RunId,
    pub after: Duration,
}

pub struct Sequencer {
    state: DashboardState,
    run: Option<DispatchRun>,
    next_run_id: u64,
    time_scale: f64,
    events: mpsc::UnboundedSender<DashboardEvent>,
}

impl Sequencer {
    pub fn new(
        state: DashboardState,
        time_scale: f64,
        events: mpsc::UnboundedSender<DashboardEvent>,
    ) -> Self {
        Self {
            state,
            run: None,
            next_run_id: 1,
            time_scale,
            events,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn active_run(&self) -> Option<&DispatchRun> {
        self.run.as_ref()
    }

    pub fn map_view(&self) -> MapView {
        MapView::build(&self.state, self.run.as_ref())
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::build(&self.state, self.run.as_ref())
    }

    /// Dispatch a drone to the selected incident.
    ///
    /// Either every precondition holds and the run starts in Preparing, or
    /// the call fails and nothing is mutated.
    pub fn start_dispatch(&mut self, drone_id: &str) -> Result<Wakeup> {
        let result = self.try_start(drone_id);
        if let Err(e) = &result {
            warn!("[SEQ] Dispatch of {} rejected: {}", drone_id, e);
            self.notify(Notification::error(e.to_string()));
        }
        result
    }

    fn try_start(&mut self, drone_id: &str) -> Result<Wakeup> {
        if let Some(run) = &self.run {
            return Err(ValidationError::DispatchActive(run.drone_name.clone()).into());
        }

        let incident = self
            .state
            .incidents
            .selected()
            .ok_or(ValidationError::NoIncidentSelected)?;
        if incident.is_resolved() {
            return Err(ValidationError::IncidentResolved(incident.id.clone()).into());
        }

        let drone = self
            .state
            .roster
            .get(drone_id)
            .ok_or_else(|| ValidationError::UnknownDrone(drone_id.to_string()))?;
        if !drone.is_available() {
            return Err(ValidationError::DroneUnavailable {
                name: drone.name.clone(),
                status: drone.status,
            }
            .into());
        }

        let station = self
            .state
            .directory
            .find_station(&drone.station)
            .ok_or_else(|| LookupError::StationNotFound(drone.station.clone()))?;

        let run_id = RunId(self.next_run_id);
        let run = DispatchRun::new(run_id, drone, incident, station.coords);
        debug_assert!(!run.stage().is_terminal());
        let wakeup = Wakeup {
            run_id,
            after: self.scaled(run.stage().dwell_ms()),
        };
        self.next_run_id += 1;

        info!(
            "[SEQ] {} started: {} -> {} ({})",
            run_id, run.drone_name, run.location, run.incident_id
        );

        self.state
            .incidents
            .update_status(&run.incident_id, IncidentStatus::InProgress);
        self.notify(Notification::success(format!(
            "{} dispatched to {}",
            run.drone_name, run.location
        )));
        self.run = Some(run);

        let next = self.apply_stage();
        debug_assert_eq!(next, Some(wakeup));
        Ok(wakeup)
    }

    /// Move the active run to its next stage.
    ///
    /// Wakeups for a run that no longer exists are ignored.
    pub fn advance(&mut self, run_id: RunId) -> Option<Wakeup> {
        let run = match self.run.as_mut() {
            Some(run) if run.id == run_id => run,
            _ => {
                debug!("[SEQ] Ignoring stale wakeup for {}", run_id);
                return None;
            }
        };

        let from = run.stage();
        match run.advance() {
            TransitionResult::Entered(to) | TransitionResult::Terminal(to) => {
                debug_assert!(is_valid_transition(from, to));
                self.apply_stage()
            }
            TransitionResult::AlreadyFinished => None,
        }
    }

    /// Hand the scheduled wakeup for `run_id` to its run
    pub fn arm(&mut self, run_id: RunId, task: ScheduledTask) {
        match self.run.as_mut() {
            Some(run) if run.id == run_id => run.set_timer(task),
            // Run already gone; dropping the task cancels it
            _ => task.cancel(),
        }
    }

    /// Apply the side effects of entering the run's current stage
    fn apply_stage(&mut self) -> Option<Wakeup> {
        let run = self.run.as_ref()?;
        let stage = run.stage();
        let run_id = run.id;
        let drone_id = run.drone_id.clone();
        let incident_id = run.incident_id.clone();
        let position = run.position();
        let message = stage.log_message(&run.drone_name, &run.location);

        self.state
            .roster
            .update_status(&drone_id, stage.drone_status());

        if stage.resolves_incident() {
            self.state
                .incidents
                .update_status(&incident_id, IncidentStatus::Resolved);
            self.state.incidents.select(None);
        }

        self.append_log(&message);
        info!("[SEQ] {} entered {}", run_id, stage);
        let _ = self.events.send(DashboardEvent::StageEntered {
            run_id,
            drone_id,
            stage,
            position,
        });

        if stage.is_terminal() {
            self.finish();
            None
        } else {
            Some(Wakeup {
                run_id,
                after: self.scaled(stage.dwell_ms()),
            })
        }
    }

    /// Discard the run after its terminal stage
    fn finish(&mut self) {
        if let Some(run) = self.run.take() {
            self.state
                .roster
                .update_status(&run.drone_id, DroneStatus::Available);
            info!("[SEQ] {} finished: {} is available", run.id, run.drone_name);
            let _ = self.events.send(DashboardEvent::RunFinished {
                run_id: run.id,
                drone_id: run.drone_id,
            });
        }
    }

    /// Abort the active run: the pending wakeup is cancelled, the drone is
    /// released and an unresolved incident goes back to Reported.
    pub fn cancel_dispatch(&mut self, reason: &str) -> bool {
        let Some(run) = self.run.take() else {
            return false;
        };

        self.state
            .roster
            .update_status(&run.drone_id, DroneStatus::Available);
        let reopen = self
            .state
            .incidents
            .get(&run.incident_id)
            .is_some_and(|i| i.status == IncidentStatus::InProgress);
        if reopen {
            self.state
                .incidents
                .update_status(&run.incident_id, IncidentStatus::Reported);
        }

        self.append_log(&format!(
            "Dispatch of {} to {} cancelled: {}",
            run.drone_name, run.location, reason
        ));
        warn!("[SEQ] {} cancelled during {}: {}", run.id, run.stage(), reason);
        let _ = self.events.send(DashboardEvent::RunCancelled {
            run_id: run.id,
            drone_id: run.drone_id.clone(),
            reason: reason.to_string(),
        });
        true
    }

    /// Host teardown: drop the run and its pending wakeup without touching
    /// the rest of the state.
    pub fn teardown(&mut self) {
        if let Some(run) = self.run.take() {
            info!("[SEQ] Tearing down {} during {}", run.id, run.stage());
        }
    }

    pub fn select_incident(&mut self, id: Option<IncidentId>) -> Result<()> {
        if let Some(wanted) = &id {
            if self.state.incidents.get(wanted).is_none() {
                let err = LookupError::IncidentNotFound(wanted.clone());
                self.notify(Notification::error(err.to_string()));
                return Err(err.into());
            }
        }
        self.state.incidents.select(id);
        Ok(())
    }

    /// Add a report coming from intake
    pub fn report_incident(&mut self, incident: Incident) {
        let message = format!("New incident reported at {}.", incident.location);
        info!("[SEQ] Incident {} reported at {}", incident.id, incident.location);
        self.state.incidents.add(incident);
        self.append_log(&message);
        self.notify(Notification::success("Fire incident reported successfully!"));
    }

    /// Roster update from outside the sequencer
    pub fn update_drone_status(&mut self, drone_id: &str, status: DroneStatus) -> Result<()> {
        let result = self.try_update_drone(drone_id, status);
        if let Err(e) = &result {
            self.notify(Notification::error(e.to_string()));
        }
        result
    }

    fn try_update_drone(&mut self, drone_id: &str, status: DroneStatus) -> Result<()> {
        if let Some(run) = self.run.as_ref().filter(|r| r.references_drone(drone_id)) {
            return Err(ValidationError::Busy(run.drone_name.clone()).into());
        }
        if !self.state.roster.update_status(drone_id, status) {
            return Err(ValidationError::UnknownDrone(drone_id.to_string()).into());
        }
        Ok(())
    }

    /// Incident status update from outside the sequencer
    pub fn update_incident_status(
        &mut self,
        id: &IncidentId,
        status: IncidentStatus,
    ) -> Result<()> {
        let result = self.try_update_incident(id, status);
        if let Err(e) = &result {
            self.notify(Notification::error(e.to_string()));
        }
        result
    }

    fn try_update_incident(&mut self, id: &IncidentId, status: IncidentStatus) -> Result<()> {
        if let Some(run) = self.run.as_ref().filter(|r| r.references_incident(id)) {
            return Err(ValidationError::Busy(run.location.clone()).into());
        }
        if !self.state.incidents.update_status(id, status) {
            return Err(LookupError::IncidentNotFound(id.clone()).into());
        }
        Ok(())
    }

    fn append_log(&mut self, message: &str) {
        let entry = self.state.log.append(message).to_string();
        let _ = self.events.send(DashboardEvent::LogAppended(entry));
    }

    pub fn notify(&self, notification: Notification) {
        let _ = self.events.send(DashboardEvent::Notify(notification));
    }

    fn scaled(&self, ms: u64) -> Duration {
        Duration::from_millis((ms as f64 * self.time_scale).round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::error::DashboardError;
    use chrono::Utc;
    use firedrone_shared::{seed, Coordinate, Directory, Stage, Station};

    fn sequencer() -> (Sequencer, mpsc::UnboundedReceiver<DashboardEvent>) {
        let state = DashboardState::seeded(&DashboardConfig::default(), Utc::now());
        let (tx, rx) = mpsc::unbounded_channel();
        (Sequencer::new(state, 1.0, tx), rx)
    }

    /// Drive a run to completion, returning the wakeup delays seen
    fn run_to_end(seq: &mut Sequencer, first: Wakeup) -> Vec<Duration> {
        let mut delays = vec![first.after];
        let mut next = Some(first);
        while let Some(w) = next {
            next = seq.advance(w.run_id);
            if let Some(n) = next {
                delays.push(n.after);
            }
        }
        delays
    }

    fn stages(rx: &mut mpsc::UnboundedReceiver<DashboardEvent>) -> Vec<Stage> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if let DashboardEvent::StageEntered { stage, .. } = ev {
                out.push(stage);
            }
        }
        out
    }

    #[test]
    fn test_start_dispatch_enters_preparing() {
        let (mut seq, _rx) = sequencer();
        let log_before = seq.state().log.len();

        let wakeup = seq.start_dispatch("phoenix-1").expect("dispatch failed");
        assert_eq!(wakeup.after, Duration::from_millis(1200));
        assert_eq!(seq.active_run().map(|r| r.id), Some(wakeup.run_id));

        let run = seq.active_run().expect("no run");
        assert_eq!(run.stage(), Stage::Preparing);
        assert_eq!(run.path, [Coordinate::new(7.46, 10.54), Coordinate::new(7.4439, 10.52)]);

        let state = seq.state();
        assert_eq!(state.roster.get("phoenix-1").unwrap().status, DroneStatus::EnRoute);
        assert_eq!(
            state.incidents.get(&IncidentId::Number(1)).unwrap().status,
            IncidentStatus::InProgress
        );
        assert_eq!(state.log.len(), log_before + 1);
        assert!(state.log.entries().last().unwrap().ends_with(
            "Dispatching Phoenix-1 to Kaduna Central Market. Preparing for takeoff."
        ));
    }

    #[test]
    fn test_full_run() {
        let (mut seq, mut rx) = sequencer();
        let log_before = seq.state().log.len();

        let first = seq.start_dispatch("phoenix-1").unwrap();
        let delays = run_to_end(&mut seq, first);

        let expected: Vec<Duration> = [1200, 2000, 4000, 3000, 4000, 7000, 5000, 5000, 0, 10000]
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect();
        assert_eq!(delays, expected);
        assert_eq!(delays.iter().sum::<Duration>(), Duration::from_millis(41_200));

        assert_eq!(stages(&mut rx), Stage::ALL.to_vec());
        assert!(seq.active_run().is_none());

        let state = seq.state();
        assert_eq!(state.roster.get("phoenix-1").unwrap().status, DroneStatus::Available);
        assert!(state.incidents.get(&IncidentId::Number(1)).unwrap().is_resolved());
        assert!(state.incidents.selected().is_none());
        assert_eq!(state.log.len(), log_before + Stage::ALL.len());

        let view = seq.map_view();
        assert!(view.path.is_none());
        assert!(view.active_drone.is_none());
        assert!(view.stage.is_none());
        assert!(view.position.is_none());
    }

    #[test]
    fn test_one_log_entry_per_stage() {
        let (mut seq, _rx) = sequencer();
        let mut wakeup = seq.start_dispatch("phoenix-1").ok();
        let mut history: Vec<String> = seq.state().log.entries().to_vec();

        while let Some(w) = wakeup {
            wakeup = seq.advance(w.run_id);
            let entries = seq.state().log.entries();
            assert_eq!(entries.len(), history.len() + 1);
            assert_eq!(&entries[..history.len()], &history[..]);
            history = entries.to_vec();
        }
    }

    #[test]
    fn test_incident_resolved_at_fire_extinguished() {
        let (mut seq, _rx) = sequencer();
        let mut wakeup = seq.start_dispatch("phoenix-1").ok();

        while let Some(w) = wakeup {
            wakeup = seq.advance(w.run_id);
            let Some(run) = seq.active_run() else { break };
            let resolved = seq
                .state()
                .incidents
                .get(&IncidentId::Number(1))
                .unwrap()
                .is_resolved();
            assert_eq!(resolved, run.stage().index() >= Stage::FireExtinguished.index());
        }
    }

    #[test]
    fn test_unavailable_drone_rejected() {
        let (mut seq, _rx) = sequencer();
        let before = seq.state().clone();

        let err = seq.start_dispatch("sky-marshal").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Validation(ValidationError::DroneUnavailable {
                status: DroneStatus::Charging,
                ..
            })
        ));
        assert_eq!(seq.state(), &before);
        assert!(seq.active_run().is_none());
    }

    #[test]
    fn test_no_selection_rejected() {
        let (mut seq, _rx) = sequencer();
        seq.select_incident(None).unwrap();
        let before = seq.state().clone();

        let err = seq.start_dispatch("phoenix-1").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Validation(ValidationError::NoIncidentSelected)
        ));
        assert_eq!(seq.state(), &before);
    }

    #[test]
    fn test_resolved_incident_rejected() {
        let (mut seq, _rx) = sequencer();
        seq.update_incident_status(&IncidentId::Number(1), IncidentStatus::Resolved)
            .unwrap();
        let before = seq.state().clone();

        let err = seq.start_dispatch("phoenix-1").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Validation(ValidationError::IncidentResolved(_))
        ));
        assert_eq!(seq.state(), &before);
    }

    #[test]
    fn test_missing_station_rejected() {
        let state = DashboardState::new(
            Directory::new(
                vec![Station::new("Bravo Station", Coordinate::new(7.37, 10.44))],
                Vec::new(),
            ),
            seed::incidents(Utc::now()),
            seed::drones(),
        );
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut seq = Sequencer::new(state, 1.0, tx);
        let before = seq.state().clone();

        let err = seq.start_dispatch("phoenix-1").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Lookup(LookupError::StationNotFound(ref name))
                if name == "Alpha Station"
        ));
        assert_eq!(seq.state(), &before);

        // Bravo drones still dispatch
        assert!(seq.start_dispatch("inferno-douser-5").is_ok());
    }

    #[test]
    fn test_second_dispatch_rejected_while_active() {
        let (mut seq, _rx) = sequencer();
        let first = seq.start_dispatch("phoenix-1").unwrap();
        seq.select_incident(Some(IncidentId::Number(2))).unwrap();
        let before = seq.state().clone();

        let err = seq.start_dispatch("aqua-jet-3").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Validation(ValidationError::DispatchActive(_))
        ));
        assert_eq!(seq.state(), &before);
        assert_eq!(seq.active_run().map(|r| r.id), Some(first.run_id));
    }

    #[test]
    fn test_next_dispatch_after_finish() {
        let (mut seq, _rx) = sequencer();
        let first = seq.start_dispatch("phoenix-1").unwrap();
        run_to_end(&mut seq, first);

        seq.select_incident(Some(IncidentId::Number(2))).unwrap();
        let second = seq.start_dispatch("phoenix-1").unwrap();
        assert_ne!(second.run_id, first.run_id);
    }

    #[test]
    fn test_stale_wakeup_ignored() {
        let (mut seq, _rx) = sequencer();
        let first = seq.start_dispatch("phoenix-1").unwrap();
        run_to_end(&mut seq, first);
        let log_len = seq.state().log.len();

        assert!(seq.advance(first.run_id).is_none());
        assert!(seq.advance(RunId(42)).is_none());
        assert_eq!(seq.state().log.len(), log_len);
    }

    #[test]
    fn test_cancel_reopens_incident() {
        let (mut seq, mut rx) = sequencer();
        let w = seq.start_dispatch("phoenix-1").unwrap();
        seq.advance(w.run_id);

        assert!(seq.cancel_dispatch("operator abort"));
        assert!(!seq.cancel_dispatch("again"));
        assert!(seq.advance(w.run_id).is_none());

        let state = seq.state();
        assert_eq!(state.roster.get("phoenix-1").unwrap().status, DroneStatus::Available);
        assert_eq!(
            state.incidents.get(&IncidentId::Number(1)).unwrap().status,
            IncidentStatus::Reported
        );
        assert!(state.log.entries().last().unwrap().contains("cancelled: operator abort"));

        let cancelled = std::iter::from_fn(|| rx.try_recv().ok())
            .any(|ev| matches!(ev, DashboardEvent::RunCancelled { .. }));
        assert!(cancelled);
    }

    #[test]
    fn test_external_updates_blocked_for_active_run() {
        let (mut seq, _rx) = sequencer();
        seq.start_dispatch("phoenix-1").unwrap();

        assert!(matches!(
            seq.update_drone_status("phoenix-1", DroneStatus::Charging),
            Err(DashboardError::Validation(ValidationError::Busy(_)))
        ));
        assert!(matches!(
            seq.update_incident_status(&IncidentId::Number(1), IncidentStatus::Resolved),
            Err(DashboardError::Validation(ValidationError::Busy(_)))
        ));

        // Uninvolved entities are still free
        seq.update_drone_status("aqua-jet-3", DroneStatus::Charging).unwrap();
        seq.update_incident_status(&IncidentId::Number(2), IncidentStatus::InProgress)
            .unwrap();
    }

    #[test]
    fn test_report_incident_logs_and_prepends() {
        let (mut seq, mut rx) = sequencer();
        let incident = Incident::new(
            99u64,
            "Kawo",
            Coordinate::new(7.4833, 10.5667),
            "Thick smoke",
            Utc::now(),
        );
        seq.report_incident(incident);

        assert_eq!(seq.state().incidents.list()[0].id, IncidentId::Number(99));
        assert!(seq
            .state()
            .log
            .entries()
            .last()
            .unwrap()
            .ends_with("New incident reported at Kawo."));
        let notified = std::iter::from_fn(|| rx.try_recv().ok())
            .any(|ev| matches!(ev, DashboardEvent::Notify(_)));
        assert!(notified);
    }

    #[test]
    fn test_time_scale() {
        let state = DashboardState::seeded(&DashboardConfig::default(), Utc::now());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut seq = Sequencer::new(state, 0.1, tx);
        let w = seq.start_dispatch("phoenix-1").unwrap();
        assert_eq!(w.after, Duration::from_millis(120));
    }

    #[test]
    fn test_view_follows_stage() {
        let (mut seq, _rx) = sequencer();
        let w = seq.start_dispatch("phoenix-1").unwrap();

        let view = seq.map_view();
        assert_eq!(view.stage, Some("Preparing"));
        assert_eq!(view.stage_image, Some("drone-preparing"));
        assert_eq!(view.position, Some(Coordinate::new(7.46, 10.54)));
        assert_eq!(view.active_drone.as_ref().map(|d| d.name.as_str()), Some("Phoenix-1"));

        let w = seq.advance(w.run_id).unwrap();
        seq.advance(w.run_id);
        let view = seq.map_view();
        assert_eq!(view.stage, Some("En Route"));
        assert_eq!(view.position, Some(Coordinate::new(7.4439, 10.52)));
        assert_eq!(seq.snapshot().progress, 27);
    }
}
