//! Dispatch State Machine
//!
//! Defines the fixed stage table of a dispatch run and the valid transitions
//! between stages.

use crate::DroneStatus;
use std::fmt;

/// Stages of a dispatch run, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Drone is being readied at its station
    Preparing,
    /// Lifting off from the station pad
    TakingOff,
    /// Flying out to the incident
    EnRoute,
    /// Reached the incident coordinate
    ArrivedOnSite,
    /// Surveying the fire before engaging
    Surveillance,
    /// Dropping water/foam
    ActiveFirefighting,
    /// Incident resolved
    FireExtinguished,
    /// Flying back to the station
    ReturningToBase,
    /// Landed at the station
    ArrivedAtBase,
    /// Recharging on the pad
    Charging,
    /// Terminal: drone available again
    Ready,
}

/// Which end of the dispatch path the drone marker sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Station,
    Incident,
}

/// Static description of one stage
#[derive(Debug)]
pub struct StageDef {
    pub stage: Stage,
    pub label: &'static str,
    pub dwell_ms: u64,
    pub drone_status: DroneStatus,
    pub position: Endpoint,
    pub image: Option<&'static str>,
    /// Log line; `{drone}` and `{location}` are substituted
    pub template: &'static str,
}

pub const STAGE_COUNT: usize = 11;

/// The stage table. Dwell is the time spent in a stage before the next one.
pub const STAGES: [StageDef; STAGE_COUNT] = [
    StageDef {
        stage: Stage::Preparing,
        label: "Preparing",
        dwell_ms: 1200,
        drone_status: DroneStatus::EnRoute,
        position: Endpoint::Station,
        image: Some("drone-preparing"),
        template: "Dispatching {drone} to {location}. Preparing for takeoff.",
    },
    StageDef {
        stage: Stage::TakingOff,
        label: "Taking Off",
        dwell_ms: 2000,
        drone_status: DroneStatus::EnRoute,
        position: Endpoint::Station,
        image: Some("drone-takeoff"),
        template: "{drone} is taking off from base.",
    },
    StageDef {
        stage: Stage::EnRoute,
        label: "En Route",
        dwell_ms: 4000,
        drone_status: DroneStatus::EnRoute,
        position: Endpoint::Incident,
        image: Some("drone-en-route"),
        template: "{drone} is en route to {location}.",
    },
    StageDef {
        stage: Stage::ArrivedOnSite,
        label: "Arrived On Site",
        dwell_ms: 3000,
        drone_status: DroneStatus::OnSite,
        position: Endpoint::Incident,
        image: Some("drone-on-site"),
        template: "{drone} has arrived at {location}.",
    },
    StageDef {
        stage: Stage::Surveillance,
        label: "Surveillance",
        dwell_ms: 4000,
        drone_status: DroneStatus::OnSite,
        position: Endpoint::Incident,
        image: Some("drone-surveillance"),
        template: "{drone} is surveying the fire at {location}.",
    },
    StageDef {
        stage: Stage::ActiveFirefighting,
        label: "Active Firefighting",
        dwell_ms: 7000,
        drone_status: DroneStatus::OnSite,
        position: Endpoint::Incident,
        image: Some("drone-firefighting"),
        template: "{drone} is fighting the fire at {location}.",
    },
    StageDef {
        stage: Stage::FireExtinguished,
        label: "Fire Extinguished",
        dwell_ms: 5000,
        drone_status: DroneStatus::OnSite,
        position: Endpoint::Incident,
        image: Some("drone-extinguished"),
        template: "Fire at {location} has been extinguished by {drone}.",
    },
    StageDef {
        stage: Stage::ReturningToBase,
        label: "Returning to Base",
        dwell_ms: 5000,
        drone_status: DroneStatus::Returning,
        position: Endpoint::Station,
        image: Some("drone-returning"),
        template: "{drone} is returning to base.",
    },
    StageDef {
        stage: Stage::ArrivedAtBase,
        label: "Arrived at Base",
        dwell_ms: 0,
        drone_status: DroneStatus::Returning,
        position: Endpoint::Station,
        image: None,
        template: "{drone} has arrived at base.",
    },
    StageDef {
        stage: Stage::Charging,
        label: "Charging",
        dwell_ms: 10000,
        drone_status: DroneStatus::Charging,
        position: Endpoint::Station,
        image: Some("drone-charging"),
        template: "{drone} is now charging.",
    },
    StageDef {
        stage: Stage::Ready,
        label: "Ready",
        dwell_ms: 0,
        drone_status: DroneStatus::Available,
        position: Endpoint::Station,
        image: None,
        template: "{drone} is charged and available.",
    },
];

impl Stage {
    /// All stages in table order
    pub const ALL: [Stage; STAGE_COUNT] = [
        Stage::Preparing,
        Stage::TakingOff,
        Stage::EnRoute,
        Stage::ArrivedOnSite,
        Stage::Surveillance,
        Stage::ActiveFirefighting,
        Stage::FireExtinguished,
        Stage::ReturningToBase,
        Stage::ArrivedAtBase,
        Stage::Charging,
        Stage::Ready,
    ];

    /// Position in the stage table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn def(self) -> &'static StageDef {
        &STAGES[self.index()]
    }

    pub fn label(self) -> &'static str {
        self.def().label
    }

    pub fn dwell_ms(self) -> u64 {
        self.def().dwell_ms
    }

    pub fn drone_status(self) -> DroneStatus {
        self.def().drone_status
    }

    pub fn position(self) -> Endpoint {
        self.def().position
    }

    pub fn image(self) -> Option<&'static str> {
        self.def().image
    }

    /// The stage that follows this one, if any
    pub fn next(self) -> Option<Stage> {
        Stage::ALL.get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Entering this stage resolves the incident
    pub fn resolves_incident(self) -> bool {
        self == Stage::FireExtinguished
    }

    /// Milliseconds from run start until this stage is entered
    pub fn offset_ms(self) -> u64 {
        STAGES[..self.index()].iter().map(|s| s.dwell_ms).sum()
    }

    /// Render the log line for this stage
    pub fn log_message(self, drone: &str, location: &str) -> String {
        self.def()
            .template
            .replace("{drone}", drone)
            .replace("{location}", location)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Completion percentage shown next to the stage list, 0 when idle
pub fn progress_percent(stage: Option<Stage>) -> u8 {
    match stage {
        Some(s) => (((s.index() + 1) * 100) / STAGE_COUNT) as u8,
        None => 0,
    }
}

/// Result of a transition attempt
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionResult {
    /// Moved into a non-terminal stage
    Entered(Stage),
    /// Moved into the terminal stage; the run is over
    Terminal(Stage),
    /// The machine already reached its terminal stage
    AlreadyFinished,
}

/// Walks the stage table for a single dispatch run
#[derive(Debug)]
pub struct DispatchStateMachine {
    current: Stage,
    finished: bool,
}

impl Default for DispatchStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchStateMachine {
    /// Create a new state machine in Preparing
    pub fn new() -> Self {
        Self {
            current: Stage::Preparing,
            finished: false,
        }
    }

    /// Get current stage
    pub fn stage(&self) -> Stage {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Move to the next stage in the table
    pub fn advance(&mut self) -> TransitionResult {
        if self.finished {
            return TransitionResult::AlreadyFinished;
        }

        match self.current.next() {
            Some(next) => {
                self.current = next;
                if next.is_terminal() {
                    self.finished = true;
                    TransitionResult::Terminal(next)
                } else {
                    TransitionResult::Entered(next)
                }
            }
            // Only reachable if the machine was built at the terminal stage
            None => {
                self.finished = true;
                TransitionResult::AlreadyFinished
            }
        }
    }
}

/// Check if a transition from one stage to another follows the table
pub fn is_valid_transition(from: Stage, to: Stage) -> bool {
    from.next() == Some(to)
}
