//! Fire report form

use super::geolocation::GeolocationProvider;
use crate::error::{EnvironmentError, ValidationError};
use chrono::Utc;
use firedrone_shared::{now_ms, Coordinate, Directory, Incident};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// What the user has typed into the report form so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDraft {
    pub description: String,
    pub location: String,
    /// Set by "use my location"; takes precedence over the directory
    pub geolocation: Option<Coordinate>,
}

impl ReportDraft {
    pub fn new(description: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            location: location.into(),
            geolocation: None,
        }
    }

    /// Pick a location from the directory list, dropping any device fix
    pub fn pick_location(&mut self, name: impl Into<String>) {
        self.location = name.into();
        self.geolocation = None;
    }
}

/// Turns drafts into incident records
pub struct ReportIntake {
    directory: Directory,
    geolocation: Arc<dyn GeolocationProvider>,
    last_id: AtomicU64,
}

impl ReportIntake {
    pub fn new(directory: Directory, geolocation: Arc<dyn GeolocationProvider>) -> Self {
        Self {
            directory,
            geolocation,
            last_id: AtomicU64::new(0),
        }
    }

    /// Fill the draft's location from the device position.
    ///
    /// On failure the draft is left as it was, so the user can still pick a
    /// location by hand.
    pub async fn locate(&self, draft: &mut ReportDraft) -> Result<Coordinate, EnvironmentError> {
        match self.geolocation.current_position().await {
            Ok(position) => {
                draft.location = format!("Current Location ({})", position);
                draft.geolocation = Some(position);
                info!("[INTAKE] Location found: {}", position);
                Ok(position)
            }
            Err(e) => {
                warn!("[INTAKE] Geolocation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Validate the draft and build a Reported incident
    pub fn submit(&self, draft: ReportDraft) -> Result<Incident, ValidationError> {
        let description = draft.description.trim();
        let typed = draft.location.trim();
        if description.is_empty() || (typed.is_empty() && draft.geolocation.is_none()) {
            return Err(ValidationError::MissingFields);
        }

        let (location, coords) = match draft.geolocation {
            Some(position) if typed.is_empty() => {
                (format!("Current Location ({})", position), position)
            }
            Some(position) => (typed.to_string(), position),
            None => {
                let coords = self
                    .directory
                    .find_location(typed)
                    .ok_or_else(|| ValidationError::UnknownLocation(typed.to_string()))?;
                (typed.to_string(), coords)
            }
        };

        let incident = Incident::new(self.next_id(), location, coords, description, Utc::now());
        info!("[INTAKE] Report {} filed at {}", incident.id, incident.location);
        Ok(incident)
    }

    /// Millisecond timestamp ids, bumped to stay unique within the process
    fn next_id(&self) -> u64 {
        let now = now_ms();
        let prev = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_default();
        now.max(prev + 1)
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }
}
