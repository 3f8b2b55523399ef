//! Incident store with single selection

use firedrone_shared::{Incident, IncidentId, IncidentStatus};

/// All incidents ever seen this session, newest report first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncidentStore {
    incidents: Vec<Incident>,
    selected: Option<IncidentId>,
}

impl IncidentStore {
    /// Create a store; the first incident starts out selected
    pub fn new(incidents: Vec<Incident>) -> Self {
        let selected = incidents.first().map(|i| i.id.clone());
        Self {
            incidents,
            selected,
        }
    }

    pub fn list(&self) -> &[Incident] {
        &self.incidents
    }

    /// Incidents still shown in the incidents panel
    pub fn active(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.iter().filter(|i| !i.is_resolved())
    }

    pub fn get(&self, id: &IncidentId) -> Option<&Incident> {
        self.incidents.iter().find(|i| &i.id == id)
    }

    /// Add a newly reported incident at the top of the list
    pub fn add(&mut self, incident: Incident) {
        self.incidents.insert(0, incident);
    }

    /// Returns false if no incident has that id
    pub fn update_status(&mut self, id: &IncidentId, status: IncidentStatus) -> bool {
        match self.incidents.iter_mut().find(|i| &i.id == id) {
            Some(incident) => {
                incident.status = status;
                true
            }
            None => false,
        }
    }

    /// Select an incident, or clear the selection with `None`.
    /// Returns false (and keeps the old selection) for an unknown id.
    pub fn select(&mut self, id: Option<IncidentId>) -> bool {
        match id {
            Some(id) if self.get(&id).is_none() => false,
            other => {
                self.selected = other;
                true
            }
        }
    }

    pub fn selected(&self) -> Option<&Incident> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<&IncidentId> {
        self.selected.as_ref()
    }
}
