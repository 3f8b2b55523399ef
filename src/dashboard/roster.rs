//! Drone roster

use firedrone_shared::{Drone, DroneStatus};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DroneRoster {
    drones: Vec<Drone>,
}

impl DroneRoster {
    pub fn new(drones: Vec<Drone>) -> Self {
        Self { drones }
    }

    pub fn list(&self) -> &[Drone] {
        &self.drones
    }

    pub fn get(&self, id: &str) -> Option<&Drone> {
        self.drones.iter().find(|d| d.id == id)
    }

    /// Returns false if no drone has that id
    pub fn update_status(&mut self, id: &str, status: DroneStatus) -> bool {
        match self.drones.iter_mut().find(|d| d.id == id) {
            Some(drone) => {
                drone.status = status;
                true
            }
            None => false,
        }
    }

    /// First drone ready to be dispatched
    pub fn first_available(&self) -> Option<&Drone> {
        self.drones.iter().find(|d| d.is_available())
    }
}
