//! Seed fleet and incidents the dashboard starts with

use crate::{Coordinate, Drone, DroneStatus, Incident};
use chrono::{DateTime, Duration, Utc};

fn drone(
    id: &str,
    name: &str,
    model: &str,
    status: DroneStatus,
    image: &str,
    station: &str,
) -> Drone {
    Drone {
        id: id.into(),
        name: name.into(),
        model: model.into(),
        status,
        station: station.into(),
        image_url: image.into(),
    }
}

/// The four-drone fleet split across Alpha and Bravo stations
pub fn drones() -> Vec<Drone> {
    vec![
        drone(
            "phoenix-1",
            "Phoenix-1",
            "Heavy-Lift Extinguisher",
            DroneStatus::Available,
            "https://images.unsplash.com/photo-1487887235947-a955ef187fcc?w=800",
            "Alpha Station",
        ),
        drone(
            "aqua-jet-3",
            "Aqua-Jet 3",
            "Rapid Response Water Cannon",
            DroneStatus::Available,
            "https://images.unsplash.com/photo-1519669556878-63bd526d6878?w=800",
            "Alpha Station",
        ),
        drone(
            "sky-marshal",
            "Sky-Marshal",
            "Surveillance & Suppression",
            DroneStatus::Charging,
            "https://images.unsplash.com/photo-1507563812226-03c2b900438a?w=800",
            "Bravo Station",
        ),
        drone(
            "inferno-douser-5",
            "Inferno Douser 5",
            "High-Capacity Foam Dropper",
            DroneStatus::Available,
            "https://images.unsplash.com/photo-1614107775599-766d59266935?w=800",
            "Bravo Station",
        ),
    ]
}

/// Two open incidents, reported 10 and 35 minutes before `now`
pub fn incidents(now: DateTime<Utc>) -> Vec<Incident> {
    vec![
        Incident::new(
            1u64,
            "Kaduna Central Market",
            Coordinate::new(7.4439, 10.5200),
            "Smoke seen coming from the electronics section.",
            now - Duration::minutes(10),
        ),
        Incident::new(
            2u64,
            "KASU",
            Coordinate::new(7.4497, 10.5283),
            "Small grass fire reported near the faculty of science.",
            now - Duration::minutes(35),
        ),
    ]
}
