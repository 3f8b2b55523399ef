//! Station / location directory
//!
//! Static, read-only lookup from a place name to its coordinate.

use crate::{Coordinate, Station};

const KADUNA_STATIONS: &[(&str, [f64; 2])] = &[
    ("Alpha Station", [7.46, 10.54]),
    ("Bravo Station", [7.37, 10.44]),
];

const KADUNA_LOCATIONS: &[(&str, [f64; 2])] = &[
    ("Kaduna Polytechnic", [7.4833, 10.5333]),
    ("KASU", [7.4497, 10.5283]),
    ("Ahmadu Bello University", [7.6278, 11.1214]),
    ("Nigerian Defence Academy", [7.3500, 10.4667]),
    ("Kaduna International Airport", [7.5958, 10.6958]),
    ("Murtala Mohammed Square", [7.4425, 10.5227]),
    ("Kaduna Central Market", [7.4439, 10.5200]),
    ("Rigasa Train Station", [7.3944, 10.4903]),
    ("Barnawa Shopping Complex", [7.4083, 10.4667]),
    ("Sabo Tasha", [7.3833, 10.4500]),
    ("Tudun Wada", [7.4250, 10.5000]),
    ("Malali", [7.4667, 10.5500]),
    ("Ungwan Rimi", [7.4500, 10.5333]),
    ("Kawo", [7.4833, 10.5667]),
    ("Gonin Gora", [7.3500, 10.4000]),
    ("Television Garage", [7.4000, 10.4833]),
    ("Command Junction", [7.3667, 10.4333]),
    ("Kakuri", [7.4000, 10.4333]),
    ("Narayi", [7.3833, 10.5000]),
    ("Zaria", [7.7167, 11.0833]),
    ("Sabon Tasha", [7.3900, 10.5000]),
    ("Millenium City", [7.4950, 10.5611]),
    ("GRA", [7.4413, 10.5569]),
    ("Magajin Gari", [7.3918, 10.5217]),
    ("Ungwan Sanusi", [7.4120, 10.4712]),
    ("Kaduna South", [7.3944, 10.4984]),
    ("Kaduna North", [7.4440, 10.5277]),
    ("Kawo Road", [7.4870, 10.5612]),
    ("Sultan Bello Mosque", [7.4426, 10.5226]),
];

fn to_stations(table: &[(&str, [f64; 2])]) -> Vec<Station> {
    table
        .iter()
        .map(|(name, coords)| Station::new(*name, Coordinate::from(*coords)))
        .collect()
}

/// Drone stations and reportable locations
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    stations: Vec<Station>,
    locations: Vec<Station>,
}

impl Default for Directory {
    fn default() -> Self {
        Self::kaduna()
    }
}

impl Directory {
    pub fn new(stations: Vec<Station>, locations: Vec<Station>) -> Self {
        Self {
            stations,
            locations,
        }
    }

    /// The built-in Kaduna directory
    pub fn kaduna() -> Self {
        Self::new(to_stations(KADUNA_STATIONS), to_stations(KADUNA_LOCATIONS))
    }

    pub fn find_station(&self, name: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.name == name)
    }

    pub fn find_location(&self, name: &str) -> Option<Coordinate> {
        self.locations
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.coords)
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn locations(&self) -> &[Station] {
        &self.locations
    }
}
