//! Firedrone Shared Types
//!
//! This crate provides the domain model, the dispatch stage table and the
//! static station/location directory used by the dispatch simulator.

pub mod codec;
pub mod directory;
pub mod model;
pub mod seed;
pub mod state_machine;

use std::time::{SystemTime, UNIX_EPOCH};

// Re-export commonly used types at crate root
pub use directory::Directory;
pub use model::*;
pub use state_machine::{DispatchStateMachine, Endpoint, Stage, TransitionResult};

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Fixed parameters of the dashboard
pub mod defaults {
    use crate::Coordinate;

    /// Map center (Kaduna)
    pub const MAP_CENTER: Coordinate = Coordinate::new(7.44, 10.52);

    /// Initial map zoom level
    pub const MAP_ZOOM: u8 = 10;

    /// Key under which pending fire reports wait for the dashboard
    pub const INBOX_KEY: &str = "pendingFireReports";

    /// First entry of every status log
    pub const LOG_BANNER: &str = "System Initialized. Ready for operations.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(a > 0);
        assert!(b >= a);
    }
}
