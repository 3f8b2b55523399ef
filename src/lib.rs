//! Fire-response drone dispatch dashboard
//!
//! This crate provides:
//! - The dispatch sequencer task and its handle
//! - Dashboard state: incidents, drone roster, status log, map views
//! - Fire report intake and the pending-report inbox
//! - Configuration and the error taxonomy

pub mod config;
pub mod dashboard;
pub mod error;
pub mod intake;
pub mod sequencer;

pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
