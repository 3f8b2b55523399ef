//! Fire report intake
//!
//! This module handles:
//! - Validating report drafts and building incident records
//! - Optional device geolocation for the report location
//! - Handing reports to the dashboard through a one-shot inbox

mod geolocation;
mod inbox;
mod report;
mod store;

pub use geolocation::{Denied, FixedPosition, GeolocationProvider, Unsupported};
pub use inbox::ReportInbox;
pub use report::{ReportDraft, ReportIntake};
pub use store::{FileStore, KeyValueStore, MemoryStore};
