//! JSON codec for the pending-report inbox
//!
//! Pending reports are stored under a single key as:
//! ```text
//! [ { "id": 1718000000000, "location": "...", "coords": [lon, lat],
//!     "status": "Reported", "report": "...", "timestamp": "<RFC 3339>" }, ... ]
//! ```

use thiserror::Error;

use crate::Incident;

/// Maximum payload size (1 MB) to keep a corrupt store from exhausting memory
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Payload too large: {0} bytes (max: {MAX_PAYLOAD_SIZE})")]
    PayloadTooLarge(usize),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a list of reports as a JSON array
pub fn encode(reports: &[Incident]) -> Result<String, CodecError> {
    let payload = serde_json::to_string(reports)?;

    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(CodecError::PayloadTooLarge(payload.len()));
    }

    Ok(payload)
}

/// Decode a JSON array of reports
///
/// An empty or whitespace-only payload decodes to no reports.
pub fn decode(payload: &str) -> Result<Vec<Incident>, CodecError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(CodecError::PayloadTooLarge(payload.len()));
    }

    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_str(payload)?)
}
