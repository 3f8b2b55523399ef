//! Device geolocation seam

use crate::error::EnvironmentError;
use async_trait::async_trait;
use firedrone_shared::Coordinate;

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Current device position
    async fn current_position(&self) -> Result<Coordinate, EnvironmentError>;
}

/// Host without any positioning support
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

#[async_trait]
impl GeolocationProvider for Unsupported {
    async fn current_position(&self) -> Result<Coordinate, EnvironmentError> {
        Err(EnvironmentError::GeolocationUnsupported)
    }
}

/// Always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinate);

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinate, EnvironmentError> {
        Ok(self.0)
    }
}

/// User refused the permission prompt
#[derive(Debug, Default, Clone, Copy)]
pub struct Denied;

#[async_trait]
impl GeolocationProvider for Denied {
    async fn current_position(&self) -> Result<Coordinate, EnvironmentError> {
        Err(EnvironmentError::GeolocationDenied("permission denied".into()))
    }
}
