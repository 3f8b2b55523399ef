//! Dashboard configuration

use anyhow::{anyhow, Context, Result};
use firedrone_shared::{defaults, Coordinate};
use std::path::PathBuf;

/// Configuration for the dashboard process
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Multiplier applied to every stage dwell (1.0 = real time)
    pub time_scale: f64,
    /// Directory backing the report inbox; in-memory when unset
    pub inbox_dir: Option<PathBuf>,
    /// Store key holding pending reports
    pub inbox_key: String,
    /// Initial map center
    pub map_center: Coordinate,
    /// Initial map zoom
    pub map_zoom: u8,
    /// Device position offered to the report form; geolocation is
    /// unsupported when unset
    pub device_position: Option<Coordinate>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            inbox_dir: None,
            inbox_key: defaults::INBOX_KEY.into(),
            map_center: defaults::MAP_CENTER,
            map_zoom: defaults::MAP_ZOOM,
            device_position: None,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by `FIREDRONE_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("FIREDRONE_TIME_SCALE") {
            config.time_scale = parse_time_scale(&raw)
                .with_context(|| format!("invalid FIREDRONE_TIME_SCALE: {raw:?}"))?;
        }
        if let Ok(dir) = std::env::var("FIREDRONE_INBOX_DIR") {
            config.inbox_dir = Some(PathBuf::from(dir));
        }
        if let Ok(raw) = std::env::var("FIREDRONE_DEVICE_POSITION") {
            config.device_position = Some(
                parse_position(&raw)
                    .with_context(|| format!("invalid FIREDRONE_DEVICE_POSITION: {raw:?}"))?,
            );
        }

        Ok(config)
    }
}

/// Parse a positive, finite dwell multiplier
pub fn parse_time_scale(raw: &str) -> Result<f64> {
    let scale: f64 = raw.trim().parse()?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(anyhow!("time scale must be a positive number"));
    }
    Ok(scale)
}

/// Parse `"lat,lon"`
pub fn parse_position(raw: &str) -> Result<Coordinate> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("expected \"lat,lon\""))?;
    let lat: f64 = lat.trim().parse()?;
    let lon: f64 = lon.trim().parse()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(anyhow!("coordinate out of range"));
    }
    Ok(Coordinate::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.time_scale, 1.0);
        assert_eq!(config.inbox_key, "pendingFireReports");
        assert!(config.inbox_dir.is_none());
        assert!(config.device_position.is_none());
    }

    #[test]
    fn test_parse_time_scale() {
        assert_eq!(parse_time_scale(" 0.1 ").unwrap(), 0.1);
        assert!(parse_time_scale("0").is_err());
        assert!(parse_time_scale("-2").is_err());
        assert!(parse_time_scale("fast").is_err());
        assert!(parse_time_scale("inf").is_err());
    }

    #[test]
    fn test_parse_position() {
        let c = parse_position("10.52, 7.4439").unwrap();
        assert_eq!(c, Coordinate::new(7.4439, 10.52));
        assert!(parse_position("10.52").is_err());
        assert!(parse_position("100,7").is_err());
    }
}
