//! `TrafficConfigBundle` — the full statistical parameter set (C2), loaded
//! from the JSON bundle described in §6, or the hard-coded calibration
//! defaults when no file is given or loading fails (§7).

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigLoadError;
use crate::params::{
    AccidentParams, BlockageParams, CongestionParams, SpawnRateParams, SpeedKmh, VehicleDistribution,
};

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct TrafficConfigBundle {
    pub speed_kmh: SpeedKmh,
    pub congestion: CongestionParams,
    pub accidents: AccidentParams,
    pub blockages: BlockageParams,
    pub spawn_rate: SpawnRateParams,
    pub vehicle_distribution: VehicleDistribution,
}

impl TrafficConfigBundle {
    /// Parse a config bundle from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a file path; on any failure (missing file, malformed JSON)
    /// this logs nothing itself — callers wanting the §7 "warned, engine
    /// proceeds with hard-coded defaults" behavior should use
    /// [`TrafficConfigBundle::load_or_default`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&text)?)
    }

    /// Load from `path`; on any failure, print a warning to stderr and fall
    /// back to [`TrafficConfigBundle::default`] (§7, "Config load failure").
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::from_json_file(&path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!(
                    "warning: failed to load traffic config from {:?} ({err}), using defaults",
                    path.as_ref()
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_calibration_constants() {
        let cfg = TrafficConfigBundle::default();
        assert_eq!(cfg.speed_kmh.car.mean, 63.5);
        assert_eq!(cfg.congestion.peak_hours, vec![9, 10, 17, 18]);
        assert_eq!(cfg.accidents.rate_per_hour, 5.0);
        assert_eq!(cfg.blockages.rate_per_hour, 3.0);
        assert_eq!(cfg.spawn_rate.vehicles_per_minute_mean, 25.0);
    }

    #[test]
    fn partial_json_fills_remaining_fields_with_defaults() {
        let json = r#"{ "spawn_rate": { "vehicles_per_minute_mean": 40.0 } }"#;
        let cfg = TrafficConfigBundle::from_json_str(json).unwrap();
        assert_eq!(cfg.spawn_rate.vehicles_per_minute_mean, 40.0);
        // untouched field keeps its default
        assert_eq!(cfg.spawn_rate.off_peak_multiplier, 0.4);
        assert_eq!(cfg.accidents.rate_per_hour, 5.0);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = TrafficConfigBundle::load_or_default("/nonexistent/path/traffic_config.json");
        assert_eq!(cfg.speed_kmh.car.mean, 63.5);
    }
}
