//! Sampling helpers built on top of [`traffic_core::rng`], parameterized by
//! the config structs in [`crate::params`].

use traffic_core::{SimRng, VehicleKind, VehicleRng};

use crate::params::{AccidentParams, NormalParams};

/// Accident severity, drawn from `accidents.severity_distribution` (§3).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

impl Severity {
    /// Multiplicative factor applied to an edge's multiplier on creation,
    /// and divided out again on resolution (§3).
    pub fn multiplier_factor(self) -> f32 {
        match self {
            Severity::Minor => 2.0,
            Severity::Moderate => 4.0,
            Severity::Severe => 10.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

/// Sample `Normal(mean, std_dev)`, clamped to `[min, max]` (§4.2 desired
/// speed, §3 accident/blockage durations).
pub fn sample_normal_clamped(rng: &mut VehicleRng, p: NormalParams) -> f32 {
    rng.sample_clamped_normal(p.mean, p.std_dev, p.min, p.max)
}

/// Sample a vehicle's desired speed for `kind` from the config bundle.
pub fn sample_desired_speed(rng: &mut VehicleRng, speed: NormalParams) -> f32 {
    sample_normal_clamped(rng, speed)
}

/// Draw a kind from `(car, bicycle, pedestrian)` weights (§4.7 auto-spawn).
pub fn sample_vehicle_kind(rng: &mut SimRng, weights: (f32, f32, f32)) -> VehicleKind {
    let items = [VehicleKind::Car, VehicleKind::Bicycle, VehicleKind::Pedestrian];
    let w = [weights.0, weights.1, weights.2];
    *rng.choose_weighted(&items, &w)
}

/// Draw accident severity from `accidents.severity_distribution` (§4.7).
pub fn sample_severity(rng: &mut SimRng, params: &AccidentParams) -> Severity {
    let items = [Severity::Minor, Severity::Moderate, Severity::Severe];
    let w = [
        params.severity_distribution.minor,
        params.severity_distribution.moderate,
        params.severity_distribution.severe,
    ];
    *rng.choose_weighted(&items, &w)
}

/// Sample a duration in seconds from a `NormalParams` expressed in minutes.
pub fn sample_duration_secs(rng: &mut SimRng, p: NormalParams) -> f64 {
    let minutes = rng.sample_clamped_normal(p.mean, p.std_dev, p.min, p.max);
    minutes as f64 * 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use traffic_core::VehicleId;

    #[test]
    fn severity_factors_match_calibration_constants() {
        assert_eq!(Severity::Minor.multiplier_factor(), 2.0);
        assert_eq!(Severity::Moderate.multiplier_factor(), 4.0);
        assert_eq!(Severity::Severe.multiplier_factor(), 10.0);
    }

    #[test]
    fn desired_speed_respects_bounds() {
        let mut rng = VehicleRng::new(1, VehicleId(0));
        let p = NormalParams { mean: 63.5, std_dev: 17.02, min: 0.0, max: 100.0 };
        for _ in 0..500 {
            let s = sample_desired_speed(&mut rng, p);
            assert!((0.0..=100.0).contains(&s));
        }
    }

    #[test]
    fn vehicle_kind_weights_zero_for_excluded_kind() {
        let mut rng = SimRng::new(7);
        for _ in 0..200 {
            let kind = sample_vehicle_kind(&mut rng, (1.0, 0.0, 0.0));
            assert_eq!(kind, VehicleKind::Car);
        }
    }
}
