//! Typed parameter structs mirroring the JSON configuration bundle (§6).
//!
//! Every struct derives `Deserialize` with `#[serde(default)]` fields so a
//! partially specified (or entirely absent) config file still produces a
//! complete, valid sampling parameter set — `Default` for each struct is the
//! calibration dataset's hard-coded constant, used verbatim when the JSON
//! omits the field or the file fails to load at all (§7).

use serde::Deserialize;

/// `Normal(mean, std_dev)` clamped to `[min, max]`, used for speeds and
/// event durations.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct NormalParams {
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self { mean: 0.0, std_dev: 1.0, min: f32::MIN, max: f32::MAX }
    }
}

/// `speed_kmh.{car|bicycle|pedestrian}` entries.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SpeedKmh {
    pub car: NormalParams,
    pub bicycle: NormalParams,
    pub pedestrian: NormalParams,
}

impl Default for SpeedKmh {
    fn default() -> Self {
        Self {
            car: NormalParams { mean: 63.5, std_dev: 17.02, min: 0.0, max: 100.0 },
            bicycle: NormalParams { mean: 25.0, std_dev: 8.0, min: 5.0, max: 40.0 },
            pedestrian: NormalParams { mean: 5.0, std_dev: 1.5, min: 2.0, max: 8.0 },
        }
    }
}

/// `congestion.{mean,std_dev,peak_hours,peak_multiplier}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CongestionParams {
    pub mean: f32,
    pub std_dev: f32,
    pub peak_hours: Vec<u32>,
    pub peak_multiplier: f32,
}

impl Default for CongestionParams {
    fn default() -> Self {
        Self {
            mean: 0.425,
            std_dev: 0.2,
            peak_hours: vec![9, 10, 17, 18],
            peak_multiplier: 2.0,
        }
    }
}

/// `{minor,moderate,severe}` draw weights for accident severity.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SeverityDistribution {
    pub minor: f32,
    pub moderate: f32,
    pub severe: f32,
}

impl Default for SeverityDistribution {
    fn default() -> Self {
        Self { minor: 0.70, moderate: 0.25, severe: 0.05 }
    }
}

/// `accidents.{rate_per_hour,severity_distribution,duration_minutes}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AccidentParams {
    pub rate_per_hour: f32,
    pub severity_distribution: SeverityDistribution,
    pub duration_minutes: NormalParams,
}

impl Default for AccidentParams {
    fn default() -> Self {
        Self {
            rate_per_hour: 5.0,
            severity_distribution: SeverityDistribution::default(),
            duration_minutes: NormalParams { mean: 45.0, std_dev: 20.0, min: 10.0, max: 120.0 },
        }
    }
}

/// `blockages.{rate_per_hour,duration_minutes}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BlockageParams {
    pub rate_per_hour: f32,
    pub duration_minutes: NormalParams,
}

impl Default for BlockageParams {
    fn default() -> Self {
        Self {
            rate_per_hour: 3.0,
            duration_minutes: NormalParams { mean: 30.0, std_dev: 15.0, min: 5.0, max: 90.0 },
        }
    }
}

/// `spawn_rate.{vehicles_per_minute_mean,vehicles_per_minute_std_dev,off_peak_multiplier}`.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SpawnRateParams {
    pub vehicles_per_minute_mean: f32,
    pub vehicles_per_minute_std_dev: f32,
    pub off_peak_multiplier: f32,
}

impl Default for SpawnRateParams {
    fn default() -> Self {
        Self {
            vehicles_per_minute_mean: 25.0,
            vehicles_per_minute_std_dev: 5.6,
            off_peak_multiplier: 0.4,
        }
    }
}

/// One entry of the time-period-keyed `vehicle_distribution` format: the
/// simulation hours the entry applies to, plus the three kind weights.
#[derive(Clone, Debug, Deserialize)]
pub struct PeriodMix {
    pub hours: Vec<u32>,
    #[serde(default)]
    pub car: f32,
    #[serde(default)]
    pub bicycle: f32,
    #[serde(default)]
    pub pedestrian: f32,
}

/// `vehicle_distribution` — either a flat mix applied at every hour, or a
/// time-period map keyed by period name whose values carry an `hours` list
/// plus the three weights (§6).
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum VehicleDistribution {
    TimePeriod(std::collections::HashMap<String, PeriodMix>),
    Flat { car: f32, bicycle: f32, pedestrian: f32 },
}

impl Default for VehicleDistribution {
    fn default() -> Self {
        VehicleDistribution::Flat { car: 0.65, bicycle: 0.05, pedestrian: 0.15 }
    }
}

impl VehicleDistribution {
    /// Raw `(car, bicycle, pedestrian)` weights for the given simulation
    /// hour. Weights need not sum to 1 — the caller normalizes (§6, "sums
    /// ≤ 1, remainder implicit"; this implementation renormalizes the three
    /// listed weights rather than attributing the shortfall to a fourth,
    /// unlisted outcome — see DESIGN.md).
    ///
    /// `TimePeriod` entries live in a `HashMap`, so their iteration order is
    /// not itself meaningful; if more than one period's `hours` covers
    /// `hour`, the tie is broken by the period's name (ascending) so the
    /// result stays reproducible across runs of the same config regardless
    /// of hash-map iteration order.
    pub fn weights_for_hour(&self, hour: u32) -> (f32, f32, f32) {
        match self {
            VehicleDistribution::Flat { car, bicycle, pedestrian } => (*car, *bicycle, *pedestrian),
            VehicleDistribution::TimePeriod(map) => {
                let winner = map
                    .iter()
                    .filter(|(_, mix)| mix.hours.contains(&hour))
                    .min_by(|(a, _), (b, _)| a.cmp(b));

                if let Some((_, mix)) = winner {
                    return (mix.car, mix.bicycle, mix.pedestrian);
                }
                // No period covers this hour — fall back to the flat default.
                let VehicleDistribution::Flat { car, bicycle, pedestrian } = VehicleDistribution::default() else {
                    unreachable!()
                };
                (car, bicycle, pedestrian)
            }
        }
    }
}
