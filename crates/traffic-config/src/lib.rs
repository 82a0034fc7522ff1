//! `traffic-config` — the statistical parameter bundle and sampling helpers
//! (C2).
//!
//! | Module      | Contents                                            |
//! |-------------|-------------------------------------------------------|
//! | [`params`]  | Typed structs mirroring the JSON config shape (§6)     |
//! | [`bundle`]  | `TrafficConfigBundle`, JSON (de)serialization (§7)      |
//! | [`sampling`]| `Severity`, Normal/categorical sampling helpers          |
//! | [`error`]   | `ConfigLoadError`, `ConfigLoadResult`                    |

pub mod bundle;
pub mod error;
pub mod params;
pub mod sampling;

pub use bundle::TrafficConfigBundle;
pub use error::{ConfigLoadError, ConfigLoadResult};
pub use params::{
    AccidentParams, BlockageParams, CongestionParams, NormalParams, PeriodMix, SeverityDistribution,
    SpawnRateParams, SpeedKmh, VehicleDistribution,
};
pub use sampling::{
    sample_desired_speed, sample_duration_secs, sample_normal_clamped, sample_severity,
    sample_vehicle_kind, Severity,
};
