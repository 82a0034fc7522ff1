//! Deterministic per-vehicle and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each vehicle gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (vehicle_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive vehicle IDs uniformly across the seed space.
//! This means:
//!
//! - Vehicles never share RNG state (no contention, no ordering dependency).
//! - Vehicles spawned later in a run do not disturb the seeds already
//!   assigned to earlier ones — runs stay reproducible as the population
//!   grows tick over tick.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::VehicleId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── VehicleRng ────────────────────────────────────────────────────────────────

/// Per-vehicle deterministic RNG, held alongside the vehicle's other state.
pub struct VehicleRng(SmallRng);

impl VehicleRng {
    /// Seed deterministically from the run's global seed and a vehicle ID.
    pub fn new(global_seed: u64, vehicle: VehicleId) -> Self {
        let seed = global_seed ^ (vehicle.0 as u64).wrapping_mul(MIXING_CONSTANT);
        VehicleRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample `Normal(mean, std_dev)`, clamped to `[min, max]`.
    pub fn sample_clamped_normal(&mut self, mean: f32, std_dev: f32, min: f32, max: f32) -> f32 {
        sample_clamped_normal(&mut self.0, mean, std_dev, min, max)
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a non-empty slice.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global operations: hotspot selection, auto-spawn
/// decisions, accident/blockage generation, analyzer multiplier sampling.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample `Normal(mean, std_dev)`, clamped to `[min, max]`.
    pub fn sample_clamped_normal(&mut self, mean: f32, std_dev: f32, min: f32, max: f32) -> f32 {
        sample_clamped_normal(&mut self.0, mean, std_dev, min, max)
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Draw one of `items` weighted by `weights` (same length); falls back
    /// to uniform choice if the weights sum to ~0.
    pub fn choose_weighted<'a, T>(&mut self, items: &'a [T], weights: &[f32]) -> &'a T {
        let total: f32 = weights.iter().sum();
        if total <= 1e-9 {
            let idx = self.0.gen_range(0..items.len());
            return &items[idx];
        }
        let mut draw = self.0.gen_range(0.0..total);
        for (item, &w) in items.iter().zip(weights) {
            if draw < w {
                return item;
            }
            draw -= w;
        }
        items.last().unwrap()
    }
}

fn sample_clamped_normal(rng: &mut SmallRng, mean: f32, std_dev: f32, min: f32, max: f32) -> f32 {
    let dist = Normal::new(mean, std_dev.max(1e-6)).expect("std_dev must be finite");
    dist.sample(rng).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_vehicle_is_reproducible() {
        let mut a = VehicleRng::new(42, VehicleId(7));
        let mut b = VehicleRng::new(42, VehicleId(7));
        let x: f32 = a.sample_clamped_normal(10.0, 2.0, 0.0, 20.0);
        let y: f32 = b.sample_clamped_normal(10.0, 2.0, 0.0, 20.0);
        assert_eq!(x, y);
    }

    #[test]
    fn different_vehicles_diverge() {
        let mut a = VehicleRng::new(42, VehicleId(1));
        let mut b = VehicleRng::new(42, VehicleId(2));
        let x: f32 = a.sample_clamped_normal(10.0, 2.0, 0.0, 20.0);
        let y: f32 = b.sample_clamped_normal(10.0, 2.0, 0.0, 20.0);
        assert_ne!(x, y);
    }

    #[test]
    fn clamped_normal_respects_bounds() {
        let mut rng = SimRng::new(1);
        for _ in 0..1000 {
            let v = rng.sample_clamped_normal(0.425, 0.2, 0.0, 1.0);
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
