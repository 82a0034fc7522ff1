//! Hotspot selection and the per-tick hotspot multiplier penalty (§4.5).

use rustc_hash::FxHashSet;
use traffic_config::CongestionParams;
use traffic_core::{EdgeKey, SimRng};
use traffic_graph::RoadNetwork;
use traffic_pathfinder::TrafficMultipliers;

/// Chance an eligible intersection's outgoing edge becomes a hotspot (§4.5).
const HOTSPOT_EDGE_PROBABILITY: f64 = 0.3;
/// Fraction of nodes, ranked by out-degree, treated as "intersections".
const INTERSECTION_FRACTION: f32 = 0.2;
/// Congestion factor above which hotspot penalties apply this tick.
const CONGESTION_FACTOR_THRESHOLD: f32 = 0.3;
/// Per-tick hotspot multiplier draw range.
const HOTSPOT_MULTIPLIER_RANGE: (f32, f32) = (1.5, 3.0);
/// Ceiling applied after the hotspot multiply (§4.5 "capped at 5.0").
const HOTSPOT_MULTIPLIER_CAP: f32 = 5.0;

/// The fixed set of directed edges selected as hotspots at construction
/// time (§4.5). Selection depends only on graph topology and the
/// construction-time RNG draw, so it is not touched by `reset_simulation`.
pub struct HotspotSet {
    edges: FxHashSet<EdgeKey>,
}

impl HotspotSet {
    /// Rank nodes by out-degree, take the top 20% as "intersections", then
    /// flip a 0.3-weighted coin for each of their outgoing edges (§4.5).
    pub fn select(network: &RoadNetwork, rng: &mut SimRng) -> Self {
        let mut nodes: Vec<_> = network.node_ids().collect();
        nodes.sort_by(|&a, &b| {
            network.out_degree(b).cmp(&network.out_degree(a)).then_with(|| a.cmp(&b))
        });

        let count = ((nodes.len() as f32) * INTERSECTION_FRACTION).ceil() as usize;
        let mut edges = FxHashSet::default();
        for &node in nodes.iter().take(count) {
            for edge in network.out_edges(node) {
                if rng.gen_bool(HOTSPOT_EDGE_PROBABILITY) {
                    edges.insert(network.edge_key(edge));
                }
            }
        }
        Self { edges }
    }

    pub fn contains(&self, edge: EdgeKey) -> bool {
        self.edges.contains(&edge)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter()
    }

    /// Apply the per-tick hotspot penalty when `congestion_factor` exceeds
    /// the threshold (§4.5). This implementation follows this
    /// specification's literal text (flat `Uniform(1.5,3.0)` multiply,
    /// capped at 5.0) rather than the calibration dataset's
    /// congestion-scaled formula — see DESIGN.md for the discrepancy.
    pub fn apply_penalties(&self, multipliers: &mut TrafficMultipliers, congestion_factor: f32, rng: &mut SimRng) {
        if congestion_factor <= CONGESTION_FACTOR_THRESHOLD {
            return;
        }
        let (lo, hi) = HOTSPOT_MULTIPLIER_RANGE;
        for &edge in &self.edges {
            if let Some(m) = multipliers.get_mut(&edge) {
                *m = (*m * rng.gen_range(lo..=hi)).min(HOTSPOT_MULTIPLIER_CAP);
            }
        }
    }
}

/// Sample this tick's global congestion factor (§4.5):
/// `clamp(sampled_base · peak_multiplier · (elapsed_min + 0.5), 0, 1)`.
pub fn sample_global_congestion_factor(
    rng: &mut SimRng,
    congestion: &CongestionParams,
    elapsed_min: f64,
    is_peak_hour: bool,
) -> f32 {
    let sampled_base = rng.sample_clamped_normal(congestion.mean, congestion.std_dev, 0.0, 1.0);
    let peak_multiplier = if is_peak_hour { congestion.peak_multiplier } else { 1.0 };
    (sampled_base * peak_multiplier * (elapsed_min as f32 + 0.5)).clamp(0.0, 1.0)
}
