//! `traffic-analyzer` — per-edge density accounting and the probabilistic
//! multiplier feedback loop that C3 reads from (C4, §4.4).
//!
//! | Module    | Contents                                    |
//! |-----------|------------------------------------------------|
//! | [`level`] | `CongestionLevel`, density thresholds, ranges    |
//!
//! The analyzer holds a read-only view of the graph (for capacity and
//! topology) and reads vehicle positions through [`traffic_vehicle::VehicleStore`]
//! each tick; it does not own either (§3, "Ownership").

pub mod level;

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use traffic_core::{EdgeKey, NodeId, SimRng};
use traffic_graph::RoadNetwork;
use traffic_pathfinder::TrafficMultipliers;
use traffic_vehicle::VehicleStore;

pub use level::CongestionLevel;

/// `base_capacity` in `capacity(u,v) = base_capacity · (1 + distance/100)`
/// (§3). Matches the calibration dataset's constant of the same name.
pub const BASE_EDGE_CAPACITY: f32 = 3.0;

/// Samples kept per edge before the oldest is evicted (§4.4).
const HISTORY_CAP: usize = 100;

/// Threshold `find_bottlenecks` uses when called directly with no override.
pub const DEFAULT_BOTTLENECK_THRESHOLD: f32 = 0.7;
/// Threshold `global_statistics` uses for its embedded top-5 bottleneck list.
pub const GLOBAL_STATS_BOTTLENECK_THRESHOLD: f32 = 0.6;
/// Threshold the engine's `congestion_report` convenience bundle uses (§6).
pub const CONGESTION_REPORT_BOTTLENECK_THRESHOLD: f32 = 0.5;

/// Mean density / probability / per-level share snapshot (§4.4
/// `global_statistics`).
#[derive(Clone, Debug, Default)]
pub struct GlobalStatistics {
    pub mean_density: f32,
    pub mean_probability: f32,
    /// Percentage (0..=100) of edges at each congestion level.
    pub level_distribution: FxHashMap<CongestionLevel, f32>,
    pub top_bottlenecks: Vec<(EdgeKey, f32)>,
}

/// Per-edge diagnostic row (`get_edge_traffic_data` equivalent, §6
/// `edge_traffic[]`).
#[derive(Clone, Copy, Debug)]
pub struct EdgeTrafficData {
    pub edge: EdgeKey,
    pub density: f32,
    pub level: CongestionLevel,
    pub congestion_probability: f32,
    pub multiplier: f32,
    pub capacity: f32,
    pub occupancy: f32,
}

/// Maintains per-edge capacity and multiplier-sample history, and writes
/// fresh multipliers into the shared [`TrafficMultipliers`] table (C4).
pub struct TrafficAnalyzer {
    capacities: FxHashMap<EdgeKey, f32>,
    history: FxHashMap<EdgeKey, VecDeque<f32>>,
}

impl TrafficAnalyzer {
    /// Compute every edge's capacity once from the loaded graph (§3,
    /// "Computed once").
    pub fn new(network: &RoadNetwork) -> Self {
        let mut capacities = FxHashMap::default();
        for edge in network.edge_ids() {
            let key = network.edge_key(edge);
            let capacity = BASE_EDGE_CAPACITY * (1.0 + network.edge_distance(edge) / 100.0);
            capacities.insert(key, capacity);
        }
        Self { capacities, history: FxHashMap::default() }
    }

    pub fn capacity(&self, edge: EdgeKey) -> f32 {
        self.capacities.get(&edge).copied().unwrap_or(BASE_EDGE_CAPACITY)
    }

    /// `density(u,v) = capacity_usage_sum_on_edge / capacity(u,v)`, floored
    /// at 0 (§4.4).
    pub fn density(&self, vehicles: &VehicleStore, edge: EdgeKey) -> f32 {
        let usage = vehicles.edge_capacity_usage(edge);
        (usage / self.capacity(edge)).max(0.0)
    }

    pub fn level(&self, vehicles: &VehicleStore, edge: EdgeKey) -> CongestionLevel {
        CongestionLevel::from_density(self.density(vehicles, edge))
    }

    /// `p = clamp(density, 0, 1)`, adjusted upward by the edge's historical
    /// average multiplier (§4.4).
    pub fn congestion_probability(&self, vehicles: &VehicleStore, edge: EdgeKey) -> f32 {
        let density = self.density(vehicles, edge);
        let mut p = density.clamp(0.0, 1.0);
        if let Some(hist) = self.history.get(&edge) {
            if !hist.is_empty() {
                let avg: f32 = hist.iter().sum::<f32>() / hist.len() as f32;
                let adjustment = ((avg - 1.0) / 4.0).clamp(0.0, 0.3);
                p = (p + adjustment).clamp(0.0, 1.0);
            }
        }
        p
    }

    /// Refresh every edge's multiplier from current density, appending each
    /// draw to that edge's rolling history (§4.4, §4.8 step 7). Overwrites
    /// whatever an accident or blockage wrote earlier this tick — reproduced
    /// intentionally rather than made additive (§9 decision record).
    pub fn refresh_multipliers(
        &mut self,
        network: &RoadNetwork,
        vehicles: &VehicleStore,
        multipliers: &mut TrafficMultipliers,
        rng: &mut SimRng,
    ) {
        for edge in network.edge_ids() {
            let key = network.edge_key(edge);
            let level = self.level(vehicles, key);
            let (lo, hi) = level.multiplier_range();
            let sample = rng.gen_range(lo..=hi);
            multipliers.insert(key, sample);

            let hist = self.history.entry(key).or_insert_with(|| VecDeque::with_capacity(HISTORY_CAP));
            if hist.len() == HISTORY_CAP {
                hist.pop_front();
            }
            hist.push_back(sample);
        }
    }

    // ── Diagnostics (§4.4 "Diagnostics beyond the per-tick write") ─────────

    /// Edges at or above `threshold` density, sorted descending by density.
    pub fn find_bottlenecks(
        &self,
        network: &RoadNetwork,
        vehicles: &VehicleStore,
        threshold: f32,
    ) -> Vec<(EdgeKey, f32)> {
        let mut out: Vec<(EdgeKey, f32)> = network
            .edge_ids()
            .map(|e| network.edge_key(e))
            .map(|key| (key, self.density(vehicles, key)))
            .filter(|&(_, d)| d >= threshold)
            .collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
        out
    }

    /// Mean density of `node`'s outgoing edges; 0.0 if it has none.
    pub fn node_congestion(&self, network: &RoadNetwork, vehicles: &VehicleStore, node: NodeId) -> f32 {
        let mut total = 0.0f32;
        let mut count = 0u32;
        for edge in network.out_edges(node) {
            total += self.density(vehicles, network.edge_key(edge));
            count += 1;
        }
        if count == 0 { 0.0 } else { total / count as f32 }
    }

    /// Mean density/probability, per-level percentage distribution, and the
    /// top-5 bottlenecks at [`GLOBAL_STATS_BOTTLENECK_THRESHOLD`] (§4.4).
    pub fn global_statistics(&self, network: &RoadNetwork, vehicles: &VehicleStore) -> GlobalStatistics {
        let edges: Vec<EdgeKey> = network.edge_ids().map(|e| network.edge_key(e)).collect();
        if edges.is_empty() {
            return GlobalStatistics::default();
        }

        let mut total_density = 0.0f32;
        let mut total_probability = 0.0f32;
        let mut counts: FxHashMap<CongestionLevel, u32> = FxHashMap::default();
        for &key in &edges {
            let density = self.density(vehicles, key);
            total_density += density;
            total_probability += self.congestion_probability(vehicles, key);
            *counts.entry(CongestionLevel::from_density(density)).or_insert(0) += 1;
        }

        let n = edges.len() as f32;
        let mut level_distribution = FxHashMap::default();
        for (level, count) in counts {
            level_distribution.insert(level, 100.0 * count as f32 / n);
        }

        let mut top_bottlenecks =
            self.find_bottlenecks(network, vehicles, GLOBAL_STATS_BOTTLENECK_THRESHOLD);
        top_bottlenecks.truncate(5);

        GlobalStatistics {
            mean_density: total_density / n,
            mean_probability: total_probability / n,
            level_distribution,
            top_bottlenecks,
        }
    }

    /// Short linear-trend extrapolation of `edge`'s last-10-sample
    /// multiplier history, converted back to a probability (§4.4). Falls
    /// back to the current [`Self::congestion_probability`] when fewer than
    /// 3 samples exist.
    pub fn predict_congestion(
        &self,
        network: &RoadNetwork,
        vehicles: &VehicleStore,
        edge: EdgeKey,
        horizon: f64,
    ) -> f32 {
        let recent: Vec<f32> = self
            .history
            .get(&edge)
            .map(|hist| hist.iter().rev().take(10).rev().copied().collect())
            .unwrap_or_default();

        if recent.len() < 3 {
            return self.congestion_probability(vehicles, edge);
        }

        let trend = (recent[recent.len() - 1] - recent[0]) / recent.len() as f32;
        let current_mult = *recent.last().unwrap();
        let predicted_mult = current_mult + trend * horizon as f32;
        ((predicted_mult - 0.5) / 4.5).clamp(0.0, 1.0)
    }

    /// Per-edge diagnostic rows for the engine's `edge_traffic[]` snapshot (§6).
    pub fn edge_traffic_data(&self, network: &RoadNetwork, vehicles: &VehicleStore) -> Vec<EdgeTrafficData> {
        network
            .edge_ids()
            .map(|e| {
                let key = network.edge_key(e);
                let density = self.density(vehicles, key);
                EdgeTrafficData {
                    edge: key,
                    density,
                    level: CongestionLevel::from_density(density),
                    congestion_probability: self.congestion_probability(vehicles, key),
                    multiplier: 1.0,
                    capacity: self.capacity(key),
                    occupancy: vehicles.edge_capacity_usage(key),
                }
            })
            .collect()
    }
}
