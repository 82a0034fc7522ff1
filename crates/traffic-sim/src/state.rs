//! External-facing snapshot types (§6).

use rustc_hash::FxHashMap;
use traffic_analyzer::{EdgeTrafficData, GlobalStatistics};
use traffic_core::{SimulationTime, VehicleId, VehicleKind};
use traffic_vehicle::{VehicleStatistics, VehicleStatus};

/// What changed during one `simulation_tick` call (§4.8).
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub step: u64,
    pub delta_time: f64,
    pub vehicles_spawned: u32,
    pub accidents_created: u32,
    pub accidents_resolved: u32,
    pub blockages_created: u32,
    pub blockages_resolved: u32,
    pub vehicles_arrived: u32,
    pub stuck_recovery_ran: bool,
}

/// One vehicle's externally visible state (`simulation_state().vehicles[]`, §6).
#[derive(Clone, Debug)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub id_string: String,
    pub kind: VehicleKind,
    pub status: VehicleStatus,
    pub current_node: String,
    pub next_node: Option<String>,
    pub path_index: usize,
    pub position_on_edge: f32,
    pub current_speed: f32,
    pub desired_speed: f32,
    pub wait_time: f64,
    pub reroute_count: u32,
    pub total_distance: f32,
    pub spawn_time: f64,
    pub arrival_time: Option<f64>,
}

/// One directed edge's diagnostic row (`simulation_state().edge_traffic[]`, §6).
#[derive(Clone, Debug)]
pub struct EdgeTrafficSnapshot {
    pub from: String,
    pub to: String,
    pub data: EdgeTrafficData,
}

/// `simulation_state()` result (§6).
#[derive(Clone, Debug)]
pub struct SimulationState {
    pub step: u64,
    pub is_running: bool,
    pub vehicles: Vec<VehicleSnapshot>,
    pub vehicle_stats: VehicleStatistics,
    pub traffic_stats: GlobalStatistics,
    pub edge_traffic: Vec<EdgeTrafficSnapshot>,
    /// `"u,v" → multiplier`, the wire form of [`traffic_pathfinder::TrafficMultipliers`] (§6).
    pub multipliers: FxHashMap<String, f32>,
    pub total_spawned: u64,
}

/// `path(start, goal, mode)` result (§6): `(None, None)` for unreachable.
#[derive(Clone, Debug, Default)]
pub struct PathResult {
    pub path: Option<Vec<String>>,
    pub cost: Option<f32>,
}

/// `congestion_report()` result (§6): bundles [`GlobalStatistics`] with the
/// analyzer's bottleneck list at [`traffic_analyzer::CONGESTION_REPORT_BOTTLENECK_THRESHOLD`].
#[derive(Clone, Debug)]
pub struct CongestionReport {
    pub global_statistics: GlobalStatistics,
    pub bottlenecks: Vec<(String, f32)>,
}

/// `simulation_time()` result alias (§6) — the clock's own snapshot type is
/// returned as-is; no wrapper needed.
pub type SimulationTimeView = SimulationTime;
