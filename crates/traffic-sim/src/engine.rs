//! `MultiVehicleSimulator` — the tick engine (C5). Owns the vehicle
//! population, the multiplier table, accidents, blockages, and the
//! accelerated clock; runs the authoritative tick order of §4.8.

use std::time::Instant;

use traffic_analyzer::TrafficAnalyzer;
use traffic_config::{
    sample_desired_speed, sample_duration_secs, sample_severity, sample_vehicle_kind, TrafficConfigBundle,
};
use traffic_core::{
    AccidentId, AcceleratedClock, EdgeId, EdgeKey, NodeId, SimRng, SimulationTime, TimePeriod, VehicleId,
    VehicleKind, VehicleRng,
};
use traffic_graph::RoadNetwork;
use traffic_pathfinder::{AStarPathfinder, BlockedSet, Pathfinder, TrafficMultipliers};
use traffic_vehicle::{Vehicle, VehicleStatus, VehicleStore};

use crate::accident::{Accident, AccidentRegistry};
use crate::blockage::{Blockage, BlockageRegistry};
use crate::error::{SimError, SimResult};
use crate::hotspot::{sample_global_congestion_factor, HotspotSet};
use crate::state::{CongestionReport, EdgeTrafficSnapshot, PathResult, SimulationState, TickReport, VehicleSnapshot};

/// Per-tick `delta_time` ceiling (§4.2).
pub const MAX_TICK_DELTA: f64 = 0.2;
/// Stuck-vehicle recovery cadence (§4.3).
pub const STUCK_RECOVERY_INTERVAL_SECS: f64 = 10.0;
/// Nominal tick rate the per-tick event-generation probabilities assume (§4.7).
pub const TICK_RATE_HZ: f64 = 20.0;
/// km/h → engine-internal per-second rate. Named so a future unit change has
/// one place to live (§4.2).
pub const KMH_TO_INTERNAL_SPEED: f32 = 1.0;
/// "up-to-three upcoming edges" in the reroute-candidate check (§4.3, §9).
const REROUTE_LOOKAHEAD_EDGES: usize = 3;
/// Congestion probability above which an upcoming edge makes its vehicle a
/// reroute candidate (§4.3).
const REROUTE_CONGESTION_THRESHOLD: f32 = 0.5;
/// Default `block_road` reason when the caller supplies none (§6).
const DEFAULT_BLOCK_REASON: &str = "construction";
/// Reason pool for statistically generated blockages (§3, §4.7) — a
/// different vocabulary from the manual `block_road` default.
const GENERATED_BLOCKAGE_REASONS: [&str; 4] = ["construction", "maintenance", "event", "emergency"];

/// The tick-driven multi-vehicle simulation engine (C5).
pub struct MultiVehicleSimulator {
    network: RoadNetwork,
    config: TrafficConfigBundle,
    analyzer: TrafficAnalyzer,
    multipliers: TrafficMultipliers,
    blocked: BlockedSet,
    vehicles: VehicleStore,
    accidents: AccidentRegistry,
    blockages: BlockageRegistry,
    hotspots: HotspotSet,
    clock: AcceleratedClock,
    rng: SimRng,
    seed: u64,
    step: u64,
    is_running: bool,
    last_spawn_elapsed: f64,
    since_stuck_check: f64,
    wall_clock_origin: Instant,
    last_wall_elapsed: f64,
}

impl MultiVehicleSimulator {
    /// Construct with default calibration parameters (§6 `new(graph, coords)`
    /// — in this implementation a node's coordinates already travel with it
    /// inside `RoadNetwork` (§3 "Node"), so there is no separate `coords`
    /// argument; see DESIGN.md).
    pub fn new(network: RoadNetwork, seed: u64) -> Self {
        Self::with_config(network, TrafficConfigBundle::default(), seed)
    }

    /// Construct with an explicit parameter bundle (e.g. loaded from a
    /// config file via [`TrafficConfigBundle::load_or_default`]).
    pub fn with_config(network: RoadNetwork, config: TrafficConfigBundle, seed: u64) -> Self {
        let analyzer = TrafficAnalyzer::new(&network);
        let mut multipliers = TrafficMultipliers::default();
        for edge in network.edge_ids() {
            multipliers.insert(network.edge_key(edge), 1.0);
        }
        let mut rng = SimRng::new(seed);
        let hotspots = HotspotSet::select(&network, &mut rng);

        Self {
            network,
            config,
            analyzer,
            multipliers,
            blocked: BlockedSet::default(),
            vehicles: VehicleStore::new(),
            accidents: AccidentRegistry::new(),
            blockages: BlockageRegistry::new(),
            hotspots,
            clock: AcceleratedClock::default(),
            rng,
            seed,
            step: 0,
            is_running: true,
            last_spawn_elapsed: 0.0,
            since_stuck_check: 0.0,
            wall_clock_origin: Instant::now(),
            last_wall_elapsed: 0.0,
        }
    }

    /// Load a graph from a JSON file and construct an engine over it (§1,
    /// the graph loader reinstated as an in-scope convenience).
    pub fn from_graph_file(path: impl AsRef<std::path::Path>, seed: u64) -> SimResult<Self> {
        let network = traffic_graph::load_graph_file(path)?;
        Ok(Self::new(network, seed))
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn config(&self) -> &TrafficConfigBundle {
        &self.config
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn multipliers(&self) -> &TrafficMultipliers {
        &self.multipliers
    }

    pub fn blocked(&self) -> &BlockedSet {
        &self.blocked
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.all()
    }

    pub fn get_vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn remove_vehicle(&mut self, id: VehicleId) -> Option<Vehicle> {
        self.vehicles.remove(id)
    }

    pub fn accidents(&self) -> impl Iterator<Item = &Accident> {
        self.accidents.iter()
    }

    pub fn blockages(&self) -> impl Iterator<Item = (&EdgeKey, &Blockage)> {
        self.blockages.iter()
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Discard all vehicles, accidents, and blockages; restore every
    /// multiplier to 1.0; reset the clock to its start hour. Hotspot
    /// selection is unaffected — it is a property of the (unchanged) graph,
    /// not of simulated state (§3 "Simulator lifecycle").
    pub fn reset(&mut self) {
        self.vehicles.reset();
        self.accidents.reset();
        self.blockages.reset();
        self.blocked.clear();
        for edge in self.network.edge_ids() {
            self.multipliers.insert(self.network.edge_key(edge), 1.0);
        }
        self.clock.reset();
        self.step = 0;
        self.is_running = true;
        self.last_spawn_elapsed = 0.0;
        self.since_stuck_check = 0.0;
    }

    /// Clear `is_running` (§5, "used only by the bulk-run helper").
    pub fn stop(&mut self) {
        self.is_running = false;
    }

    // ── Random endpoint helpers ─────────────────────────────────────────────

    fn random_node(&mut self) -> NodeId {
        let n = self.network.node_count() as u32;
        NodeId(self.rng.gen_range(0..n))
    }

    fn random_distinct_pair(&mut self) -> (NodeId, NodeId) {
        if self.network.node_count() < 2 {
            let only = NodeId(0);
            return (only, only);
        }
        let start = self.random_node();
        loop {
            let goal = self.random_node();
            if goal != start {
                return (start, goal);
            }
        }
    }

    fn random_edge_endpoints(&mut self) -> (NodeId, NodeId) {
        let n = self.network.edge_count() as u32;
        let edge = EdgeId(self.rng.gen_range(0..n));
        (self.network.edge_from(edge), self.network.edge_to(edge))
    }

    fn validate_node(&self, n: NodeId) -> SimResult<NodeId> {
        if n.index() < self.network.node_count() { Ok(n) } else { Err(SimError::UnknownNode(n)) }
    }

    // ── Vehicles ────────────────────────────────────────────────────────────

    /// `spawn_vehicle(kind, start?, goal?)` (§6). Random endpoints are drawn
    /// when omitted; the goal is not guaranteed distinct from a caller-chosen
    /// start, matching the literal text which only requires auto-spawn's
    /// *own* random draw to be distinct (§4.7).
    pub fn spawn_vehicle(&mut self, kind: VehicleKind, start: Option<NodeId>, goal: Option<NodeId>) -> SimResult<VehicleId> {
        let start = match start {
            Some(n) => self.validate_node(n)?,
            None => self.random_node(),
        };
        let goal = match goal {
            Some(n) => self.validate_node(n)?,
            None => self.random_node(),
        };
        self.try_spawn(kind, start, goal)
    }

    fn try_spawn(&mut self, kind: VehicleKind, start: NodeId, goal: NodeId) -> SimResult<VehicleId> {
        let route = AStarPathfinder
            .find_path(&self.network, &self.multipliers, &self.blocked, start, goal, kind)
            .ok_or(SimError::NoPath { start, goal })?;

        let id = self.vehicles.next_id();
        let speed_params = match kind {
            VehicleKind::Car => self.config.speed_kmh.car,
            VehicleKind::Bicycle => self.config.speed_kmh.bicycle,
            VehicleKind::Pedestrian => self.config.speed_kmh.pedestrian,
        };
        let mut vrng = VehicleRng::new(self.seed, id);
        let desired_speed = sample_desired_speed(&mut vrng, speed_params) * KMH_TO_INTERNAL_SPEED;

        let now = self.clock.elapsed_real_secs();
        let mut vehicle = Vehicle::new(id, kind, start, goal, desired_speed, now);
        vehicle.set_path(route.path);
        self.vehicles.insert(vehicle);
        Ok(id)
    }

    /// `spawn_random(count, distribution?)` (§6). Unreachable draws are
    /// silently discarded, matching §7's "vehicle discarded" outcome.
    pub fn spawn_random(&mut self, count: u32, distribution: Option<(f32, f32, f32)>) -> Vec<VehicleId> {
        let hour = self.clock.snapshot().hour;
        let weights = distribution.unwrap_or_else(|| self.config.vehicle_distribution.weights_for_hour(hour));
        let mut spawned = Vec::new();
        for _ in 0..count {
            let kind = sample_vehicle_kind(&mut self.rng, weights);
            let (start, goal) = self.random_distinct_pair();
            if let Ok(id) = self.try_spawn(kind, start, goal) {
                spawned.push(id);
            }
        }
        spawned
    }

    /// `path(start, goal, mode)` (§6).
    pub fn path(&self, start: NodeId, goal: NodeId, mode: VehicleKind) -> PathResult {
        match AStarPathfinder.find_path(&self.network, &self.multipliers, &self.blocked, start, goal, mode) {
            Some(route) => PathResult {
                path: Some(route.path.iter().filter_map(|&n| self.network.node_name(n)).map(str::to_string).collect()),
                cost: Some(route.cost),
            },
            None => PathResult::default(),
        }
    }

    // ── Accidents ───────────────────────────────────────────────────────────

    /// `create_accident(from?, to?)` (§6); a random existing edge is chosen
    /// when either endpoint is omitted.
    pub fn create_accident(&mut self, from: Option<NodeId>, to: Option<NodeId>) -> SimResult<AccidentId> {
        let (from, to) = match (from, to) {
            (Some(f), Some(t)) => {
                self.validate_node(f)?;
                self.validate_node(t)?;
                if self.network.find_edge(f, t).is_none() {
                    return Err(SimError::UnknownEdge(f, t));
                }
                (f, t)
            }
            _ => self.random_edge_endpoints(),
        };

        let severity = sample_severity(&mut self.rng, &self.config.accidents);
        let duration_seconds = sample_duration_secs(&mut self.rng, self.config.accidents.duration_minutes);
        let created_at = self.clock.elapsed_real_secs();
        let id = self.accidents.next_id();
        self.accidents.insert(Accident { id, from, to, severity, created_at, duration_seconds });

        let key = EdgeKey::new(from, to);
        if let Some(m) = self.multipliers.get_mut(&key) {
            *m *= severity.multiplier_factor();
        }
        Ok(id)
    }

    /// `resolve_accident(id)` (§6); no-op returning `false` for an unknown id (§7).
    pub fn resolve_accident(&mut self, id: AccidentId) -> bool {
        match self.accidents.remove(id) {
            Some(acc) => {
                let key = EdgeKey::new(acc.from, acc.to);
                if let Some(m) = self.multipliers.get_mut(&key) {
                    *m /= acc.severity.multiplier_factor();
                }
                true
            }
            None => false,
        }
    }

    // ── Blockages ───────────────────────────────────────────────────────────

    /// `block_road(from, to, reason="construction")` (§6); no-op returning
    /// `false` if the edge is already blocked (§7).
    pub fn block_road(&mut self, from: NodeId, to: NodeId, reason: Option<String>) -> bool {
        let key = EdgeKey::new(from, to);
        let created_at = self.clock.elapsed_real_secs();
        let reason = reason.unwrap_or_else(|| DEFAULT_BLOCK_REASON.to_string());
        if !self.blockages.insert_manual(key, reason, created_at) {
            return false;
        }
        self.blocked.insert(key);
        if let Some(m) = self.multipliers.get_mut(&key) {
            *m = 100.0;
        }
        true
    }

    /// `unblock_road(from, to)` (§6); no-op returning `false` if not blocked.
    pub fn unblock_road(&mut self, from: NodeId, to: NodeId) -> bool {
        let key = EdgeKey::new(from, to);
        match self.blockages.remove(key) {
            Some(_) => {
                self.blocked.remove(&key);
                if let Some(m) = self.multipliers.get_mut(&key) {
                    *m = 1.0;
                }
                true
            }
            None => false,
        }
    }

    // ── Tick ────────────────────────────────────────────────────────────────

    /// `simulation_tick()` (§6): computes `delta_time` from real wall-clock
    /// elapsed since the previous call (or since construction, for the
    /// first). Deterministic tests should use
    /// [`Self::simulation_tick_with_delta`] instead.
    pub fn simulation_tick(&mut self) -> TickReport {
        let wall_elapsed = self.wall_clock_origin.elapsed().as_secs_f64();
        let delta = (wall_elapsed - self.last_wall_elapsed).max(0.0);
        self.last_wall_elapsed = wall_elapsed;
        self.simulation_tick_with_delta(delta)
    }

    /// The tick's full logic with an explicit `delta_time`, exactly
    /// implementing the authoritative order of §4.8. This split from
    /// [`Self::simulation_tick`] exists so the tick loop is testable without
    /// depending on real wall-clock timing — a testability seam, not a
    /// behavioral deviation; see DESIGN.md.
    pub fn simulation_tick_with_delta(&mut self, delta_time: f64) -> TickReport {
        let delta_time = delta_time.clamp(0.0, MAX_TICK_DELTA);
        self.step += 1;
        self.clock.advance(delta_time);

        // 2. Global congestion factor + peak-hour flag for this tick.
        let sim_time = self.clock.snapshot();
        let is_peak_hour = sim_time.is_peak_hour(&self.config.congestion.peak_hours);
        let elapsed_min = self.clock.elapsed_real_secs() / 60.0;
        let congestion_factor =
            sample_global_congestion_factor(&mut self.rng, &self.config.congestion, elapsed_min, is_peak_hour);

        let mut report = TickReport { step: self.step, delta_time, ..Default::default() };

        // 3. Auto-spawn.
        let is_rush_period = matches!(sim_time.time_period, TimePeriod::MorningRush | TimePeriod::EveningRush);
        if self.maybe_auto_spawn(sim_time.hour, is_rush_period) {
            report.vehicles_spawned = 1;
        }

        // 4. Maybe generate accident / blockage.
        if self.maybe_generate_accident() {
            report.accidents_created = 1;
        }
        if self.maybe_generate_blockage() {
            report.blockages_created = 1;
        }

        // 5. Expire overdue accidents / blockages.
        report.accidents_resolved = self.expire_accidents();
        report.blockages_resolved = self.expire_blockages();

        // 6. Stuck-vehicle recovery every 10 s of wall-clock.
        self.since_stuck_check += delta_time;
        if self.since_stuck_check >= STUCK_RECOVERY_INTERVAL_SECS {
            self.since_stuck_check = 0.0;
            self.run_stuck_recovery();
            report.stuck_recovery_ran = true;
        }

        // 7. Analyzer: refresh all multipliers from current densities.
        self.analyzer.refresh_multipliers(&self.network, &self.vehicles, &mut self.multipliers, &mut self.rng);

        // 8. Apply hotspot penalties.
        self.hotspots.apply_penalties(&mut self.multipliers, congestion_factor, &mut self.rng);

        // 9. Pass 1 — reroute candidates, then car-following.
        self.pass_one();

        // 10. Pass 2 — kinematics, node transitions, arrivals.
        report.vehicles_arrived = self.pass_two(delta_time);

        // 11. Rebuild edge occupancy from final positions.
        self.vehicles.sweep_arrived();
        self.vehicles.rebuild_edge_occupancy();

        report
    }

    fn maybe_auto_spawn(&mut self, hour: u32, is_rush_period: bool) -> bool {
        let sp = self.config.spawn_rate;
        let mut rate = self.rng.sample_clamped_normal(sp.vehicles_per_minute_mean, sp.vehicles_per_minute_std_dev, 0.0, f32::MAX);
        // §9: the 1 veh/min floor applies before the off-peak multiplier.
        rate = rate.max(1.0);
        if !is_rush_period {
            rate *= sp.off_peak_multiplier;
        }

        let interval_secs = 60.0 / rate as f64;
        let elapsed = self.clock.elapsed_real_secs();
        if elapsed - self.last_spawn_elapsed < interval_secs {
            return false;
        }

        let weights = self.config.vehicle_distribution.weights_for_hour(hour);
        let kind = sample_vehicle_kind(&mut self.rng, weights);
        let (start, goal) = self.random_distinct_pair();
        if self.try_spawn(kind, start, goal).is_ok() {
            self.last_spawn_elapsed = elapsed;
            true
        } else {
            false
        }
    }

    fn maybe_generate_accident(&mut self) -> bool {
        if self.network.edge_count() == 0 {
            return false;
        }
        let p = self.config.accidents.rate_per_hour as f64 / 3600.0 / TICK_RATE_HZ;
        if !self.rng.gen_bool(p) {
            return false;
        }
        let (from, to) = self.random_edge_endpoints();
        let severity = sample_severity(&mut self.rng, &self.config.accidents);
        let duration_seconds = sample_duration_secs(&mut self.rng, self.config.accidents.duration_minutes);
        let created_at = self.clock.elapsed_real_secs();
        let id = self.accidents.next_id();
        self.accidents.insert(Accident { id, from, to, severity, created_at, duration_seconds });

        let key = EdgeKey::new(from, to);
        if let Some(m) = self.multipliers.get_mut(&key) {
            *m *= severity.multiplier_factor();
        }
        true
    }

    fn maybe_generate_blockage(&mut self) -> bool {
        let p = self.config.blockages.rate_per_hour as f64 / 3600.0 / TICK_RATE_HZ;
        if !self.rng.gen_bool(p) {
            return false;
        }
        let candidates: Vec<EdgeKey> = self
            .network
            .edge_ids()
            .map(|e| self.network.edge_key(e))
            .filter(|k| !self.blockages.contains(*k))
            .collect();
        if candidates.is_empty() {
            return false;
        }
        let key = candidates[self.rng.gen_range(0..candidates.len())];
        let reason = GENERATED_BLOCKAGE_REASONS[self.rng.gen_range(0..GENERATED_BLOCKAGE_REASONS.len())];
        let duration_seconds = sample_duration_secs(&mut self.rng, self.config.blockages.duration_minutes);
        let created_at = self.clock.elapsed_real_secs();

        self.blockages.insert_generated(key, reason.to_string(), created_at, duration_seconds);
        self.blocked.insert(key);
        if let Some(m) = self.multipliers.get_mut(&key) {
            *m = 100.0;
        }
        true
    }

    fn expire_accidents(&mut self) -> u32 {
        let now = self.clock.elapsed_real_secs();
        let overdue = self.accidents.overdue(now);
        for acc in &overdue {
            let key = EdgeKey::new(acc.from, acc.to);
            if let Some(m) = self.multipliers.get_mut(&key) {
                *m /= acc.severity.multiplier_factor();
            }
            self.accidents.remove(acc.id);
        }
        overdue.len() as u32
    }

    fn expire_blockages(&mut self) -> u32 {
        let now = self.clock.elapsed_real_secs();
        let overdue = self.blockages.overdue(now);
        for key in &overdue {
            self.blockages.remove(*key);
            self.blocked.remove(key);
            if let Some(m) = self.multipliers.get_mut(key) {
                *m = 1.0;
            }
        }
        overdue.len() as u32
    }

    fn run_stuck_recovery(&mut self) {
        let now = self.clock.elapsed_real_secs();
        let ids: Vec<VehicleId> = self
            .vehicles
            .active_ids()
            .iter()
            .copied()
            .filter(|&id| {
                self.vehicles
                    .get(id)
                    .map(|v| v.status == VehicleStatus::Stuck && v.current_speed == 0.0)
                    .unwrap_or(false)
            })
            .collect();
        for id in ids {
            self.reroute_vehicle(id, now);
        }
    }

    /// §4.3's reroute-candidate predicate: current edge blocked, or any of
    /// up to 3 upcoming edges (starting at the current one, §9 decision
    /// record) is blocked or has congestion probability `> 0.5`.
    fn is_reroute_candidate(&self, path: &[NodeId], path_index: usize) -> bool {
        let end = (path_index + REROUTE_LOOKAHEAD_EDGES).min(path.len().saturating_sub(1));
        for i in path_index..end {
            let key = EdgeKey::new(path[i], path[i + 1]);
            if self.blocked.contains(&key) {
                return true;
            }
            if self.analyzer.congestion_probability(&self.vehicles, key) > REROUTE_CONGESTION_THRESHOLD {
                return true;
            }
        }
        false
    }

    /// Re-invoke C3 from `current_node` to `goal_node`. Replaces the path on
    /// an improving result, freezes the vehicle if none exists (§4.3).
    fn reroute_vehicle(&mut self, id: VehicleId, _now: f64) {
        let Some(v) = self.vehicles.get(id) else { return };
        let start = v.current_node;
        let goal = v.goal_node;
        let kind = v.kind;
        let remaining_tail: Vec<NodeId> = v.path[v.path_index..].to_vec();

        match AStarPathfinder.find_path(&self.network, &self.multipliers, &self.blocked, start, goal, kind) {
            Some(route) if route.path != remaining_tail => {
                if let Some(v) = self.vehicles.get_mut(id) {
                    v.set_path(route.path);
                    v.reroute_count += 1;
                    v.status = VehicleStatus::Moving;
                    v.target_speed = v.desired_speed;
                }
            }
            Some(_) => {}
            None => {
                if let Some(v) = self.vehicles.get_mut(id) {
                    v.target_speed = 0.0;
                    v.current_speed = 0.0;
                    v.status = VehicleStatus::Stuck;
                }
            }
        }
    }

    fn nearest_ahead_gap(&self, id: VehicleId, edge: EdgeKey, position: f32, length: f32) -> Option<f32> {
        let mut best: Option<f32> = None;
        for &other_id in self.vehicles.vehicles_on_edge(edge) {
            if other_id == id {
                continue;
            }
            let Some(other) = self.vehicles.get(other_id) else { continue };
            if other.position_on_edge > position {
                let gap = (other.position_on_edge - position) * length;
                best = Some(best.map_or(gap, |b| b.min(gap)));
            }
        }
        best
    }

    fn pass_one(&mut self) {
        let ids: Vec<VehicleId> = self.vehicles.active_ids().to_vec();
        let now = self.clock.elapsed_real_secs();

        for id in ids {
            let Some(v) = self.vehicles.get(id) else { continue };
            let Some(next) = v.next_node else { continue };
            let current_node = v.current_node;
            let path_index = v.path_index;
            let position = v.position_on_edge;
            let path = v.path.clone();

            if self.is_reroute_candidate(&path, path_index) {
                self.reroute_vehicle(id, now);
                continue;
            }

            let key = EdgeKey::new(current_node, next);
            let length = self.network.find_edge(current_node, next).map(|e| self.network.edge_distance(e)).unwrap_or(1.0);
            let gap = self.nearest_ahead_gap(id, key, position, length);
            if let Some(v) = self.vehicles.get_mut(id) {
                v.apply_follow_action(gap);
            }
        }
    }

    fn pass_two(&mut self, delta_time: f64) -> u32 {
        let ids: Vec<VehicleId> = self.vehicles.active_ids().to_vec();
        let now = self.clock.elapsed_real_secs();
        let mut arrived = 0u32;

        for id in ids {
            let Some(v) = self.vehicles.get(id) else { continue };
            if v.status == VehicleStatus::Stuck {
                continue;
            }
            let Some(next) = v.next_node else { continue };
            let current_node = v.current_node;
            let key = EdgeKey::new(current_node, next);
            if self.blocked.contains(&key) {
                continue;
            }
            let length = self.network.find_edge(current_node, next).map(|e| self.network.edge_distance(e)).unwrap_or(1.0);

            if let Some(v) = self.vehicles.get_mut(id) {
                let reached = v.update_kinematics(delta_time as f32, length);
                if reached {
                    v.advance_to_next_node(now);
                    if v.status == VehicleStatus::Arrived {
                        arrived += 1;
                    }
                }
            }
        }
        arrived
    }

    // ── Snapshots & diagnostics ─────────────────────────────────────────────

    pub fn simulation_time(&self) -> SimulationTime {
        self.clock.snapshot()
    }

    /// `simulation_state()` (§6).
    pub fn simulation_state(&self) -> SimulationState {
        let vehicles: Vec<VehicleSnapshot> = self
            .vehicles
            .all()
            .map(|v| VehicleSnapshot {
                id: v.id,
                id_string: v.id_string(),
                kind: v.kind,
                status: v.status,
                current_node: self.network.node_name(v.current_node).unwrap_or("?").to_string(),
                next_node: v.next_node.and_then(|n| self.network.node_name(n)).map(str::to_string),
                path_index: v.path_index,
                position_on_edge: v.position_on_edge,
                current_speed: v.current_speed,
                desired_speed: v.desired_speed,
                wait_time: v.wait_time,
                reroute_count: v.reroute_count,
                total_distance: v.total_distance,
                spawn_time: v.spawn_time,
                arrival_time: v.arrival_time,
            })
            .collect();

        let edge_traffic: Vec<EdgeTrafficSnapshot> = self
            .analyzer
            .edge_traffic_data(&self.network, &self.vehicles)
            .into_iter()
            .map(|mut data| {
                let from = self.network.node_name(data.edge.from).unwrap_or("?").to_string();
                let to = self.network.node_name(data.edge.to).unwrap_or("?").to_string();
                data.multiplier = self.multipliers.get(&data.edge).copied().unwrap_or(1.0);
                EdgeTrafficSnapshot { from, to, data }
            })
            .collect();

        let multipliers = self.multipliers.iter().map(|(k, &v)| (k.to_string(), v)).collect();

        SimulationState {
            step: self.step,
            is_running: self.is_running,
            vehicles,
            vehicle_stats: self.vehicles.statistics(),
            traffic_stats: self.analyzer.global_statistics(&self.network, &self.vehicles),
            edge_traffic,
            multipliers,
            total_spawned: self.vehicles.total_spawned(),
        }
    }

    /// `congestion_report()` (§6).
    pub fn congestion_report(&self) -> CongestionReport {
        let global_statistics = self.analyzer.global_statistics(&self.network, &self.vehicles);
        let bottlenecks = self
            .analyzer
            .find_bottlenecks(&self.network, &self.vehicles, traffic_analyzer::CONGESTION_REPORT_BOTTLENECK_THRESHOLD)
            .into_iter()
            .map(|(k, d)| (k.to_string(), d))
            .collect();
        CongestionReport { global_statistics, bottlenecks }
    }
}
