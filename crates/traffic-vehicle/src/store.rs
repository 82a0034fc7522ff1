//! `VehicleStore` — the engine's `{id → record}` vehicle owner map (§9,
//! "Arena + index instead of pointer graphs"), plus the edge-occupancy
//! index rebuilt from it each tick.

use rustc_hash::FxHashMap;
use traffic_core::{EdgeKey, VehicleId, VehicleKind};

use crate::status::VehicleStatus;
use crate::vehicle::Vehicle;

/// Mapping EdgeKey → ordered collection of vehicle ids currently
/// traversing that edge (§3).
pub type EdgeOccupancy = FxHashMap<EdgeKey, Vec<VehicleId>>;

#[derive(Default)]
pub struct VehicleStore {
    vehicles: FxHashMap<VehicleId, Vehicle>,
    /// Ids with status != Arrived, kept in ascending order for deterministic
    /// tick iteration (§5, "Ordering guarantees").
    active: Vec<VehicleId>,
    edge_occupancy: EdgeOccupancy,
    /// Single counter shared across all kinds; the kind name is only a
    /// string prefix on the id, not a separate per-kind sequence (§3).
    next_id: u32,
    total_spawned: u64,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next vehicle id without inserting a vehicle yet.
    pub fn next_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, vehicle: Vehicle) {
        self.total_spawned += 1;
        let id = vehicle.id;
        let is_active = vehicle.is_active();
        self.vehicles.insert(id, vehicle);
        if is_active {
            self.active.push(id);
            self.active.sort_unstable();
        }
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(&id)
    }

    pub fn remove(&mut self, id: VehicleId) -> Option<Vehicle> {
        self.active.retain(|&v| v != id);
        for ids in self.edge_occupancy.values_mut() {
            ids.retain(|&v| v != id);
        }
        self.vehicles.remove(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Ids of vehicles still participating in the tick loop, ascending.
    pub fn active_ids(&self) -> &[VehicleId] {
        &self.active
    }

    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    /// Move any vehicle that just reached `Arrived` out of the active set.
    /// Call after the kinematics pass so arrivals stop appearing in the next
    /// tick's vehicle passes.
    pub fn sweep_arrived(&mut self) {
        self.active.retain(|&id| {
            self.vehicles
                .get(&id)
                .map(|v| v.is_active())
                .unwrap_or(false)
        });
    }

    pub fn edge_occupancy(&self) -> &EdgeOccupancy {
        &self.edge_occupancy
    }

    pub fn vehicles_on_edge(&self, edge: EdgeKey) -> &[VehicleId] {
        self.edge_occupancy.get(&edge).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_vehicle_count(&self, edge: EdgeKey) -> usize {
        self.vehicles_on_edge(edge).len()
    }

    /// Sum of `capacity_usage` for vehicles currently on `edge` (§4.4
    /// density input).
    pub fn edge_capacity_usage(&self, edge: EdgeKey) -> f32 {
        self.vehicles_on_edge(edge)
            .iter()
            .filter_map(|&id| self.vehicles.get(&id))
            .map(|v| v.capacity_usage)
            .sum()
    }

    /// Rebuild the edge-occupancy index in full from current vehicle
    /// positions (§4.8 step 11: "Rebuild edge occupancy from final
    /// positions").
    pub fn rebuild_edge_occupancy(&mut self) {
        self.edge_occupancy.clear();
        for &id in &self.active {
            let Some(v) = self.vehicles.get(&id) else { continue };
            if let Some((from, to)) = v.current_edge() {
                self.edge_occupancy
                    .entry(EdgeKey::new(from, to))
                    .or_default()
                    .push(id);
            }
        }
    }

    /// Discard all vehicles, the id counter, and the occupancy index
    /// (`reset_simulation`, §3).
    pub fn reset(&mut self) {
        self.vehicles.clear();
        self.active.clear();
        self.edge_occupancy.clear();
        self.next_id = 0;
        self.total_spawned = 0;
    }

    /// Aggregate counters for the external `vehicle_stats` snapshot (§6).
    pub fn statistics(&self) -> VehicleStatistics {
        let mut stats = VehicleStatistics::default();
        stats.total = self.vehicles.len();
        for v in self.vehicles.values() {
            match v.status {
                VehicleStatus::Arrived => {
                    stats.arrived += 1;
                    if let Some(arrival) = v.arrival_time {
                        stats.total_travel_time += arrival - v.spawn_time;
                    }
                }
                _ => stats.active += 1,
            }
            stats.total_wait_time += v.wait_time;
            stats.total_reroutes += v.reroute_count as u64;
            match v.kind {
                VehicleKind::Car => stats.car_count += 1,
                VehicleKind::Bicycle => stats.bicycle_count += 1,
                VehicleKind::Pedestrian => stats.pedestrian_count += 1,
            }
        }
        stats
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct VehicleStatistics {
    pub total: usize,
    pub active: usize,
    pub arrived: usize,
    pub total_travel_time: f64,
    pub total_wait_time: f64,
    pub total_reroutes: u64,
    pub car_count: usize,
    pub bicycle_count: usize,
    pub pedestrian_count: usize,
}

impl VehicleStatistics {
    pub fn average_travel_time(&self) -> f64 {
        if self.arrived == 0 { 0.0 } else { self.total_travel_time / self.arrived as f64 }
    }

    pub fn average_wait_time(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.total_wait_time / self.total as f64 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traffic_core::NodeId;

    fn moving_vehicle(store: &mut VehicleStore, from: NodeId, to: NodeId) -> VehicleId {
        let id = store.next_id();
        let mut v = Vehicle::new(id, VehicleKind::Car, from, NodeId(99), 50.0, 0.0);
        v.set_path(vec![from, to]);
        store.insert(v);
        id
    }

    #[test]
    fn shared_counter_across_kinds() {
        let mut store = VehicleStore::new();
        let a = store.next_id();
        let b = store.next_id();
        assert_eq!(a.0 + 1, b.0);
    }

    #[test]
    fn rebuild_edge_occupancy_groups_by_current_edge() {
        let mut store = VehicleStore::new();
        let a = moving_vehicle(&mut store, NodeId(0), NodeId(1));
        let b = moving_vehicle(&mut store, NodeId(0), NodeId(1));
        store.rebuild_edge_occupancy();
        let key = EdgeKey::new(NodeId(0), NodeId(1));
        let occupants = store.vehicles_on_edge(key);
        assert_eq!(occupants.len(), 2);
        assert!(occupants.contains(&a));
        assert!(occupants.contains(&b));
    }

    #[test]
    fn capacity_usage_sums_per_kind() {
        let mut store = VehicleStore::new();
        moving_vehicle(&mut store, NodeId(0), NodeId(1));
        store.rebuild_edge_occupancy();
        let key = EdgeKey::new(NodeId(0), NodeId(1));
        assert_eq!(store.edge_capacity_usage(key), 1.0); // one car
    }

    #[test]
    fn reset_clears_everything_including_counter() {
        let mut store = VehicleStore::new();
        moving_vehicle(&mut store, NodeId(0), NodeId(1));
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.next_id().0, 0);
    }
}
