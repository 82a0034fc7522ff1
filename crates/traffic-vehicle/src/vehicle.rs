//! The `Vehicle` entity (§3) and its kinematics (§4.2).

use traffic_core::{NodeId, VehicleId, VehicleKind};

use crate::status::VehicleStatus;

/// Fixed acceleration shared by every vehicle, regardless of kind
/// (distance-units / s²). Not configurable — the calibration dataset hard-
/// codes it and §4.2 only says "fixed acceleration" without naming a value
/// other implementations should differ from.
pub const ACCELERATION: f32 = 0.3;

/// Micro-quiescence: below this target speed the vehicle is considered
/// "effectively stopped" rather than crawling (§4.2 step 2).
const QUIESCENCE_TARGET_THRESHOLD: f32 = 1.0;
/// ...and is only snapped to exactly zero if also already this close to zero.
const QUIESCENCE_CURRENT_THRESHOLD: f32 = 0.5;
/// Position deltas smaller than this are treated as numerically
/// insignificant and are not applied (§4.2 step 3).
const POSITION_DELTA_EPSILON: f32 = 1e-4;

/// Minimum safe following distance, in the same units as node coordinates.
pub const MIN_SAFE_DISTANCE: f32 = 30.0;
/// Fraction of `desired_speed` a crawling vehicle never drops below.
const MIN_CREEP_SPEED_RATIO: f32 = 0.15;

/// The outcome of one car-following gap check (§4.2's action table).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FollowAction {
    Freeze,
    Creep,
    Resume,
    Hold,
}

/// A single vehicle traversing the road network.
#[derive(Clone, Debug)]
pub struct Vehicle {
    pub id: VehicleId,
    pub kind: VehicleKind,

    pub start_node: NodeId,
    pub goal_node: NodeId,

    pub current_node: NodeId,
    pub next_node: Option<NodeId>,
    pub path: Vec<NodeId>,
    pub path_index: usize,

    pub status: VehicleStatus,

    pub desired_speed: f32,
    pub target_speed: f32,
    pub current_speed: f32,
    pub acceleration: f32,
    pub position_on_edge: f32,

    pub capacity_usage: f32,
    pub spawn_time: f64,
    pub arrival_time: Option<f64>,
    pub wait_time: f64,
    pub reroute_count: u32,
    pub total_distance: f32,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        kind: VehicleKind,
        start_node: NodeId,
        goal_node: NodeId,
        desired_speed: f32,
        spawn_time: f64,
    ) -> Self {
        Self {
            id,
            kind,
            start_node,
            goal_node,
            current_node: start_node,
            next_node: None,
            path: Vec::new(),
            path_index: 0,
            status: VehicleStatus::Waiting,
            desired_speed,
            target_speed: desired_speed,
            current_speed: 0.0,
            acceleration: ACCELERATION,
            position_on_edge: 0.0,
            capacity_usage: kind.capacity_usage(),
            spawn_time,
            arrival_time: None,
            wait_time: 0.0,
            reroute_count: 0,
            total_distance: 0.0,
        }
    }

    /// The mode-prefixed identity string (§3), e.g. `"car_17"`.
    pub fn id_string(&self) -> String {
        format!("{}_{}", self.kind.as_str(), self.id.0)
    }

    /// Assign (or replace) this vehicle's path. Resets traversal state —
    /// `position_on_edge` resets to 0 "exactly when ... `set_path` is
    /// invoked" (§3 invariants).
    pub fn set_path(&mut self, path: Vec<NodeId>) {
        debug_assert!(!path.is_empty());
        self.path_index = 0;
        self.position_on_edge = 0.0;
        self.current_node = path[0];
        self.next_node = path.get(1).copied();
        self.path = path;
        self.status = if self.next_node.is_some() {
            VehicleStatus::Moving
        } else {
            VehicleStatus::Arrived
        };
        if self.status == VehicleStatus::Arrived {
            self.next_node = None;
        }
    }

    /// The directed edge this vehicle currently occupies, if moving.
    pub fn current_edge(&self) -> Option<(NodeId, NodeId)> {
        self.next_node.map(|next| (self.current_node, next))
    }

    /// `true` if this vehicle still participates in the tick loop.
    pub fn is_active(&self) -> bool {
        self.status != VehicleStatus::Arrived
    }

    // ── Kinematics (§4.2) ──────────────────────────────────────────────────

    /// Advance speed and position for one tick on an edge of cached length
    /// `edge_length`. Returns `true` if the vehicle reached the end of the
    /// edge (`position_on_edge` hit 1.0) — the caller is responsible for the
    /// node-transition bookkeeping via [`Vehicle::advance_to_next_node`].
    pub fn update_kinematics(&mut self, delta_time: f32, edge_length: f32) -> bool {
        // 1. Speed relaxation toward target.
        let diff = self.target_speed - self.current_speed;
        let max_step = self.acceleration * delta_time;
        if diff.abs() <= max_step {
            self.current_speed = self.target_speed;
        } else {
            self.current_speed += max_step.copysign(diff);
        }

        // 2. Micro-quiescence.
        if self.target_speed < QUIESCENCE_TARGET_THRESHOLD
            && self.current_speed.abs() < QUIESCENCE_CURRENT_THRESHOLD
        {
            self.current_speed = 0.0;
            return false;
        }

        // 3. Advance.
        let length = edge_length.max(1e-6);
        let delta_pos = (self.current_speed * delta_time) / length;
        if delta_pos.abs() > POSITION_DELTA_EPSILON {
            self.position_on_edge = (self.position_on_edge + delta_pos).clamp(0.0, 1.0);
            self.total_distance += delta_pos.abs() * length;
        }

        self.position_on_edge >= 1.0
    }

    /// Node-transition step (§4.2 step 4): pop the traversed edge, advance
    /// `current_node`, and stamp arrival if the goal was reached.
    pub fn advance_to_next_node(&mut self, now: f64) {
        if let Some(next) = self.next_node {
            self.path_index += 1;
            self.current_node = next;
            self.position_on_edge = 0.0;
            self.next_node = self.path.get(self.path_index + 1).copied();
            if self.next_node.is_none() {
                self.status = VehicleStatus::Arrived;
                self.arrival_time = Some(now);
            }
        }
    }

    // ── Car-following (§4.2) ───────────────────────────────────────────────

    /// Classify the gap to the vehicle ahead into a follow action, and
    /// apply the corresponding `target_speed`/status change.
    pub fn apply_follow_action(&mut self, gap_to_ahead: Option<f32>) {
        let Some(gap) = gap_to_ahead else {
            self.target_speed = self.desired_speed;
            if self.status == VehicleStatus::Stuck {
                self.status = VehicleStatus::Moving;
            }
            return;
        };

        match classify_gap(gap) {
            FollowAction::Freeze => {
                self.target_speed = 0.0;
                self.current_speed = 0.0;
                self.status = VehicleStatus::Stuck;
            }
            FollowAction::Creep => {
                let ratio = gap / (2.0 * MIN_SAFE_DISTANCE);
                let min_creep = self.desired_speed * MIN_CREEP_SPEED_RATIO;
                self.target_speed = (self.desired_speed * ratio).max(min_creep);
            }
            FollowAction::Resume => {
                self.target_speed = self.desired_speed;
                if self.status == VehicleStatus::Stuck {
                    self.status = VehicleStatus::Moving;
                }
            }
            FollowAction::Hold => {
                // Hysteresis band: keep the current target untouched.
            }
        }
    }
}

/// Classify a pixel gap to the vehicle ahead per §4.2's action table.
pub fn classify_gap(gap: f32) -> FollowAction {
    if gap < MIN_SAFE_DISTANCE {
        FollowAction::Freeze
    } else if gap < 1.5 * MIN_SAFE_DISTANCE {
        FollowAction::Creep
    } else if gap >= 2.5 * MIN_SAFE_DISTANCE {
        FollowAction::Resume
    } else {
        FollowAction::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(desired: f32) -> Vehicle {
        let mut v = Vehicle::new(VehicleId(1), VehicleKind::Car, NodeId(0), NodeId(3), desired, 0.0);
        v.set_path(vec![NodeId(0), NodeId(1)]);
        v
    }

    #[test]
    fn freeze_on_gap_below_min_distance() {
        let mut v = vehicle(100.0);
        v.current_speed = 50.0;
        v.apply_follow_action(Some(25.0));
        assert_eq!(v.status, VehicleStatus::Stuck);
        assert_eq!(v.target_speed, 0.0);
        assert_eq!(v.current_speed, 0.0);
    }

    #[test]
    fn resume_past_resume_hysteresis() {
        let mut v = vehicle(100.0);
        v.status = VehicleStatus::Stuck;
        v.apply_follow_action(Some(90.0)); // 2.5 * 30 + extra margin
        assert_eq!(v.status, VehicleStatus::Moving);
        assert_eq!(v.target_speed, 100.0);
    }

    #[test]
    fn hold_in_hysteresis_band_keeps_target() {
        let mut v = vehicle(100.0);
        v.target_speed = 42.0;
        v.apply_follow_action(Some(60.0)); // between 1.5*30=45 and 2.5*30=75
        assert_eq!(v.target_speed, 42.0);
    }

    #[test]
    fn micro_quiescence_prevents_jitter_near_zero() {
        let mut v = vehicle(0.5);
        v.target_speed = 0.5;
        v.current_speed = 0.1;
        let arrived = v.update_kinematics(0.1, 1000.0);
        assert!(!arrived);
        assert_eq!(v.current_speed, 0.0);
        assert_eq!(v.position_on_edge, 0.0);
    }

    #[test]
    fn position_advances_and_signals_arrival_at_edge_end() {
        let mut v = vehicle(1000.0);
        v.current_speed = 1000.0;
        v.target_speed = 1000.0;
        let arrived = v.update_kinematics(1.0, 1000.0);
        assert!(arrived);
        assert_eq!(v.position_on_edge, 1.0);
    }

    #[test]
    fn advance_to_next_node_stamps_arrival_at_path_end() {
        let mut v = Vehicle::new(VehicleId(2), VehicleKind::Car, NodeId(0), NodeId(1), 10.0, 0.0);
        v.set_path(vec![NodeId(0), NodeId(1)]);
        v.position_on_edge = 1.0;
        v.advance_to_next_node(5.0);
        assert_eq!(v.status, VehicleStatus::Arrived);
        assert_eq!(v.arrival_time, Some(5.0));
        assert!(v.next_node.is_none());
    }
}
