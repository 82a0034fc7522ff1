//! `traffic-pathfinder` — weighted shortest-path search over the road
//! network (C3), §4.1.
//!
//! A* with an admissible Euclidean-distance heuristic, a mode-aware edge
//! filter, and explicit blocked-edge exclusion. Stateless: every call takes
//! the multiplier table and blocked set as arguments rather than owning them
//! (§3 "Ownership" — C3 is invoked with explicit references).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};
use traffic_core::{EdgeKey, NodeId, VehicleKind};
use traffic_graph::RoadNetwork;

/// Multiplier table keyed by directed edge; missing entries default to 1.0
/// (§4.1 "default 1.0 if missing").
pub type TrafficMultipliers = FxHashMap<EdgeKey, f32>;

/// Set of edges the pathfinder must treat as absent (§3, "Blocked set").
pub type BlockedSet = FxHashSet<EdgeKey>;

/// A successful path search result.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Node ids from `start` to `goal`, inclusive of both endpoints.
    pub path: Vec<NodeId>,
    /// Total routing cost (`Σ distance · multiplier` along the path).
    pub cost: f32,
}

impl Route {
    /// `true` if the route is a single node (start == goal).
    pub fn is_trivial(&self) -> bool {
        self.path.len() <= 1
    }
}

/// Weighted shortest-path search (C3).
pub trait Pathfinder {
    /// Find the cheapest usable path from `start` to `goal` for `mode`.
    ///
    /// Returns `None` if the goal is unreachable given the current
    /// multipliers, blocked set, and mode filter (§4.1, "(∅, +∞)").
    fn find_path(
        &self,
        network: &RoadNetwork,
        multipliers: &TrafficMultipliers,
        blocked: &BlockedSet,
        start: NodeId,
        goal: NodeId,
        mode: VehicleKind,
    ) -> Option<Route>;
}

/// A* over the CSR road graph with a Euclidean-distance heuristic.
///
/// The heuristic is admissible only when all multipliers on the optimal
/// path are `≥ 1`; sub-unit multipliers make the result a useful
/// approximation rather than a certified optimum — intentional (§4.1), since
/// the simulation needs responsiveness, not provable optimality.
pub struct AStarPathfinder;

impl Pathfinder for AStarPathfinder {
    fn find_path(
        &self,
        network: &RoadNetwork,
        multipliers: &TrafficMultipliers,
        blocked: &BlockedSet,
        start: NodeId,
        goal: NodeId,
        mode: VehicleKind,
    ) -> Option<Route> {
        if start == goal {
            return Some(Route { path: vec![start], cost: 0.0 });
        }

        let goal_pos = network.node_pos(goal)?;

        let n = network.node_count();
        let mut g_score = vec![f32::INFINITY; n];
        let mut came_from = vec![NodeId::INVALID; n];
        let mut closed = vec![false; n];

        g_score[start.index()] = 0.0;

        let mut open: BinaryHeap<HeapEntry> = BinaryHeap::new();
        open.push(HeapEntry {
            f: heuristic(network, start, goal_pos),
            g: 0.0,
            node: start,
        });

        while let Some(HeapEntry { g, node, .. }) = open.pop() {
            if closed[node.index()] {
                continue;
            }
            if node == goal {
                return Some(reconstruct(&came_from, goal, g));
            }
            closed[node.index()] = true;

            for edge in network.out_edges(node) {
                let neighbor = network.edge_to(edge);
                if closed[neighbor.index()] {
                    continue;
                }
                if !network.edge_allowed(edge, mode) {
                    continue;
                }
                let key = network.edge_key(edge);
                if blocked.contains(&key) {
                    continue;
                }

                let multiplier = multipliers.get(&key).copied().unwrap_or(1.0);
                let edge_cost = network.edge_distance(edge) * multiplier;
                let tentative_g = g + edge_cost;

                if tentative_g < g_score[neighbor.index()] {
                    g_score[neighbor.index()] = tentative_g;
                    came_from[neighbor.index()] = node;
                    let h = if let Some(pos) = network.node_pos(neighbor) {
                        pos.distance(goal_pos)
                    } else {
                        0.0
                    };
                    open.push(HeapEntry {
                        f: tentative_g + h,
                        g: tentative_g,
                        node: neighbor,
                    });
                }
            }
        }

        None
    }
}

fn heuristic(network: &RoadNetwork, node: NodeId, goal_pos: traffic_core::Point) -> f32 {
    network
        .node_pos(node)
        .map(|p| p.distance(goal_pos))
        .unwrap_or(0.0)
}

fn reconstruct(came_from: &[NodeId], goal: NodeId, cost: f32) -> Route {
    let mut path = vec![goal];
    let mut cur = goal;
    loop {
        let prev = came_from[cur.index()];
        if prev == NodeId::INVALID {
            break;
        }
        path.push(prev);
        cur = prev;
    }
    path.reverse();
    Route { path, cost }
}

/// Min-heap entry ordered by `f = g + h`, ascending. Ties break on `g`
/// descending (prefer the entry closer to the goal already) then on node
/// id, so search order — and therefore which of several equal-cost paths is
/// returned — is deterministic across runs (§4.1, "broken arbitrarily but
/// deterministically").
struct HeapEntry {
    f: f32,
    g: f32,
    node: NodeId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.g == other.g && self.node == other.node
    }
}
impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse the natural order on `f` to pop
        // the smallest `f` first.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| self.g.total_cmp(&other.g))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traffic_core::Point;
    use traffic_graph::{ModeSet, RoadNetworkBuilder};

    fn linear_abcd() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node("A", Point::new(0.0, 0.0));
        let n = b.add_node("B", Point::new(100.0, 0.0));
        let c = b.add_node("C", Point::new(200.0, 0.0));
        let d = b.add_node("D", Point::new(300.0, 0.0));
        b.add_road(a, n, 100.0, ModeSet::ALL, false);
        b.add_road(n, c, 100.0, ModeSet::ALL, false);
        b.add_road(c, d, 100.0, ModeSet::ALL, false);
        b.build().unwrap()
    }

    #[test]
    fn linear_graph_cost_300() {
        let net = linear_abcd();
        let a = net.node_id("A").unwrap();
        let d = net.node_id("D").unwrap();
        let route = AStarPathfinder
            .find_path(&net, &TrafficMultipliers::default(), &BlockedSet::default(), a, d, VehicleKind::Car)
            .unwrap();
        assert_eq!(route.path.len(), 4);
        assert!((route.cost - 300.0).abs() < 1e-3);
    }

    #[test]
    fn blocked_bypass_same_cost() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node("A", Point::new(0.0, 0.0));
        let n = b.add_node("B", Point::new(100.0, 0.0));
        let c = b.add_node("C", Point::new(200.0, 0.0));
        let d = b.add_node("D", Point::new(300.0, 0.0));
        let e = b.add_node("E", Point::new(100.0, 50.0));
        b.add_road(a, n, 100.0, ModeSet::ALL, false);
        b.add_road(n, c, 100.0, ModeSet::ALL, false);
        b.add_road(c, d, 100.0, ModeSet::ALL, false);
        b.add_road(n, e, 50.0, ModeSet::ALL, false);
        b.add_road(e, c, 50.0, ModeSet::ALL, false);
        let net = b.build().unwrap();

        let mut blocked = BlockedSet::default();
        blocked.insert(traffic_core::EdgeKey::new(n, c));
        blocked.insert(traffic_core::EdgeKey::new(c, n));

        let route = AStarPathfinder
            .find_path(&net, &TrafficMultipliers::default(), &blocked, a, d, VehicleKind::Car)
            .unwrap();
        assert!((route.cost - 300.0).abs() < 1e-3);
        assert!(route.path.contains(&e));
    }

    #[test]
    fn mode_filter_excludes_disallowed_edge() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node("A", Point::new(0.0, 0.0));
        let n = b.add_node("B", Point::new(100.0, 0.0));
        let c = b.add_node("C", Point::new(200.0, 0.0));
        let d = b.add_node("D", Point::new(300.0, 0.0));
        b.add_road(a, n, 100.0, ModeSet::ALL, false);
        b.add_road(n, c, 100.0, ModeSet::from_strs(["car"]), false);
        b.add_road(c, d, 100.0, ModeSet::ALL, false);
        let net = b.build().unwrap();

        let route = AStarPathfinder.find_path(
            &net,
            &TrafficMultipliers::default(),
            &BlockedSet::default(),
            a,
            d,
            VehicleKind::Bicycle,
        );
        assert!(route.is_none());
    }

    #[test]
    fn accident_multiplier_inflates_cost() {
        let net = linear_abcd();
        let a = net.node_id("A").unwrap();
        let b_node = net.node_id("B").unwrap();
        let c = net.node_id("C").unwrap();
        let d = net.node_id("D").unwrap();

        let mut multipliers = TrafficMultipliers::default();
        multipliers.insert(traffic_core::EdgeKey::new(b_node, c), 4.0);

        let route = AStarPathfinder
            .find_path(&net, &multipliers, &BlockedSet::default(), a, d, VehicleKind::Car)
            .unwrap();
        assert!((route.cost - 600.0).abs() < 1e-3);
    }
}
