//! Immutable-after-load directed road network (C1), stored Compressed
//! Sparse Row (CSR) style: edges are sorted by source node so a node's
//! out-edges are one contiguous slice, looked up via a row-pointer array.
//!
//! Nodes are addressed externally by a stable string id; `RoadNetwork`
//! assigns each a dense `NodeId` at load time and keeps the string back for
//! round-tripping through the external interface (§6).

use std::collections::HashMap;

use traffic_core::{EdgeId, EdgeKey, NodeId, Point, VehicleKind};

use crate::error::{GraphError, GraphResult};
use crate::mode_set::ModeSet;

/// A loaded, immutable road network.
#[derive(Debug)]
pub struct RoadNetwork {
    node_names: Vec<String>,
    name_to_id: HashMap<String, NodeId>,
    node_pos: Vec<Point>,
    /// `node_out_start[n]..node_out_start[n+1]` is the range of `EdgeId`s
    /// leaving node `n`. Has `node_count() + 1` entries.
    node_out_start: Vec<u32>,
    edge_from: Vec<NodeId>,
    edge_to: Vec<NodeId>,
    edge_distance: Vec<f32>,
    edge_modes: Vec<ModeSet>,
}

impl RoadNetwork {
    pub fn empty() -> Self {
        Self {
            node_names: Vec::new(),
            name_to_id: HashMap::new(),
            node_pos: Vec::new(),
            node_out_start: vec![0],
            edge_from: Vec::new(),
            edge_to: Vec::new(),
            edge_distance: Vec::new(),
            edge_modes: Vec::new(),
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_from.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.node_names.get(id.index()).map(String::as_str)
    }

    pub fn node_pos(&self, id: NodeId) -> Option<Point> {
        self.node_pos.get(id.index()).copied()
    }

    /// All node ids in ascending order, useful for hotspot ranking (§4.5).
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.node_count() as u32).map(NodeId)
    }

    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    #[inline]
    pub fn edge_from(&self, edge: EdgeId) -> NodeId {
        self.edge_from[edge.index()]
    }

    #[inline]
    pub fn edge_to(&self, edge: EdgeId) -> NodeId {
        self.edge_to[edge.index()]
    }

    #[inline]
    pub fn edge_distance(&self, edge: EdgeId) -> f32 {
        self.edge_distance[edge.index()]
    }

    #[inline]
    pub fn edge_allowed(&self, edge: EdgeId, kind: VehicleKind) -> bool {
        self.edge_modes[edge.index()].contains(kind)
    }

    pub fn edge_key(&self, edge: EdgeId) -> EdgeKey {
        EdgeKey::new(self.edge_from(edge), self.edge_to(edge))
    }

    /// Look up the `EdgeId` for a specific `(from, to)` pair, if present.
    /// Linear in the source node's out-degree — road networks have small
    /// out-degrees (a handful of lanes per intersection), so this is cheap
    /// in practice and avoids a second hash map kept in lockstep with CSR.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from).find(|&e| self.edge_to(e) == to)
    }

    /// Iterate every directed edge in the network, in CSR order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edge_count() as u32).map(EdgeId)
    }
}

/// Fluent builder for `RoadNetwork`. Collects nodes and directed edges,
/// then sorts edges by source node to produce the CSR layout.
#[derive(Default)]
pub struct RoadNetworkBuilder {
    node_names: Vec<String>,
    name_to_id: HashMap<String, NodeId>,
    node_pos: Vec<Point>,
    edges: Vec<(NodeId, NodeId, f32, ModeSet)>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node if not already present; returns its `NodeId` either way.
    pub fn add_node(&mut self, name: &str, pos: Point) -> NodeId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = NodeId(self.node_names.len() as u32);
        self.node_names.push(name.to_string());
        self.node_pos.push(pos);
        self.name_to_id.insert(name.to_string(), id);
        id
    }

    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, distance: f32, modes: ModeSet) {
        self.edges.push((from, to, distance, modes));
    }

    /// Add a road; inserts the reverse edge too unless `one_way`.
    pub fn add_road(&mut self, from: NodeId, to: NodeId, distance: f32, modes: ModeSet, one_way: bool) {
        self.add_directed_edge(from, to, distance, modes);
        if !one_way {
            self.add_directed_edge(to, from, distance, modes);
        }
    }

    pub fn node_pos(&self, id: NodeId) -> Option<Point> {
        self.node_pos.get(id.index()).copied()
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn build(mut self) -> GraphResult<RoadNetwork> {
        if self.node_names.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        // Stable sort by source node keeps the relative insertion order of
        // edges sharing a source — useful for deterministic iteration.
        self.edges.sort_by_key(|(from, _, _, _)| *from);

        let node_count = self.node_names.len();
        let mut node_out_start = vec![0u32; node_count + 1];
        for &(from, _, _, _) in &self.edges {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 0..node_count {
            node_out_start[i + 1] += node_out_start[i];
        }

        let mut edge_from = Vec::with_capacity(self.edges.len());
        let mut edge_to = Vec::with_capacity(self.edges.len());
        let mut edge_distance = Vec::with_capacity(self.edges.len());
        let mut edge_modes = Vec::with_capacity(self.edges.len());
        for (from, to, distance, modes) in self.edges {
            edge_from.push(from);
            edge_to.push(to);
            edge_distance.push(distance);
            edge_modes.push(modes);
        }

        Ok(RoadNetwork {
            node_names: self.node_names,
            name_to_id: self.name_to_id,
            node_pos: self.node_pos,
            node_out_start,
            edge_from,
            edge_to,
            edge_distance,
            edge_modes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_abcd() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node("A", Point::new(0.0, 0.0));
        let n = b.add_node("B", Point::new(1.0, 0.0));
        let c = b.add_node("C", Point::new(2.0, 0.0));
        let d = b.add_node("D", Point::new(3.0, 0.0));
        b.add_road(a, n, 100.0, ModeSet::ALL, false);
        b.add_road(n, c, 100.0, ModeSet::ALL, false);
        b.add_road(c, d, 100.0, ModeSet::ALL, false);
        b.build().unwrap()
    }

    #[test]
    fn non_one_way_inserts_both_directions() {
        let net = linear_abcd();
        assert_eq!(net.edge_count(), 6);
        let a = net.node_id("A").unwrap();
        let b = net.node_id("B").unwrap();
        assert!(net.find_edge(a, b).is_some());
        assert!(net.find_edge(b, a).is_some());
    }

    #[test]
    fn one_way_inserts_single_direction() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node("A", Point::new(0.0, 0.0));
        let x = b.add_node("X", Point::new(1.0, 0.0));
        b.add_road(a, x, 50.0, ModeSet::ALL, true);
        let net = b.build().unwrap();
        assert_eq!(net.edge_count(), 1);
        assert!(net.find_edge(a, x).is_some());
        assert!(net.find_edge(x, a).is_none());
    }

    #[test]
    fn out_edges_are_contiguous_and_match_out_degree() {
        let net = linear_abcd();
        let b = net.node_id("B").unwrap();
        let edges: Vec<_> = net.out_edges(b).collect();
        assert_eq!(edges.len(), net.out_degree(b));
        assert_eq!(edges.len(), 2); // B->A and B->C
    }

    #[test]
    fn empty_builder_rejected() {
        let err = RoadNetworkBuilder::new().build().unwrap_err();
        assert!(matches!(err, GraphError::EmptyGraph));
    }
}
