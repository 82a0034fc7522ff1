//! JSON graph file loader (§6): `{ nodes:[{id,x,y}], edges:[{from,to,distance,allowed_modes,one_way?}] }`.
//!
//! Reinstated here as an in-scope convenience (SPEC_FULL.md §1) — nothing
//! else in the workspace can materialize a `RoadNetwork`, and an engine that
//! can only be built by hand is not independently testable end to end.

use std::path::Path;

use serde::Deserialize;
use traffic_core::Point;

use crate::error::{GraphError, GraphResult};
use crate::mode_set::ModeSet;
use crate::network::{RoadNetwork, RoadNetworkBuilder};

#[derive(Deserialize)]
struct GraphFile {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

#[derive(Deserialize)]
struct NodeRecord {
    id: String,
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from: String,
    to: String,
    distance: f32,
    allowed_modes: Vec<String>,
    #[serde(default)]
    one_way: bool,
}

/// Parse a graph file's JSON text into a `RoadNetwork`.
pub fn load_graph_str(json: &str) -> GraphResult<RoadNetwork> {
    let file: GraphFile = serde_json::from_str(json)?;
    build_from_file(file)
}

/// Parse a graph file from disk into a `RoadNetwork`.
pub fn load_graph_file(path: impl AsRef<Path>) -> GraphResult<RoadNetwork> {
    let text = std::fs::read_to_string(path)?;
    load_graph_str(&text)
}

fn build_from_file(file: GraphFile) -> GraphResult<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    for node in &file.nodes {
        builder.add_node(&node.id, Point::new(node.x, node.y));
    }
    for edge in &file.edges {
        let from = builder_node_id(&builder, &edge.from)?;
        let to = builder_node_id(&builder, &edge.to)?;
        let modes = ModeSet::from_strs(edge.allowed_modes.iter().map(String::as_str));
        builder.add_road(from, to, edge.distance, modes, edge.one_way);
    }
    builder.build()
}

fn builder_node_id(builder: &RoadNetworkBuilder, name: &str) -> GraphResult<traffic_core::NodeId> {
    // `add_node` already ran for every declared node; edges referencing an
    // undeclared node are a malformed file, not a silent auto-insert.
    builder
        .node_id(name)
        .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = r#"{
        "nodes": [
            {"id": "A", "x": 0.0, "y": 0.0},
            {"id": "B", "x": 1.0, "y": 0.0},
            {"id": "C", "x": 2.0, "y": 0.0},
            {"id": "D", "x": 3.0, "y": 0.0}
        ],
        "edges": [
            {"from": "A", "to": "B", "distance": 100.0, "allowed_modes": ["car", "bicycle", "pedestrian"]},
            {"from": "B", "to": "C", "distance": 100.0, "allowed_modes": ["car", "bicycle", "pedestrian"]},
            {"from": "C", "to": "D", "distance": 100.0, "allowed_modes": ["car", "bicycle", "pedestrian"]}
        ]
    }"#;

    #[test]
    fn loads_nodes_and_both_directions() {
        let net = load_graph_str(SIMPLE).unwrap();
        assert_eq!(net.node_count(), 4);
        assert_eq!(net.edge_count(), 6); // 3 roads, each non-one-way
    }

    #[test]
    fn one_way_edge_is_single_direction() {
        let json = r#"{
            "nodes": [{"id":"A","x":0.0,"y":0.0},{"id":"B","x":1.0,"y":0.0}],
            "edges": [{"from":"A","to":"B","distance":10.0,"allowed_modes":["car"],"one_way":true}]
        }"#;
        let net = load_graph_str(json).unwrap();
        assert_eq!(net.edge_count(), 1);
    }

    #[test]
    fn unknown_node_reference_is_an_error() {
        let json = r#"{
            "nodes": [{"id":"A","x":0.0,"y":0.0}],
            "edges": [{"from":"A","to":"Z","distance":10.0,"allowed_modes":["car"]}]
        }"#;
        assert!(load_graph_str(json).is_err());
    }
}
