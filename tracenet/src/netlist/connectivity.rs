//! Net Connectivity Diagnostics
//!
//! Checks whether the non-trace members of a net (vias, connectors, pads) are
//! actually joined by the net's own traces. Each trace links the node nearest
//! each of its endpoints, if one lies within tolerance; BFS over that graph
//! yields the reachable groups. More than one group means the recorded
//! membership is not backed by visible copper.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::geometry::Point;
use crate::model::{ElectricalNet, ElementKind};
use crate::store::{FeatureStore, StoreInner};

/// Result of checking one net
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectivityReport {
    pub net_id: String,
    pub net_name: String,
    /// Mutually reachable node IDs, each group sorted
    pub groups: Vec<Vec<String>>,
    /// Nodes with no known position; not part of any group
    pub unlocated: Vec<String>,
}

impl ConnectivityReport {
    pub fn is_connected(&self) -> bool {
        self.groups.len() <= 1
    }
}

/// Nearest located node within `tolerance` of `p`
fn nearest_node(
    p: &Point,
    nodes: &[(String, Point)],
    tolerance: f64,
) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, (_, pos))| (i, pos.distance_to(p)))
        .filter(|(_, d)| *d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Group a net's nodes by reachability through its traces.
///
/// `node_positions` maps node element IDs to their current position;
/// `trace_endpoints` maps trace IDs to their first and last point.
pub fn connectivity_groups(
    net: &ElectricalNet,
    node_positions: &HashMap<String, Point>,
    trace_endpoints: &HashMap<String, (Point, Point)>,
    tolerance: f64,
) -> ConnectivityReport {
    let mut located: Vec<(String, Point)> = Vec::new();
    let mut unlocated = Vec::new();
    for node in net.nodes() {
        match node_positions.get(&node.id) {
            Some(pos) => located.push((node.id.clone(), *pos)),
            None => unlocated.push(node.id.clone()),
        }
    }

    let mut graph: UnGraph<usize, String> = UnGraph::new_undirected();
    let indices: Vec<NodeIndex> = (0..located.len()).map(|i| graph.add_node(i)).collect();

    for trace in net.elements_of(ElementKind::Trace) {
        let Some((start, end)) = trace_endpoints.get(&trace.id) else {
            continue;
        };
        if let (Some(a), Some(b)) = (
            nearest_node(start, &located, tolerance),
            nearest_node(end, &located, tolerance),
        ) {
            graph.add_edge(indices[a], indices[b], trace.id.clone());
        }
    }

    let mut visited = vec![false; located.len()];
    let mut groups = Vec::new();
    for &start in &indices {
        if visited[graph[start]] {
            continue;
        }
        let mut group = Vec::new();
        let mut bfs = Bfs::new(&graph, start);
        while let Some(nx) = bfs.next(&graph) {
            let i = graph[nx];
            visited[i] = true;
            group.push(located[i].0.clone());
        }
        group.sort();
        groups.push(group);
    }

    ConnectivityReport {
        net_id: net.id.clone(),
        net_name: net.name.clone(),
        groups,
        unlocated,
    }
}

impl StoreInner {
    fn node_positions(&self) -> HashMap<String, Point> {
        let mut positions = HashMap::new();
        for via in self.ordered_vias() {
            positions.insert(via.id.clone(), via.center);
        }
        for cvia in self.ordered_confirmed_vias() {
            positions.insert(cvia.id.clone(), cvia.center);
        }
        for conn in self.ordered_connectors() {
            positions.insert(conn.id.clone(), conn.center);
        }
        positions
    }

    fn trace_endpoints(&self) -> HashMap<String, (Point, Point)> {
        self.ordered_traces()
            .filter_map(|t| t.endpoints().map(|ends| (t.id.clone(), ends)))
            .collect()
    }
}

impl FeatureStore {
    /// Check one net against the store's current geometry
    pub fn check_net_connectivity(
        &self,
        net_id: &str,
        tolerance: f64,
    ) -> Option<ConnectivityReport> {
        let inner = self.inner.read();
        let net = inner.nets.get(net_id)?;
        Some(connectivity_groups(
            net,
            &inner.node_positions(),
            &inner.trace_endpoints(),
            tolerance,
        ))
    }

    /// Check every net, in table order
    pub fn check_all_nets(&self, tolerance: f64) -> Vec<ConnectivityReport> {
        let inner = self.inner.read();
        let positions = inner.node_positions();
        let endpoints = inner.trace_endpoints();
        inner
            .ordered_nets()
            .map(|net| connectivity_groups(net, &positions, &endpoints, tolerance))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_via_net() -> (ElectricalNet, HashMap<String, Point>) {
        let net = ElectricalNet::new("net-001", "SIG")
            .with_element(ElementKind::ConfirmedVia, "cvia-1")
            .with_element(ElementKind::ConfirmedVia, "cvia-2")
            .with_element(ElementKind::Trace, "trace-1");
        let positions = HashMap::from([
            ("cvia-1".to_string(), Point::new(0.0, 0.0)),
            ("cvia-2".to_string(), Point::new(20.0, 0.0)),
        ]);
        (net, positions)
    }

    #[test]
    fn test_misaligned_trace_flags_net() {
        let (net, positions) = two_via_net();
        let endpoints = HashMap::from([(
            "trace-1".to_string(),
            (Point::new(5.0, 5.0), Point::new(15.0, 5.0)),
        )]);

        let report = connectivity_groups(&net, &positions, &endpoints, 1.0);
        assert_eq!(report.groups.len(), 2);
        assert!(!report.is_connected());
    }

    #[test]
    fn test_aligned_trace_joins_nodes() {
        let (net, positions) = two_via_net();
        let endpoints = HashMap::from([(
            "trace-1".to_string(),
            (Point::new(0.5, 0.0), Point::new(20.0, 0.8)),
        )]);

        let report = connectivity_groups(&net, &positions, &endpoints, 1.0);
        assert_eq!(report.groups, vec![vec!["cvia-1".to_string(), "cvia-2".to_string()]]);
        assert!(report.is_connected());
    }

    #[test]
    fn test_pads_without_position_are_unlocated() {
        let (net, positions) = two_via_net();
        let net = net.with_element(ElementKind::Pad, "U1.4");
        let report = connectivity_groups(&net, &positions, &HashMap::new(), 1.0);

        assert_eq!(report.unlocated, vec!["U1.4".to_string()]);
        assert_eq!(report.groups.len(), 2);
    }
}
