use std::collections::HashSet;

use serde::Serialize;

use crate::memory::dedup::DedupIndex;
use crate::memory::graph::Graph;

/// Response from memory_stats.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub node_count: usize,
    pub edge_count: usize,
    /// Nodes with neither outgoing nor incoming edges.
    pub isolated_nodes: usize,
    pub max_out_degree: usize,
    pub dedup_keys: usize,
    pub revision: u64,
}

/// Compute graph statistics.
pub fn memory_stats(graph: &Graph, dedup: &DedupIndex, revision: u64) -> StatsResponse {
    let targets: HashSet<_> = graph.nodes().flat_map(|n| n.edges().iter()).collect();
    let isolated_nodes = graph
        .nodes()
        .filter(|n| n.edges().is_empty() && !targets.contains(n.id()))
        .count();

    debug_assert!(
        dedup.ids().all(|id| graph.contains(id)),
        "dedup index references a node missing from the graph"
    );

    StatsResponse {
        node_count: graph.len(),
        edge_count: graph.edge_count(),
        isolated_nodes,
        max_out_degree: graph.nodes().map(|n| n.edges().len()).max().unwrap_or(0),
        dedup_keys: dedup.len(),
        revision,
    }
}
