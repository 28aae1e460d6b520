//! Graph store: node ownership, directed edges and BFS expansion.
//!
//! Nodes live in an arena (`Vec<Node>`, creation order) with an id → slot
//! index beside it. Nothing outside the graph holds a node; every other
//! structure refers to nodes by [`NodeId`].

use std::collections::{HashMap, HashSet, VecDeque};

use crate::memory::types::{Metadata, Node, NodeId};

#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Store a node under a freshly allocated id. Metadata must already be normalized.
    pub fn create_node(&mut self, metadata: Metadata) -> NodeId {
        let id = NodeId::generate();
        debug_assert!(!self.index.contains_key(&id), "node id reused: {id}");
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(Node::new(id.clone(), metadata));
        id
    }

    /// Add a directed edge `source → target`.
    ///
    /// Returns `false` without touching the graph if either endpoint is absent.
    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId) -> bool {
        if !self.contains(target) {
            return false;
        }
        match self.get_node_mut(source) {
            Some(node) => {
                node.add_edge(target.clone());
                true
            }
            None => false,
        }
    }

    /// Remove `source → target` if present. Returns whether an edge was removed.
    pub fn remove_edge(&mut self, source: &NodeId, target: &NodeId) -> bool {
        self.get_node_mut(source)
            .map(|node| node.remove_edge(target))
            .unwrap_or(false)
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    pub(crate) fn get_node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        let slot = *self.index.get(id)?;
        self.nodes.get_mut(slot)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges().len()).sum()
    }

    /// Breadth-first expansion over outgoing edges.
    ///
    /// Every seed sits at depth 0 and is always part of the result; nodes up to
    /// `max_depth` hops away are added once each. The returned ids are distinct
    /// and ordered by discovery, which callers use as a deterministic tie-break.
    pub fn bfs(&self, start_ids: &[NodeId], max_depth: usize) -> Vec<NodeId> {
        let mut discovered: HashSet<&NodeId> = HashSet::new();
        let mut order: Vec<NodeId> = Vec::new();
        let mut queue: VecDeque<(&NodeId, usize)> = VecDeque::new();

        for id in start_ids {
            if discovered.insert(id) {
                order.push(id.clone());
                queue.push_back((id, 0));
            }
        }

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            let Some(node) = self.get_node(current) else {
                continue;
            };
            for neighbor in node.edges() {
                if discovered.insert(neighbor) {
                    order.push(neighbor.clone());
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::types::MetadataInput;

    fn node(graph: &mut Graph, text: &str) -> NodeId {
        let metadata = MetadataInput::from(text).into_metadata().unwrap();
        graph.create_node(metadata)
    }

    fn as_set(ids: Vec<NodeId>) -> HashSet<NodeId> {
        ids.into_iter().collect()
    }

    /// a → b → c → d, plus d → a to close a cycle.
    fn chain() -> (Graph, Vec<NodeId>) {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = ["a", "b", "c", "d"]
            .iter()
            .map(|t| node(&mut graph, t))
            .collect();
        for pair in ids.windows(2) {
            assert!(graph.add_edge(&pair[0], &pair[1]));
        }
        assert!(graph.add_edge(&ids[3], &ids[0]));
        (graph, ids)
    }

    #[test]
    fn create_and_get() {
        let mut graph = Graph::new();
        let id = node(&mut graph, "hello");
        assert_eq!(graph.len(), 1);
        let stored = graph.get_node(&id).unwrap();
        assert_eq!(stored.text_content(), "hello");
        assert!(stored.edges().is_empty());
        assert!(graph.get_node(&NodeId::from("missing")).is_none());
    }

    #[test]
    fn add_edge_rejects_missing_target() {
        let mut graph = Graph::new();
        let a = node(&mut graph, "a");
        assert!(!graph.add_edge(&a, &NodeId::from("ghost")));
        assert!(graph.get_node(&a).unwrap().edges().is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn add_edge_rejects_missing_source() {
        let mut graph = Graph::new();
        let a = node(&mut graph, "a");
        assert!(!graph.add_edge(&NodeId::from("ghost"), &a));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn edges_are_directed_and_deduplicated() {
        let mut graph = Graph::new();
        let a = node(&mut graph, "a");
        let b = node(&mut graph, "b");
        assert!(graph.add_edge(&a, &b));
        assert!(graph.add_edge(&a, &b));
        assert_eq!(graph.get_node(&a).unwrap().edges(), &[b.clone()]);
        assert!(graph.get_node(&b).unwrap().edges().is_empty());
    }

    #[test]
    fn self_loops_are_allowed() {
        let mut graph = Graph::new();
        let a = node(&mut graph, "a");
        assert!(graph.add_edge(&a, &a));
        assert_eq!(graph.bfs(&[a.clone()], 3), vec![a]);
    }

    #[test]
    fn remove_edge_is_noop_when_absent() {
        let mut graph = Graph::new();
        let a = node(&mut graph, "a");
        let b = node(&mut graph, "b");
        assert!(!graph.remove_edge(&a, &b));
        graph.add_edge(&a, &b);
        assert!(graph.remove_edge(&a, &b));
        assert!(!graph.remove_edge(&NodeId::from("ghost"), &b));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn bfs_depth_zero_is_seed_set() {
        let (graph, ids) = chain();
        let seeds = vec![ids[1].clone(), ids[3].clone()];
        assert_eq!(graph.bfs(&seeds, 0), seeds);
    }

    #[test]
    fn bfs_respects_depth() {
        let (graph, ids) = chain();
        let seeds = [ids[0].clone()];
        assert_eq!(graph.bfs(&seeds, 1), vec![ids[0].clone(), ids[1].clone()]);
        assert_eq!(
            graph.bfs(&seeds, 2),
            vec![ids[0].clone(), ids[1].clone(), ids[2].clone()]
        );
        // Cycle back to `a` does not duplicate it.
        assert_eq!(graph.bfs(&seeds, 10), ids);
    }

    #[test]
    fn bfs_is_monotone_in_depth() {
        let (graph, ids) = chain();
        for seeds in [vec![ids[0].clone()], vec![ids[2].clone(), ids[3].clone()]] {
            for depth in 0..5 {
                let shallow = as_set(graph.bfs(&seeds, depth));
                let deep = as_set(graph.bfs(&seeds, depth + 1));
                assert!(shallow.is_subset(&deep), "depth {depth}");
            }
        }
    }

    #[test]
    fn bfs_deduplicates_seeds() {
        let (graph, ids) = chain();
        let seeds = vec![ids[0].clone(), ids[0].clone()];
        assert_eq!(graph.bfs(&seeds, 0), vec![ids[0].clone()]);
    }

    #[test]
    fn bfs_follows_edge_direction() {
        let mut graph = Graph::new();
        let x = node(&mut graph, "A");
        let y = node(&mut graph, "B");
        graph.add_edge(&y, &x);

        assert!(!graph.bfs(&[x.clone()], 1).contains(&y));
        assert!(graph.bfs(&[y.clone()], 1).contains(&x));
    }
}
