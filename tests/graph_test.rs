mod helpers;

use std::collections::HashSet;

use helpers::random_graph;
use memweave::{MemoryStore, NodeId};

fn set(ids: Vec<NodeId>) -> HashSet<NodeId> {
    ids.into_iter().collect()
}

#[test]
fn bfs_depth_zero_returns_seeds_exactly() {
    for seed in 0..8 {
        let (store, ids) = random_graph(20, 3, seed);
        let seeds = vec![ids[7].clone(), ids[2].clone(), ids[19].clone()];
        assert_eq!(store.bfs(&seeds, 0), seeds);
    }
}

#[test]
fn bfs_grows_monotonically_with_depth() {
    for seed in 0..8 {
        let (store, ids) = random_graph(30, 2, seed);
        let seeds = vec![ids[seed as usize].clone()];
        for depth in 0..6 {
            let shallow = set(store.bfs(&seeds, depth));
            let deep = set(store.bfs(&seeds, depth + 1));
            assert!(shallow.is_subset(&deep), "seed {seed}, depth {depth}");
        }
    }
}

#[test]
fn bfs_never_repeats_nodes() {
    let (store, ids) = random_graph(25, 4, 42);
    let visited = store.bfs(&[ids[0].clone(), ids[1].clone(), ids[0].clone()], 10);
    assert_eq!(visited.len(), set(visited.clone()).len());
    assert!(visited.len() <= ids.len());
}

#[test]
fn bfs_only_follows_outgoing_edges() {
    let mut store = MemoryStore::new();
    let root = store.write("root", &[]).unwrap();
    let leaf = store.write("leaf", &[root.clone()]).unwrap();
    let island = store.write("island", &[]).unwrap();

    assert_eq!(store.bfs(&[leaf.clone()], 3), vec![leaf.clone(), root.clone()]);
    assert_eq!(store.bfs(&[root.clone()], 3), vec![root]);
    assert_eq!(store.bfs(&[island.clone()], 3), vec![island]);
}

#[test]
fn add_edge_to_missing_target_changes_nothing() {
    let (mut store, ids) = random_graph(10, 2, 7);
    let before = store.stats();
    let edges_before = store.inspect(&ids[3]).unwrap().connections;

    assert!(!store.add_edge(&ids[3], &NodeId::from("missing")));
    assert!(!store.add_edge(&NodeId::from("missing"), &ids[3]));

    assert_eq!(store.stats(), before);
    assert_eq!(store.inspect(&ids[3]).unwrap().connections, edges_before);
}

#[test]
fn add_and_remove_edge() {
    let mut store = MemoryStore::new();
    let a = store.write("a", &[]).unwrap();
    let b = store.write("b", &[]).unwrap();

    assert!(store.add_edge(&a, &b));
    assert_eq!(store.stats().edge_count, 1);
    assert!(store.remove_edge(&a, &b));
    assert!(!store.remove_edge(&a, &b));
    assert_eq!(store.stats().edge_count, 0);
}

#[test]
fn stats_reflect_structure() {
    let mut store = MemoryStore::new();
    let a = store.write("a", &[]).unwrap();
    store.write("b", &[a.clone()]).unwrap();
    store.write("c", &[a.clone()]).unwrap();
    store.write("d", &[]).unwrap();

    let stats = store.stats();
    assert_eq!(stats.node_count, 4);
    assert_eq!(stats.edge_count, 2);
    assert_eq!(stats.isolated_nodes, 1);
    assert_eq!(stats.max_out_degree, 1);
    assert_eq!(stats.dedup_keys, 4);
}
