#![allow(dead_code)]

use memweave::embedding::EmbeddingProvider;
use memweave::memory::lexical::tokenize;
use memweave::{MemoryStore, NodeId};

pub const STUB_DIM: usize = 64;

/// Deterministic bag-of-words embedding: each token bumps one hashed bucket.
/// Texts sharing words get a positive cosine; disjoint texts get zero.
pub struct StubEmbedder;

fn bucket(token: &str) -> usize {
    // FNV-1a
    let hash = token.bytes().fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
        (h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
    });
    (hash % STUB_DIM as u64) as usize
}

impl EmbeddingProvider for StubEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0.0f32; STUB_DIM];
        for token in tokenize(text) {
            v[bucket(&token)] += 1.0;
        }
        Ok(v)
    }
}

/// Always fails, like a provider whose backend is unreachable.
pub struct FailingEmbedder;

impl EmbeddingProvider for FailingEmbedder {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("embedding backend unavailable")
    }
}

/// Write each text as a fresh node, no connections.
pub fn write_all(store: &mut MemoryStore, texts: &[&str]) -> Vec<NodeId> {
    texts.iter().map(|t| store.write(*t, &[]).unwrap()).collect()
}

/// Deterministic pseudo-random graph: `n` nodes, each with up to `fanout`
/// edges chosen by a linear congruential sequence from `seed`.
pub fn random_graph(n: usize, fanout: usize, seed: u64) -> (MemoryStore, Vec<NodeId>) {
    let mut store = MemoryStore::new();
    let ids: Vec<NodeId> = (0..n)
        .map(|i| store.write(format!("node {i}"), &[]).unwrap())
        .collect();
    let mut state = seed;
    for source in &ids {
        for _ in 0..fanout {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let target = &ids[(state >> 33) as usize % n];
            store.add_edge(source, target);
        }
    }
    (store, ids)
}
