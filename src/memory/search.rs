//! Retrieval engine: lexical seeding, graph expansion, semantic re-rank.
//!
//! 1. BM25 picks `lexical_candidates` seed nodes.
//! 2. BFS over outgoing edges pulls in nodes up to `bfs_depth` hops away.
//! 3. The query and every candidate are embedded; candidates are ranked by
//!    cosine similarity and truncated to `top_k`.
//!
//! Embedding failures fail the whole search. A partial ranking would look
//! like "nothing relevant" to the caller.

use ndarray::{Array2, ArrayView1, Axis};
use serde::Serialize;

use crate::embedding::EmbeddingProvider;
use crate::error::{MemoryError, Result};
use crate::memory::graph::Graph;
use crate::memory::lexical::LexicalIndex;
use crate::memory::types::{Metadata, NodeId};

// ── Public types ──────────────────────────────────────────────────────────────

/// Search knobs. All counts must be positive except `bfs_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    /// Maximum number of results.
    pub top_k: usize,
    /// Hops to expand from each lexical seed. `0` keeps only the seeds.
    pub bfs_depth: usize,
    /// Seeds taken from the lexical index.
    pub lexical_candidates: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            bfs_depth: 1,
            lexical_candidates: 10,
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(MemoryError::invalid("top_k must be positive"));
        }
        if self.lexical_candidates == 0 {
            return Err(MemoryError::invalid("lexical_candidates must be positive"));
        }
        Ok(())
    }
}

/// One ranked search result.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub id: NodeId,
    pub metadata: Metadata,
    /// Cosine similarity between the node text and the query.
    pub score: f64,
    /// Outgoing edge targets, in insertion order.
    pub connections: Vec<NodeId>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Run the three-stage pipeline over `graph`.
///
/// `lexical` must already reflect the graph's current text and `params` must
/// have passed [`SearchParams::validate`]. An empty graph yields an empty
/// result without touching the provider.
pub fn search(
    graph: &Graph,
    lexical: &LexicalIndex,
    query: &str,
    params: &SearchParams,
    provider: &dyn EmbeddingProvider,
) -> Result<Vec<SearchHit>> {
    if graph.is_empty() {
        return Ok(Vec::new());
    }

    // 1. Lexical seeding
    let seeds = lexical.top_k(query, params.lexical_candidates);

    // 2. Graph expansion
    let candidates: Vec<(&NodeId, String)> = graph
        .bfs(&seeds, params.bfs_depth)
        .into_iter()
        .filter_map(|id| graph.get_node(&id).map(|node| (node.id(), node.text_content())))
        .collect();

    tracing::debug!(
        seeds = seeds.len(),
        candidates = candidates.len(),
        bfs_depth = params.bfs_depth,
        "search candidates collected"
    );

    // 3. Semantic re-rank
    let texts: Vec<&str> = candidates.iter().map(|(_, text)| text.as_str()).collect();
    let ranked = rerank(query, &texts, provider)?;

    // 4. Assemble output
    let hits = ranked
        .into_iter()
        .take(params.top_k)
        .filter_map(|(slot, score)| {
            let node = graph.get_node(candidates[slot].0)?;
            Some(SearchHit {
                id: node.id().clone(),
                metadata: node.metadata().clone(),
                score: f64::from(score),
                connections: node.edges().to_vec(),
            })
        })
        .collect();

    Ok(hits)
}

/// Embed the query and candidates, then order candidate slots by similarity.
///
/// Returns `(slot, score)` pairs, best first. Equal scores keep slot order.
pub fn rerank(
    query: &str,
    candidates: &[&str],
    provider: &dyn EmbeddingProvider,
) -> Result<Vec<(usize, f32)>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let query_embedding = provider
        .embed(query)
        .map_err(|e| MemoryError::provider(format!("query embedding: {e:#}")))?;
    let candidate_embeddings = provider
        .embed_batch(candidates)
        .map_err(|e| MemoryError::provider(format!("candidate embeddings: {e:#}")))?;

    if candidate_embeddings.len() != candidates.len() {
        return Err(MemoryError::provider(format!(
            "expected {} candidate embeddings, got {}",
            candidates.len(),
            candidate_embeddings.len()
        )));
    }

    let scores = cosine_scores(&query_embedding, &candidate_embeddings)?;
    let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(ranked)
}

/// Cosine similarity of each candidate vector against `query`.
///
/// A zero-norm vector on either side scores `0.0`.
pub fn cosine_scores(query: &[f32], candidates: &[Vec<f32>]) -> Result<Vec<f32>> {
    let dim = query.len();
    let mut flat = Vec::with_capacity(candidates.len() * dim);
    for (i, candidate) in candidates.iter().enumerate() {
        if candidate.len() != dim {
            return Err(MemoryError::provider(format!(
                "embedding {i} has {} dimensions, query has {dim}",
                candidate.len()
            )));
        }
        flat.extend_from_slice(candidate);
    }

    let matrix = Array2::from_shape_vec((candidates.len(), dim), flat)
        .map_err(|e| MemoryError::provider(e.to_string()))?;
    let query = ArrayView1::from(query);

    let dots = matrix.dot(&query);
    let query_norm = query.dot(&query).sqrt();
    let norms = matrix.map_axis(Axis(1), |row| row.dot(&row).sqrt());

    Ok(dots
        .iter()
        .zip(norms.iter())
        .map(|(dot, norm)| {
            let denom = norm * query_norm;
            if denom > 0.0 {
                dot / denom
            } else {
                0.0
            }
        })
        .collect())
}
