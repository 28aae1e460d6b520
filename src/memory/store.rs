//! Per-session memory store over one graph.
//!
//! [`MemoryStore`] owns the graph together with the two indexes derived from
//! it and keeps them consistent:
//!
//! - the dedup index is updated eagerly on every write and metadata update;
//! - the lexical index is rebuilt lazily, on the first search after the
//!   store's revision moves. The revision increments on every change to
//!   indexed text (node creation, metadata replacement). Edge changes do not
//!   touch indexed text and leave it alone.
//!
//! One store is one session. Callers that share a store across threads wrap
//! it in a mutex; nothing here is a process-wide singleton.

use crate::embedding::EmbeddingProvider;
use crate::error::{MemoryError, Result};
use crate::memory::dedup::{key_of, DedupIndex};
use crate::memory::graph::Graph;
use crate::memory::lexical::{Bm25Params, LexicalIndex};
use crate::memory::search::{self, SearchHit, SearchParams};
use crate::memory::stats::{self, StatsResponse};
use crate::memory::types::{MetadataInput, Node, NodeId, NodeView};

/// Changes applied by [`MemoryStore::update`]. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    /// Replacement metadata. Bare text becomes `{"content": text}`.
    pub metadata: Option<MetadataInput>,
    /// Edge targets to add. Targets missing from the graph are skipped.
    pub add_connections: Vec<NodeId>,
    /// Edge targets to remove. Absent edges are ignored.
    pub remove_connections: Vec<NodeId>,
}

impl NodeUpdate {
    pub fn with_metadata(mut self, metadata: impl Into<MetadataInput>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn connect(mut self, target: impl Into<NodeId>) -> Self {
        self.add_connections.push(target.into());
        self
    }

    pub fn disconnect(mut self, target: impl Into<NodeId>) -> Self {
        self.remove_connections.push(target.into());
        self
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    graph: Graph,
    dedup: DedupIndex,
    lexical: LexicalIndex,
    revision: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_bm25(Bm25Params::default())
    }

    pub fn with_bm25(params: Bm25Params) -> Self {
        Self {
            graph: Graph::new(),
            dedup: DedupIndex::new(),
            lexical: LexicalIndex::new(params),
            revision: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Monotonic counter of changes to indexed text.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.graph.get_node(id)
    }

    /// Owned copy of a node.
    pub fn inspect(&self, id: &NodeId) -> Result<NodeView> {
        self.graph
            .get_node(id)
            .map(NodeView::from)
            .ok_or_else(|| MemoryError::not_found(id.as_str()))
    }

    /// Node currently registered under a dedup key.
    pub fn resolve_key(&self, key: &str) -> Option<&NodeId> {
        self.dedup.get(key)
    }

    pub fn stats(&self) -> StatsResponse {
        stats::memory_stats(&self.graph, &self.dedup, self.revision)
    }

    /// Write a node, or resolve to the existing node with the same dedup key.
    ///
    /// On a fresh write, an edge is added from the new node to each id in
    /// `connections`; ids not in the graph are skipped. A duplicate write
    /// returns the existing id and leaves that node's edges untouched.
    pub fn write(
        &mut self,
        metadata: impl Into<MetadataInput>,
        connections: &[NodeId],
    ) -> Result<NodeId> {
        let metadata = metadata.into().into_metadata()?;
        let key = key_of(&metadata);

        if let Some(existing) = self.dedup.get(&key) {
            debug_assert!(
                self.graph.contains(existing),
                "dedup key {key:?} points at missing node {existing}"
            );
            tracing::debug!(id = %existing, "duplicate write resolved to existing node");
            return Ok(existing.clone());
        }

        let id = self.graph.create_node(metadata);
        self.dedup.insert(key, id.clone());
        self.revision += 1;

        let mut linked = 0usize;
        for target in connections {
            if self.graph.add_edge(&id, target) {
                linked += 1;
            } else {
                tracing::debug!(from = %id, to = %target, "skipping connection to unknown node");
            }
        }

        tracing::debug!(id = %id, connections = linked, "node written");
        Ok(id)
    }

    /// Apply `update` to an existing node.
    ///
    /// Returns `Ok(false)` if the node does not exist, `Ok(true)` once the
    /// update is applied (even if nothing actually changed). Invalid metadata
    /// is rejected before anything is modified.
    pub fn update(&mut self, id: &NodeId, update: NodeUpdate) -> Result<bool> {
        if !self.graph.contains(id) {
            return Ok(false);
        }
        let metadata = update
            .metadata
            .map(MetadataInput::into_metadata)
            .transpose()?;

        if let Some(metadata) = metadata {
            let new_key = key_of(&metadata);
            if let Some(node) = self.graph.get_node_mut(id) {
                let previous = node.replace_metadata(metadata);
                self.dedup.rekey(&key_of(&previous), new_key, id);
                self.revision += 1;
            }
        }

        for target in &update.add_connections {
            self.graph.add_edge(id, target);
        }
        for target in &update.remove_connections {
            self.graph.remove_edge(id, target);
        }

        tracing::debug!(id = %id, revision = self.revision, "node updated");
        Ok(true)
    }

    /// Strict edge insertion: `false` if either endpoint is missing.
    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId) -> bool {
        self.graph.add_edge(source, target)
    }

    pub fn remove_edge(&mut self, source: &NodeId, target: &NodeId) -> bool {
        self.graph.remove_edge(source, target)
    }

    pub fn bfs(&self, start_ids: &[NodeId], max_depth: usize) -> Vec<NodeId> {
        self.graph.bfs(start_ids, max_depth)
    }

    /// Hybrid search: lexical seeds → BFS expansion → semantic re-rank.
    ///
    /// Rebuilds the lexical index first if the store changed since the last search.
    pub fn search(
        &mut self,
        query: &str,
        params: &SearchParams,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Vec<SearchHit>> {
        params.validate()?;
        self.refresh_lexical();
        search::search(&self.graph, &self.lexical, query, params, provider)
    }

    fn refresh_lexical(&mut self) {
        if !self.lexical.is_stale(self.revision) {
            return;
        }
        let documents = self
            .graph
            .nodes()
            .map(|node| (node.id().clone(), node.text_content()));
        self.lexical.rebuild(documents, self.revision);
    }
}
