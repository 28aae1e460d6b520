pub mod memory_inspect;
pub mod memory_stats;
pub mod search_memory;
pub mod update_memory;
pub mod write_memory;

use memory_inspect::MemoryInspectParams;
use memory_stats::MemoryStatsParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use search_memory::SearchMemoryParams;
use std::sync::Arc;
use tokio::sync::Mutex;
use update_memory::UpdateMemoryParams;
use write_memory::WriteMemoryParams;

use crate::config::MemweaveConfig;
use crate::embedding::EmbeddingProvider;
use crate::memory::store::{MemoryStore, NodeUpdate};
use crate::memory::types::{MetadataInput, NodeId};

/// MCP tool handler. Each instance serves one session and owns that
/// session's graph; the embedding model is shared across sessions.
#[derive(Clone)]
pub struct MemoryTools {
    tool_router: ToolRouter<Self>,
    store: Arc<Mutex<MemoryStore>>,
    embedding: Arc<dyn EmbeddingProvider>,
    config: Arc<MemweaveConfig>,
}

fn to_ids(ids: Option<Vec<String>>) -> Vec<NodeId> {
    ids.unwrap_or_default().into_iter().map(NodeId::from).collect()
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {e}"))
}

#[tool_router]
impl MemoryTools {
    /// Handler over a fresh, empty store.
    pub fn new(embedding: Arc<dyn EmbeddingProvider>, config: Arc<MemweaveConfig>) -> Self {
        let store = MemoryStore::with_bm25(config.retrieval.bm25());
        Self::with_store(Arc::new(Mutex::new(store)), embedding, config)
    }

    pub fn with_store(
        store: Arc<Mutex<MemoryStore>>,
        embedding: Arc<dyn EmbeddingProvider>,
        config: Arc<MemweaveConfig>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            store,
            embedding,
            config,
        }
    }

    #[tool(description = "Store a memory as a graph node, optionally linked to existing memories. Writing the same content twice returns the existing node's ID.")]
    async fn memory_write(
        &self,
        Parameters(params): Parameters<WriteMemoryParams>,
    ) -> Result<String, String> {
        let metadata = MetadataInput::try_from(params.metadata).map_err(|e| e.to_string())?;
        let connections = to_ids(params.connections);

        let id = self
            .store
            .lock()
            .await
            .write(metadata, &connections)
            .map_err(|e| e.to_string())?;

        tracing::info!(id = %id, connections = connections.len(), "memory_write");
        to_json(&serde_json::json!({ "id": id }))
    }

    #[tool(description = "Search memories: keyword matches seed a walk along memory links, then results are re-ranked by semantic similarity to the query.")]
    async fn memory_search(
        &self,
        Parameters(params): Parameters<SearchMemoryParams>,
    ) -> Result<String, String> {
        let search = params.resolve(&self.config.retrieval)?;
        tracing::info!(
            query = %params.query,
            top_k = search.top_k,
            bfs_depth = search.bfs_depth,
            "memory_search"
        );

        let store = Arc::clone(&self.store);
        let embedding = Arc::clone(&self.embedding);
        let query = params.query;
        // Embedding blocks, so the store is locked on the blocking pool.
        let task = tokio::task::spawn_blocking(move || {
            store
                .blocking_lock()
                .search(&query, &search, embedding.as_ref())
                .map_err(|e| e.to_string())
        });

        let timeout = self.config.embedding.timeout();
        let hits = tokio::time::timeout(timeout, task)
            .await
            .map_err(|_| format!("search timed out after {}ms", timeout.as_millis()))?
            .map_err(|e| format!("search task failed: {e}"))??;

        tracing::debug!(results = hits.len(), "memory_search done");
        to_json(&serde_json::json!({ "total": hits.len(), "results": hits }))
    }

    #[tool(description = "Replace a memory's content and/or add and remove its links. Reports updated=false if the ID does not exist.")]
    async fn memory_update(
        &self,
        Parameters(params): Parameters<UpdateMemoryParams>,
    ) -> Result<String, String> {
        let metadata = params
            .metadata
            .map(MetadataInput::try_from)
            .transpose()
            .map_err(|e| e.to_string())?;
        let update = NodeUpdate {
            metadata,
            add_connections: to_ids(params.add_connections),
            remove_connections: to_ids(params.remove_connections),
        };
        let id = NodeId::from(params.id);

        let updated = self
            .store
            .lock()
            .await
            .update(&id, update)
            .map_err(|e| e.to_string())?;

        tracing::info!(id = %id, updated, "memory_update");
        to_json(&serde_json::json!({ "id": id, "updated": updated }))
    }

    #[tool(description = "Show a memory's metadata and outgoing links by ID.")]
    async fn memory_inspect(
        &self,
        Parameters(params): Parameters<MemoryInspectParams>,
    ) -> Result<String, String> {
        let view = self
            .store
            .lock()
            .await
            .inspect(&NodeId::from(params.id))
            .map_err(|e| e.to_string())?;
        to_json(&view)
    }

    #[tool(description = "Graph statistics: node and link counts, isolated nodes, dedup keys.")]
    async fn memory_stats(
        &self,
        Parameters(_params): Parameters<MemoryStatsParams>,
    ) -> Result<String, String> {
        let stats = self.store.lock().await.stats();
        to_json(&stats)
    }
}

#[tool_handler]
impl ServerHandler for MemoryTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "memweave keeps a graph of memories for this session. Use memory_write to \
                 store facts (link related ones with connections), memory_search to recall \
                 them, and memory_update to revise."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
