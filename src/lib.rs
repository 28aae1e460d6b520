//! Graph-structured working memory for AI agents, served over MCP.
//!
//! An agent writes memories as nodes carrying flat metadata, links related
//! nodes with directed edges, and recalls them with a hybrid search:
//!
//! 1. BM25 picks lexical seed nodes for the query.
//! 2. A breadth-first walk along outgoing edges widens the seeds into a candidate set.
//! 3. Candidates are re-ranked by cosine similarity between their embeddings
//!    and the query's.
//!
//! Writes are deduplicated on a content key, so storing the same fact twice
//! returns the existing node. Memory lives for the process (one graph per MCP
//! session); nothing is persisted.
//!
//! # Modules
//!
//! - [`memory`]: the graph engine (store, dedup, lexical index, search)
//! - [`embedding`]: the [`embedding::EmbeddingProvider`] seam and the local ONNX backend
//! - [`config`]: TOML + environment configuration
//! - [`tools`] and [`server`]: the MCP surface

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod memory;
pub mod server;
pub mod tools;

pub use error::{MemoryError, Result};
pub use memory::search::{SearchHit, SearchParams};
pub use memory::store::{MemoryStore, NodeUpdate};
pub use memory::types::{Metadata, MetadataInput, NodeId};
