//! Error taxonomy for the memory graph engine.

use thiserror::Error;

/// Errors surfaced by [`MemoryStore`](crate::memory::store::MemoryStore) operations.
///
/// Missing nodes on `update` and `add_edge` are not errors; those operations
/// report `false` instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MemoryError {
    /// A count, query, or metadata value the engine cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No node with the given id.
    #[error("node not found: {0}")]
    NotFound(String),

    /// The embedding provider failed, timed out, or returned unusable vectors.
    #[error("embedding provider failed: {0}")]
    Provider(String),
}

impl MemoryError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}

/// Result type for memory graph operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
