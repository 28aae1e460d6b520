//! Text-to-vector embedding pipeline.
//!
//! The retrieval engine only sees the [`EmbeddingProvider`] trait, so any
//! backend (or a deterministic stub in tests) can sit behind it. The bundled
//! backend runs all-MiniLM-L6-v2 locally; see [`local`].

pub mod local;

use anyhow::Result;

/// Number of dimensions produced by all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Maps text to fixed-length dense vectors.
///
/// Implementations must be deterministic for a given text and model version.
/// All methods are synchronous; async callers should go through
/// `tokio::task::spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, one vector per input, in input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Build the provider named in config. Only `"local"` exists today.
///
/// Fails if the model files are missing; run `memweave model download` first.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => Ok(Box::new(local::LocalEmbeddingProvider::new(config)?)),
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local"),
    }
}
