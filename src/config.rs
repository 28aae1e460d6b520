use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::memory::lexical::Bm25Params;
use crate::memory::search::SearchParams;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MemweaveConfig {
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// `"stdio"` or `"http"`.
    pub transport: String,
    pub log_level: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
    /// Upper bound on the embedding work of a single search.
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_top_k: usize,
    pub default_bfs_depth: usize,
    pub default_lexical_candidates: usize,
    pub bm25_k1: f64,
    pub bm25_b: f64,
    pub bm25_epsilon: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            log_level: "info".into(),
            host: "127.0.0.1".into(),
            port: 8765,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_memweave_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
            timeout_ms: 30_000,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let search = SearchParams::default();
        let bm25 = Bm25Params::default();
        Self {
            default_top_k: search.top_k,
            default_bfs_depth: search.bfs_depth,
            default_lexical_candidates: search.lexical_candidates,
            bm25_k1: bm25.k1,
            bm25_b: bm25.b,
            bm25_epsilon: bm25.epsilon,
        }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl RetrievalConfig {
    pub fn bm25(&self) -> Bm25Params {
        Bm25Params {
            k1: self.bm25_k1,
            b: self.bm25_b,
            epsilon: self.bm25_epsilon,
        }
    }

    /// Search parameters with the configured defaults filled in.
    pub fn search_params(
        &self,
        top_k: Option<usize>,
        bfs_depth: Option<usize>,
        lexical_candidates: Option<usize>,
    ) -> SearchParams {
        SearchParams {
            top_k: top_k.unwrap_or(self.default_top_k),
            bfs_depth: bfs_depth.unwrap_or(self.default_bfs_depth),
            lexical_candidates: lexical_candidates.unwrap_or(self.default_lexical_candidates),
        }
    }
}

/// Returns `~/.memweave/`, or `./.memweave/` when there is no home directory.
pub fn default_memweave_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memweave")
}

/// Returns the default config file path: `~/.memweave/config.toml`
pub fn default_config_path() -> PathBuf {
    default_memweave_dir().join("config.toml")
}

impl MemweaveConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MemweaveConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (`MEMWEAVE_LOG_LEVEL`, `MEMWEAVE_TRANSPORT`, `MEMWEAVE_MODEL_DIR`).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MEMWEAVE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("MEMWEAVE_TRANSPORT") {
            self.server.transport = val;
        }
        if let Ok(val) = std::env::var("MEMWEAVE_MODEL_DIR") {
            self.embedding.cache_dir = val;
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
