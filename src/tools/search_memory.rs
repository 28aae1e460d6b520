use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;
use crate::memory::search::SearchParams;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchMemoryParams {
    #[schemars(description = "Natural language query")]
    pub query: String,

    #[schemars(description = "Maximum number of results. Defaults to 5.")]
    pub top_k: Option<i64>,

    #[schemars(description = "How many hops to follow from keyword matches. Defaults to 1.")]
    pub bfs_depth: Option<i64>,

    #[schemars(description = "Keyword matches used as graph seeds. Defaults to 10.")]
    pub lexical_candidates: Option<i64>,
}

impl SearchMemoryParams {
    /// Resolve against configured defaults, rejecting negative counts.
    pub fn resolve(&self, defaults: &RetrievalConfig) -> Result<SearchParams, String> {
        Ok(defaults.search_params(
            count("top_k", self.top_k)?,
            count("bfs_depth", self.bfs_depth)?,
            count("lexical_candidates", self.lexical_candidates)?,
        ))
    }
}

fn count(name: &str, value: Option<i64>) -> Result<Option<usize>, String> {
    value
        .map(|v| usize::try_from(v).map_err(|_| format!("{name} must be non-negative, got {v}")))
        .transpose()
}
