use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `memory_stats` takes no arguments.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct MemoryStatsParams {}
