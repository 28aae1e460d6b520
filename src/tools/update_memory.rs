use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateMemoryParams {
    #[schemars(description = "ID of the memory to update")]
    pub id: String,

    #[schemars(description = "Replacement metadata: plain text or a flat JSON object. Omit to keep the current value.")]
    pub metadata: Option<serde_json::Value>,

    #[schemars(description = "IDs to add outgoing links to. Unknown IDs are ignored.")]
    pub add_connections: Option<Vec<String>>,

    #[schemars(description = "IDs to remove outgoing links to")]
    pub remove_connections: Option<Vec<String>>,
}
