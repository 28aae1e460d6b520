use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteMemoryParams {
    #[schemars(
        description = "Memory to store: plain text, or a flat JSON object of string/number/boolean fields. A 'content' field is used as the node's text."
    )]
    pub metadata: serde_json::Value,

    #[schemars(description = "IDs of existing memories this one links to. Unknown IDs are ignored.")]
    pub connections: Option<Vec<String>>,
}
