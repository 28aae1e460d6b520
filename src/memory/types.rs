//! Core memory graph type definitions.
//!
//! Defines [`NodeId`] (an opaque node handle), [`Metadata`] (the ordered
//! key → scalar mapping every node carries), [`MetadataInput`] (the
//! "bare text or mapping" shape callers hand in), and [`Node`] itself.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MemoryError, Result};

/// Field that bare-text input is stored under. When present it is also the
/// node's searchable text and its dedup key.
pub const CONTENT_KEY: &str = "content";

/// Ordered mapping from field name to a scalar or string value.
///
/// Insertion order is preserved (`serde_json` is built with `preserve_order`),
/// so renderings of the same mapping are stable.
pub type Metadata = Map<String, Value>;

/// Opaque, immutable node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Allocate a fresh id. UUID v7, so ids are time-sortable and never reused.
    pub(crate) fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Metadata as supplied by a caller: either bare text or a structured mapping.
///
/// Both shapes are normalized into a single [`Metadata`] mapping at the
/// boundary; bare text becomes `{"content": text}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataInput {
    Text(String),
    Structured(Metadata),
}

impl MetadataInput {
    /// Validate and normalize into the internal mapping.
    ///
    /// A structured mapping must be non-empty, hold only scalar or string
    /// values, and contain at least one textual (string, number, or bool) field.
    /// A `content` field, when present, must itself render to non-empty text.
    pub fn into_metadata(self) -> Result<Metadata> {
        match self {
            Self::Text(text) => {
                if text.is_empty() {
                    return Err(MemoryError::invalid("metadata text must not be empty"));
                }
                let mut metadata = Metadata::new();
                metadata.insert(CONTENT_KEY.to_string(), Value::String(text));
                Ok(metadata)
            }
            Self::Structured(metadata) => {
                validate_metadata(&metadata)?;
                Ok(metadata)
            }
        }
    }
}

impl From<String> for MetadataInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for MetadataInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Metadata> for MetadataInput {
    fn from(m: Metadata) -> Self {
        Self::Structured(m)
    }
}

impl TryFrom<Value> for MetadataInput {
    type Error = MemoryError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::Text(s)),
            Value::Object(m) => Ok(Self::Structured(m)),
            other => Err(MemoryError::invalid(format!(
                "metadata must be a string or an object, got: {other}"
            ))),
        }
    }
}

fn validate_metadata(metadata: &Metadata) -> Result<()> {
    if metadata.is_empty() {
        return Err(MemoryError::invalid("metadata mapping must not be empty"));
    }
    for (key, value) in metadata {
        if value.is_array() || value.is_object() {
            return Err(MemoryError::invalid(format!(
                "metadata field `{key}` must be a scalar or string"
            )));
        }
    }
    if let Some(content) = metadata.get(CONTENT_KEY) {
        // `content` is the node's text and dedup key.
        match render_scalar(content) {
            Some(text) if !text.is_empty() => {}
            _ => {
                return Err(MemoryError::invalid(
                    "metadata `content` must be a non-empty string, number, or bool",
                ))
            }
        }
    }
    if !metadata.values().any(|v| render_scalar(v).is_some()) {
        return Err(MemoryError::invalid(
            "metadata must contain at least one textual field",
        ));
    }
    Ok(())
}

/// Render a scalar the way it should appear in searchable text and dedup keys.
pub(crate) fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Searchable text of a metadata mapping.
///
/// The `content` field wins when present; otherwise every textual value is
/// joined with single spaces in insertion order.
pub fn text_content(metadata: &Metadata) -> String {
    if let Some(content) = metadata.get(CONTENT_KEY) {
        return render_scalar(content).unwrap_or_default();
    }
    metadata
        .values()
        .filter_map(render_scalar)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A knowledge fragment stored in the graph.
///
/// Edges are outgoing, unweighted, and kept in insertion order with set
/// semantics (a target appears at most once).
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    metadata: Metadata,
    edges: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, metadata: Metadata) -> Self {
        Self {
            id,
            metadata,
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Outgoing edge targets, in insertion order.
    pub fn edges(&self) -> &[NodeId] {
        &self.edges
    }

    pub fn has_edge(&self, target: &NodeId) -> bool {
        self.edges.contains(target)
    }

    pub fn text_content(&self) -> String {
        text_content(&self.metadata)
    }

    /// Swap in new metadata, returning the previous mapping.
    pub(crate) fn replace_metadata(&mut self, metadata: Metadata) -> Metadata {
        std::mem::replace(&mut self.metadata, metadata)
    }

    /// Returns `true` if the edge was newly inserted.
    pub(crate) fn add_edge(&mut self, target: NodeId) -> bool {
        if self.edges.contains(&target) {
            return false;
        }
        self.edges.push(target);
        true
    }

    /// Returns `true` if an edge was removed.
    pub(crate) fn remove_edge(&mut self, target: &NodeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e != target);
        self.edges.len() != before
    }
}

/// Owned copy of a node, safe to hand to callers.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub metadata: Metadata,
    pub connections: Vec<NodeId>,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            metadata: node.metadata.clone(),
            connections: node.edges.clone(),
        }
    }
}
