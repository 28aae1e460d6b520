//! Content-key deduplication.
//!
//! Every node is registered under a canonical key derived from its metadata.
//! A write whose key is already registered resolves to the existing node
//! instead of creating a new one.

use std::collections::HashMap;

use crate::memory::types::{render_scalar, Metadata, NodeId, CONTENT_KEY};

/// Canonical dedup key for a metadata mapping.
///
/// The rendered `content` value when present, otherwise the JSON rendering of
/// the whole mapping (field order preserved, so equal mappings written in the
/// same order share a key).
pub fn key_of(metadata: &Metadata) -> String {
    match metadata.get(CONTENT_KEY) {
        Some(content) => render_scalar(content).unwrap_or_else(|| content.to_string()),
        None => serde_json::Value::Object(metadata.clone()).to_string(),
    }
}

#[derive(Debug, Default)]
pub struct DedupIndex {
    keys: HashMap<String, NodeId>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&NodeId> {
        self.keys.get(key)
    }

    /// Map `key` to `id`, replacing any previous owner of the key.
    pub fn insert(&mut self, key: String, id: NodeId) {
        self.keys.insert(key, id);
    }

    /// Move `id` from `old_key` to `new_key`.
    ///
    /// The old key is dropped only while it still points at `id`; another
    /// node's mapping that happens to share it stays put. The new key always
    /// ends up pointing at `id`.
    pub fn rekey(&mut self, old_key: &str, new_key: String, id: &NodeId) {
        if self.keys.get(old_key) == Some(id) {
            self.keys.remove(old_key);
        }
        self.keys.insert(new_key, id.clone());
    }

    /// Ids currently referenced by the index.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.keys.values()
    }
}
