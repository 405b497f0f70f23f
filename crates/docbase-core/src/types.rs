//! Metadata model shared by every passage store backend

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved metadata key grouping passages that belong to one source document.
pub const DOCUMENT_ID_KEY: &str = "document_id";

/// Reserved metadata key holding a passage's 0-based position in its document.
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

/// A single metadata value.
///
/// Stores accept only this small value set; anything richer belongs in the
/// passage text itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Float(f) => Some(*f),
            MetaValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Str(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Str(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Int(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

/// Open key/value metadata attached to a passage.
///
/// The store treats the map opaquely except for two reserved keys:
/// [`DOCUMENT_ID_KEY`], stamped by the store when a document id is supplied
/// at add-time, and [`CHUNK_INDEX_KEY`], the passage's position within its
/// document. Arbitrary caller-supplied keys round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The id of the document this passage belongs to, if stamped.
    pub fn document_id(&self) -> Option<&str> {
        self.get(DOCUMENT_ID_KEY).and_then(MetaValue::as_str)
    }

    pub fn set_document_id(&mut self, document_id: &str) {
        self.insert(DOCUMENT_ID_KEY, document_id);
    }

    /// The passage's 0-based position within its document, if stamped.
    pub fn chunk_index(&self) -> Option<i64> {
        self.get(CHUNK_INDEX_KEY).and_then(MetaValue::as_i64)
    }

    pub fn set_chunk_index(&mut self, index: i64) {
        self.insert(CHUNK_INDEX_KEY, index);
    }
}
