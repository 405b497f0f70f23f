//! Passage store trait and result shapes

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::Metadata;

/// Result of a similarity query.
///
/// The three vectors are index-aligned: `documents[i]` is the passage text,
/// `metadatas[i]` its metadata, `distances[i]` its distance to the query.
/// Lower distance is better regardless of which backend produced it; the
/// fallback backend's lexical scoring can yield negative distances for very
/// strong matches and callers must tolerate them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
    pub distances: Vec<f32>,
}

/// One logical document as returned by [`PassageStore::get_all`].
///
/// `metadata` is a representative record taken from one of the grouped
/// passages (last write wins); callers must not rely on which one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentGroup {
    pub chunks: Vec<String>,
    pub metadata: Metadata,
}

/// Collection statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_chunks: usize,
    pub unique_documents: usize,
    /// Count histogram keyed by the metadata `type` value (`"unknown"` when
    /// a passage carries none).
    pub document_types: BTreeMap<String, usize>,
    pub backend_name: String,
}

/// Trait for passage stores.
///
/// Both the indexed backend and the file-persisted fallback implement this
/// trait with identical caller-visible semantics; the facade holds a trait
/// object so call sites are backend-agnostic by construction.
#[async_trait]
pub trait PassageStore: Send + Sync {
    /// Add a batch of passages, returning their fresh ids in input order.
    ///
    /// When `metadatas` is omitted an empty map is synthesized per text.
    /// When `document_id` is given, every metadata entry is stamped with it
    /// plus a 0-based `chunk_index`. Embedding happens in one batch: if the
    /// provider fails, nothing is inserted.
    async fn add(
        &self,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        document_id: Option<&str>,
    ) -> Result<Vec<String>>;

    /// Return up to `n_results` passages ranked by ascending distance,
    /// optionally restricted to one document. No match is an empty response,
    /// not an error.
    async fn query(
        &self,
        query: &str,
        n_results: usize,
        document_id: Option<&str>,
    ) -> Result<QueryResponse>;

    /// Group every stored passage by document id. Passages without a
    /// `document_id` group under `"unknown"`.
    async fn get_all(&self) -> Result<BTreeMap<String, DocumentGroup>>;

    /// Delete every passage of one document. Returns `false` when nothing
    /// matched.
    async fn delete_document(&self, document_id: &str) -> Result<bool>;

    /// Empty the store and remove any backing persistent state. Idempotent.
    async fn reset(&self) -> Result<bool>;

    /// Collection statistics.
    async fn stats(&self) -> Result<StoreStats>;

    /// Short identifier of the active backend, for health reporting only.
    fn backend_name(&self) -> &'static str;
}
