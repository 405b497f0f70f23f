//! File-persisted fallback passage store
//!
//! Keeps every passage in memory behind an `RwLock` and mirrors the state
//! into two JSON files after each mutation. Queries score by lexical overlap
//! instead of vector distance, so this backend needs no embedding provider.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use docbase_core::{
    DocumentGroup, Error, Metadata, PassageStore, QueryResponse, Result, StoreStats,
};

use crate::scoring::lexical_score;

/// Vector width of the deterministic fallback embedding.
pub(crate) const FALLBACK_DIMENSION: usize = 1536;

const DOCUMENTS_FILE: &str = "documents.json";
const EMBEDDINGS_FILE: &str = "embeddings.json";

/// Deterministic content-derived embedding.
///
/// The md5 digest's 16 bytes are normalized to `[0, 1]` and repeated
/// cyclically up to `dimension`. Identical text yields a bit-identical
/// vector; nothing more is promised — this is a structural stand-in, not a
/// semantic embedding.
pub fn fallback_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let digest = md5::compute(text.as_bytes());
    let base: Vec<f32> = digest.0.iter().map(|b| f32::from(*b) / 255.0).collect();
    (0..dimension).map(|i| base[i % base.len()]).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PassageRecord {
    text: String,
    metadata: Metadata,
}

#[derive(Debug, Default)]
struct StoreState {
    documents: BTreeMap<String, PassageRecord>,
    embeddings: BTreeMap<String, Vec<f32>>,
}

/// Local file-persisted passage store
pub struct LocalPassageStore {
    documents_file: PathBuf,
    embeddings_file: PathBuf,
    state: RwLock<StoreState>,
}

impl LocalPassageStore {
    /// Open a store rooted at `dir`, creating the directory when missing.
    ///
    /// Unreadable or corrupt state files are logged and treated as an empty
    /// store; a best-effort fallback favors availability over strictness.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let documents_file = dir.join(DOCUMENTS_FILE);
        let embeddings_file = dir.join(EMBEDDINGS_FILE);

        let state = StoreState {
            documents: load_or_default(&documents_file),
            embeddings: load_or_default(&embeddings_file),
        };

        tracing::info!(
            passages = state.documents.len(),
            path = %dir.display(),
            "opened local passage store"
        );

        Ok(Self {
            documents_file,
            embeddings_file,
            state: RwLock::new(state),
        })
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        let documents = serde_json::to_string_pretty(&state.documents)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(&self.documents_file, documents)?;

        let embeddings = serde_json::to_string(&state.embeddings)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(&self.embeddings_file, embeddings)?;

        Ok(())
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "could not parse store file, starting empty");
                T::default()
            }
        },
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "could not read store file, starting empty");
            T::default()
        }
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> Error {
    Error::VectorStore(format!("lock error: {e}"))
}

#[async_trait]
impl PassageStore for LocalPassageStore {
    async fn add(
        &self,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        document_id: Option<&str>,
    ) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut metadatas = match metadatas {
            Some(m) if m.len() == texts.len() => m,
            Some(m) => {
                return Err(Error::InvalidInput(format!(
                    "{} metadata entries for {} texts",
                    m.len(),
                    texts.len()
                )));
            }
            None => vec![Metadata::new(); texts.len()],
        };

        if let Some(doc_id) = document_id {
            for (index, metadata) in metadatas.iter_mut().enumerate() {
                metadata.set_document_id(doc_id);
                metadata.set_chunk_index(index as i64);
            }
        }

        let ids: Vec<String> = texts.iter().map(|_| Uuid::new_v4().to_string()).collect();

        {
            let mut state = self.state.write().map_err(lock_error)?;
            for ((id, text), metadata) in ids.iter().zip(texts.iter()).zip(metadatas) {
                state.embeddings.insert(
                    id.clone(),
                    fallback_embedding(text, FALLBACK_DIMENSION),
                );
                state.documents.insert(
                    id.clone(),
                    PassageRecord {
                        text: text.clone(),
                        metadata,
                    },
                );
            }
            self.persist(&state)?;
        }

        tracing::info!(chunks = texts.len(), "added chunks to local store");
        Ok(ids)
    }

    async fn query(
        &self,
        query: &str,
        n_results: usize,
        document_id: Option<&str>,
    ) -> Result<QueryResponse> {
        let state = self.state.read().map_err(lock_error)?;

        let mut scored: Vec<(f32, &PassageRecord)> = Vec::new();
        for record in state.documents.values() {
            if let Some(filter) = document_id {
                if record.metadata.document_id() != Some(filter) {
                    continue;
                }
            }
            let score = lexical_score(query, &record.text);
            if score > 0.0 {
                scored.push((score, record));
            }
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(n_results);

        let mut response = QueryResponse::default();
        for (score, record) in scored {
            response.documents.push(record.text.clone());
            response.metadatas.push(record.metadata.clone());
            response.distances.push(1.0 - score);
        }

        Ok(response)
    }

    async fn get_all(&self) -> Result<BTreeMap<String, DocumentGroup>> {
        let state = self.state.read().map_err(lock_error)?;

        let mut groups: BTreeMap<String, DocumentGroup> = BTreeMap::new();
        for record in state.documents.values() {
            let doc_id = record.metadata.document_id().unwrap_or("unknown").to_string();
            let group = groups.entry(doc_id).or_insert_with(|| DocumentGroup {
                chunks: Vec::new(),
                metadata: Metadata::new(),
            });
            group.chunks.push(record.text.clone());
            // Representative metadata: last write wins. Callers must not
            // rely on which record they get.
            group.metadata = record.metadata.clone();
        }

        Ok(groups)
    }

    async fn delete_document(&self, document_id: &str) -> Result<bool> {
        let mut state = self.state.write().map_err(lock_error)?;

        let doomed: Vec<String> = state
            .documents
            .iter()
            .filter(|(_, record)| record.metadata.document_id() == Some(document_id))
            .map(|(id, _)| id.clone())
            .collect();

        if doomed.is_empty() {
            tracing::warn!(document_id, "no chunks found for document");
            return Ok(false);
        }

        for id in &doomed {
            state.documents.remove(id);
            state.embeddings.remove(id);
        }
        self.persist(&state)?;

        tracing::info!(document_id, chunks = doomed.len(), "deleted document");
        Ok(true)
    }

    async fn reset(&self) -> Result<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.documents.clear();
        state.embeddings.clear();

        if self.documents_file.exists() {
            fs::remove_file(&self.documents_file)?;
        }
        if self.embeddings_file.exists() {
            fs::remove_file(&self.embeddings_file)?;
        }

        tracing::info!("local store reset");
        Ok(true)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let state = self.state.read().map_err(lock_error)?;

        let mut document_types: BTreeMap<String, usize> = BTreeMap::new();
        let mut document_ids: HashSet<&str> = HashSet::new();

        for record in state.documents.values() {
            let doc_type = record
                .metadata
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            *document_types.entry(doc_type.to_string()).or_insert(0) += 1;

            if let Some(doc_id) = record.metadata.document_id() {
                document_ids.insert(doc_id);
            }
        }

        Ok(StoreStats {
            total_chunks: state.documents.len(),
            unique_documents: document_ids.len(),
            document_types,
            backend_name: self.backend_name().to_string(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_embedding_is_deterministic() {
        let first = fallback_embedding("quarterly revenue report", FALLBACK_DIMENSION);
        let second = fallback_embedding("quarterly revenue report", FALLBACK_DIMENSION);
        assert_eq!(first, second);
        assert_eq!(first.len(), FALLBACK_DIMENSION);
    }

    #[test]
    fn test_fallback_embedding_differs_per_text() {
        let a = fallback_embedding("alpha", 64);
        let b = fallback_embedding("beta", 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fallback_embedding_values_are_normalized() {
        let vector = fallback_embedding("some text", 32);
        assert!(vector.iter().all(|v| (0.0..=1.0).contains(v)));
        // Cyclic repetition: position i mirrors position i % 16.
        assert_eq!(vector[0], vector[16]);
        assert_eq!(vector[5], vector[21]);
    }

    #[tokio::test]
    async fn test_add_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPassageStore::open(dir.path()).unwrap();

        store
            .add(
                vec![
                    "Revenue growth exceeded expectations.".to_string(),
                    "Headcount stayed flat.".to_string(),
                ],
                None,
                Some("report"),
            )
            .await
            .unwrap();

        let response = store.query("revenue growth", 5, None).await.unwrap();
        assert_eq!(response.documents.len(), 1);
        assert_eq!(response.metadatas.len(), 1);
        assert_eq!(response.distances.len(), 1);
        // Full phrase match: score 1.5, distance -0.5.
        assert!((response.distances[0] + 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_metadata_length_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPassageStore::open(dir.path()).unwrap();

        let result = store
            .add(
                vec!["one".to_string(), "two".to_string()],
                Some(vec![Metadata::new()]),
                None,
            )
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
