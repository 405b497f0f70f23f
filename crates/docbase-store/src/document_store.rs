//! Backend-selecting document store facade

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use docbase_core::{
    DocumentGroup, Error, Metadata, PassageStore, QueryResponse, Result, StoreStats, TextEmbedder,
};
use docbase_embed::EmbeddingClient;

use crate::chunker::chunk_text;
use crate::config::StoreConfig;
use crate::local_store::LocalPassageStore;
use crate::qdrant_store::QdrantPassageStore;

/// Document store with fallback support.
///
/// Tries the qdrant backend once at construction; when that fails the store
/// permanently switches to the file-persisted fallback for the lifetime of
/// the process. The facade holds a trait object and implements
/// [`PassageStore`] by delegation, so call sites are backend-agnostic by
/// construction — callers must never branch on which backend is active.
pub struct DocumentStore {
    backend: Box<dyn PassageStore>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentStore {
    /// Connect the preferred backend, falling back to the local store on any
    /// initialization failure.
    pub async fn connect(config: StoreConfig, embedder: Arc<dyn TextEmbedder>) -> Result<Self> {
        config.validate()?;

        let backend: Box<dyn PassageStore> =
            match QdrantPassageStore::connect(&config, embedder).await {
                Ok(store) => Box::new(store),
                Err(error) => {
                    tracing::warn!(%error, "qdrant initialization failed");
                    tracing::info!("falling back to local passage store");
                    Box::new(LocalPassageStore::open(config.fallback_dir())?)
                }
            };

        tracing::info!(backend = backend.backend_name(), "document store ready");

        Ok(Self {
            backend,
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        })
    }

    /// Build the store entirely from environment variables.
    pub async fn from_env() -> Result<Self> {
        let config = StoreConfig::from_env()?;
        let embedder: Arc<dyn TextEmbedder> = Arc::new(EmbeddingClient::from_env()?);
        Self::connect(config, embedder).await
    }

    /// Wrap an already-constructed backend.
    pub fn with_backend(
        backend: Box<dyn PassageStore>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<Self> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(Error::Configuration(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            backend,
            chunk_size,
            chunk_overlap,
        })
    }

    /// Chunk a document's extracted text and add every chunk under one
    /// document id, cloning `template` as each chunk's metadata.
    pub async fn add_text(
        &self,
        content: &str,
        template: &Metadata,
        document_id: &str,
    ) -> Result<Vec<String>> {
        let chunks = chunk_text(content, self.chunk_size, self.chunk_overlap)?;
        let metadatas = chunks.iter().map(|_| template.clone()).collect();
        self.backend.add(chunks, Some(metadatas), Some(document_id)).await
    }
}

#[async_trait]
impl PassageStore for DocumentStore {
    async fn add(
        &self,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        document_id: Option<&str>,
    ) -> Result<Vec<String>> {
        self.backend.add(texts, metadatas, document_id).await
    }

    async fn query(
        &self,
        query: &str,
        n_results: usize,
        document_id: Option<&str>,
    ) -> Result<QueryResponse> {
        self.backend.query(query, n_results, document_id).await
    }

    async fn get_all(&self) -> Result<BTreeMap<String, DocumentGroup>> {
        self.backend.get_all().await
    }

    async fn delete_document(&self, document_id: &str) -> Result<bool> {
        self.backend.delete_document(document_id).await
    }

    async fn reset(&self) -> Result<bool> {
        self.backend.reset().await
    }

    async fn stats(&self) -> Result<StoreStats> {
        self.backend.stats().await
    }

    fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }
}
