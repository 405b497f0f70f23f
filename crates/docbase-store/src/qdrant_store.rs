//! Qdrant-backed passage store

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
    PointId, PointStruct, RetrievedPoint, ScrollPointsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use docbase_core::{
    DOCUMENT_ID_KEY, DocumentGroup, Error, MetaValue, Metadata, PassageStore, QueryResponse,
    Result, StoreStats, TextEmbedder,
};

use crate::config::StoreConfig;

/// Payload key carrying the passage text itself; everything else in the
/// payload is caller metadata.
const TEXT_KEY: &str = "text";

const SCROLL_PAGE: u32 = 256;

/// Passage store backed by a qdrant collection
pub struct QdrantPassageStore {
    client: Qdrant,
    collection_name: String,
    embedder: Arc<dyn TextEmbedder>,
}

impl QdrantPassageStore {
    /// Connect to qdrant and make sure the collection exists.
    ///
    /// Any failure here is the signal for the facade to fall back; this
    /// backend is never retried within the process.
    pub async fn connect(config: &StoreConfig, embedder: Arc<dyn TextEmbedder>) -> Result<Self> {
        let client = Qdrant::from_url(&config.qdrant_url)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| Error::VectorStore(e.to_string()))?;

        let store = Self {
            client,
            collection_name: config.collection_name.clone(),
            embedder,
        };
        store.ensure_collection().await?;
        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<()> {
        let exists = self
            .client
            .collection_exists(self.collection_name.as_str())
            .await
            .map_err(|e| Error::VectorStore(e.to_string()))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(self.collection_name.as_str()).vectors_config(
                        VectorParamsBuilder::new(self.embedder.dimension() as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| Error::VectorStore(e.to_string()))?;
            tracing::info!(collection = %self.collection_name, "created qdrant collection");
        }

        Ok(())
    }

    fn document_filter(document_id: &str) -> Filter {
        Filter::must([Condition::matches(DOCUMENT_ID_KEY, document_id.to_string())])
    }

    async fn scroll_all(&self) -> Result<Vec<RetrievedPoint>> {
        let mut points = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut request = ScrollPointsBuilder::new(self.collection_name.as_str())
                .limit(SCROLL_PAGE)
                .with_payload(true);
            if let Some(o) = offset.take() {
                request = request.offset(o);
            }

            let response = self
                .client
                .scroll(request)
                .await
                .map_err(|e| Error::VectorStore(e.to_string()))?;
            points.extend(response.result);

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(points)
    }
}

fn meta_to_qdrant(value: &MetaValue) -> QdrantValue {
    match value {
        MetaValue::Str(s) => QdrantValue::from(s.clone()),
        MetaValue::Int(i) => QdrantValue::from(*i),
        MetaValue::Float(f) => QdrantValue::from(*f),
        MetaValue::Bool(b) => QdrantValue::from(*b),
    }
}

fn qdrant_to_meta(value: QdrantValue) -> Option<MetaValue> {
    match value.kind? {
        Kind::StringValue(s) => Some(MetaValue::Str(s)),
        Kind::IntegerValue(i) => Some(MetaValue::Int(i)),
        Kind::DoubleValue(f) => Some(MetaValue::Float(f)),
        Kind::BoolValue(b) => Some(MetaValue::Bool(b)),
        _ => None,
    }
}

/// Split a point payload into the passage text and its metadata.
fn split_payload(
    mut payload: std::collections::HashMap<String, QdrantValue>,
) -> (String, Metadata) {
    let text = payload
        .remove(TEXT_KEY)
        .and_then(|v| match v.kind {
            Some(Kind::StringValue(s)) => Some(s),
            _ => None,
        })
        .unwrap_or_default();

    let mut metadata = Metadata::new();
    for (key, value) in payload {
        if let Some(meta_value) = qdrant_to_meta(value) {
            metadata.insert(key, meta_value);
        }
    }

    (text, metadata)
}

#[async_trait]
impl PassageStore for QdrantPassageStore {
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

        // One provider batch for the whole call; a failure inserts nothing.
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                vectors.len()
            )));
        }

        let ids: Vec<String> = texts.iter().map(|_| Uuid::new_v4().to_string()).collect();

        let mut points = Vec::with_capacity(texts.len());
        for (((id, text), metadata), vector) in
            ids.iter().zip(texts.iter()).zip(metadatas.iter()).zip(vectors)
        {
            let mut payload = Payload::new();
            payload.insert(TEXT_KEY, text.clone());
            for (key, value) in metadata.iter() {
                payload.insert(key.clone(), meta_to_qdrant(value));
            }
            points.push(PointStruct::new(id.clone(), vector, payload));
        }

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(self.collection_name.as_str(), points).wait(true),
            )
            .await
            .map_err(|e| Error::VectorStore(e.to_string()))?;

        tracing::info!(chunks = texts.len(), "added chunks to qdrant");
        Ok(ids)
    }

    async fn query(
        &self,
        query: &str,
        n_results: usize,
        document_id: Option<&str>,
    ) -> Result<QueryResponse> {
        if n_results == 0 {
            return Ok(QueryResponse::default());
        }

        let mut vectors = self.embedder.embed(&[query.to_string()]).await?;
        let vector = match vectors.pop() {
            Some(v) => v,
            None => {
                return Err(Error::Embedding(
                    "provider returned no vector for the query".to_string(),
                ));
            }
        };

        let mut request =
            SearchPointsBuilder::new(self.collection_name.as_str(), vector, n_results as u64)
                .with_payload(true);
        if let Some(doc_id) = document_id {
            request = request.filter(Self::document_filter(doc_id));
        }

        let results = self
            .client
            .search_points(request)
            .await
            .map_err(|e| Error::VectorStore(e.to_string()))?;

        let mut response = QueryResponse::default();
        for point in results.result {
            let (text, metadata) = split_payload(point.payload);
            response.documents.push(text);
            response.metadatas.push(metadata);
            // Cosine similarity, higher is better; flip it into the
            // lower-is-better distance every backend reports.
            response.distances.push(1.0 - point.score);
        }

        Ok(response)
    }

    async fn get_all(&self) -> Result<BTreeMap<String, DocumentGroup>> {
        let points = self.scroll_all().await?;

        let mut groups: BTreeMap<String, DocumentGroup> = BTreeMap::new();
        for point in points {
            let (text, metadata) = split_payload(point.payload);
            let doc_id = metadata.document_id().unwrap_or("unknown").to_string();
            let group = groups.entry(doc_id).or_insert_with(|| DocumentGroup {
                chunks: Vec::new(),
                metadata: Metadata::new(),
            });
            group.chunks.push(text);
            // Representative metadata: last write wins. Callers must not
            // rely on which record they get.
            group.metadata = metadata;
        }

        Ok(groups)
    }

    async fn delete_document(&self, document_id: &str) -> Result<bool> {
        let filter = Self::document_filter(document_id);

        let matched = self
            .client
            .count(
                CountPointsBuilder::new(self.collection_name.as_str())
                    .filter(filter.clone())
                    .exact(true),
            )
            .await
            .map_err(|e| Error::VectorStore(e.to_string()))?
            .result
            .map(|r| r.count)
            .unwrap_or(0);

        if matched == 0 {
            tracing::warn!(document_id, "no chunks found for document");
            return Ok(false);
        }

        self.client
            .delete_points(
                DeletePointsBuilder::new(self.collection_name.as_str())
                    .points(filter)
                    .wait(true),
            )
            .await
            .map_err(|e| Error::VectorStore(e.to_string()))?;

        tracing::info!(document_id, chunks = matched, "deleted document");
        Ok(true)
    }

    async fn reset(&self) -> Result<bool> {
        let exists = self
            .client
            .collection_exists(self.collection_name.as_str())
            .await
            .map_err(|e| Error::VectorStore(e.to_string()))?;

        if exists {
            self.client
                .delete_collection(self.collection_name.as_str())
                .await
                .map_err(|e| Error::VectorStore(e.to_string()))?;
        }
        self.ensure_collection().await?;

        tracing::info!(collection = %self.collection_name, "qdrant collection reset");
        Ok(true)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let points = self.scroll_all().await?;

        let mut document_types: BTreeMap<String, usize> = BTreeMap::new();
        let mut document_ids: HashSet<String> = HashSet::new();

        let total_chunks = points.len();
        for point in points {
            let (_, metadata) = split_payload(point.payload);
            let doc_type = metadata
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            *document_types.entry(doc_type.to_string()).or_insert(0) += 1;

            if let Some(doc_id) = metadata.document_id() {
                document_ids.insert(doc_id.to_string());
            }
        }

        Ok(StoreStats {
            total_chunks,
            unique_documents: document_ids.len(),
            document_types,
            backend_name: self.backend_name().to_string(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "qdrant"
    }
}
