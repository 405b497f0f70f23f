//! Passage store implementations for docbase
//!
//! Two interchangeable backends behind [`docbase_core::PassageStore`]: a
//! qdrant-backed vector index and a file-persisted fallback that scores by
//! lexical overlap. [`DocumentStore`] picks between them once at startup and
//! presents one surface to callers either way.

mod chunker;
mod config;
mod document_store;
mod local_store;
mod qdrant_store;
mod scoring;


pub use chunker::chunk_text;
pub use config::StoreConfig;
pub use document_store::DocumentStore;
pub use local_store::{LocalPassageStore, fallback_embedding};
pub use qdrant_store::QdrantPassageStore;
pub use scoring::lexical_score;

// Re-export core types for convenience
pub use docbase_core::{
    DocumentGroup, Error, MetaValue, Metadata, PassageStore, QueryResponse, Result, StoreStats,
    TextEmbedder,
};
