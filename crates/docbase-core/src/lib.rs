//! Core traits and types for docbase
//!
//! This crate defines the fundamental traits and types used across the docbase
//! retrieval system. It provides capability-facing interfaces for passage
//! stores and embedding providers, making the system test-friendly and
//! extensible: implementations live in sibling crates and are injected behind
//! these traits.

pub mod embedder;
pub mod error;
pub mod store;
pub mod types;

pub use embedder::TextEmbedder;
pub use error::{Error, Result};
pub use store::{DocumentGroup, PassageStore, QueryResponse, StoreStats};
pub use types::{CHUNK_INDEX_KEY, DOCUMENT_ID_KEY, MetaValue, Metadata};
