//! Embedding provider client for docbase
//!
//! Implements [`docbase_core::TextEmbedder`] against any OpenAI-compatible
//! `/embeddings` endpoint.

mod client;
mod config;

pub use client::EmbeddingClient;
pub use config::EmbeddingConfig;
