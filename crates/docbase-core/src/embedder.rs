//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Trait for embedding providers.
///
/// Implementations turn a batch of texts into one fixed-length vector per
/// text, in input order. A batch either succeeds as a whole or fails as a
/// whole; the store never partially accepts one.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// The fixed vector length this provider produces.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, one vector per input, same order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
