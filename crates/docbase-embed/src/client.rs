//! Embedding provider client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use docbase_core::{Error, Result, TextEmbedder};

use crate::config::EmbeddingConfig;

/// Client for an OpenAI-compatible embeddings endpoint
pub struct EmbeddingClient {
    config: EmbeddingConfig,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

impl EmbeddingClient {
    /// Create a new embedding client from configuration
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new embedding client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = EmbeddingConfig::from_env()?;
        Self::new(config)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

/// Validate a parsed response against the request batch and restore input
/// order. Providers are allowed to return items out of order; the `index`
/// field is authoritative.
fn collect_embeddings(response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    if response.data.len() != expected {
        return Err(Error::Embedding(format!(
            "expected {} embeddings, got {}",
            expected,
            response.data.len()
        )));
    }

    let mut items = response.data;
    items.sort_by_key(|item| item.index);

    if items.iter().enumerate().any(|(i, item)| item.index != i) {
        return Err(Error::Embedding(
            "embedding response indices do not cover the input batch".to_string(),
        ));
    }

    Ok(items.into_iter().map(|item| item.embedding).collect())
}

#[async_trait]
impl TextEmbedder for EmbeddingClient {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.config.api_url);
        let request_body = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };

        tracing::debug!(batch = texts.len(), model = %self.config.model, "embedding batch");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Embedding(format!(
                "embedding request failed with status {}: {}",
                status, error_text
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        collect_embeddings(parsed, texts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_items_are_restored() {
        let response: EmbeddingResponse = serde_json::from_str(
            r#"{"data":[
                {"embedding":[2.0],"index":1},
                {"embedding":[1.0],"index":0},
                {"embedding":[3.0],"index":2}
            ]}"#,
        )
        .unwrap();

        let vectors = collect_embeddings(response, 3).unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![2.0], vec![3.0]]);
    }

    #[test]
    fn test_count_mismatch_is_an_error() {
        let response: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"embedding":[1.0],"index":0}]}"#).unwrap();

        let result = collect_embeddings(response, 2);
        assert!(matches!(result, Err(Error::Embedding(_))));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_the_network() {
        let client = EmbeddingClient::new(EmbeddingConfig::new("test_key".to_string())).unwrap();
        assert_eq!(client.model(), "text-embedding-ada-002");
        assert_eq!(client.dimension(), 1536);
        let vectors = client.embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
