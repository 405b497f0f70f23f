//! Embedding provider configuration

use std::env;

use serde::{Deserialize, Serialize};

use docbase_core::{Error, Result};

/// Configuration for the embedding provider client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub dimension: usize,
}

impl EmbeddingConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("EMBEDDINGS_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                Error::Configuration(
                    "EMBEDDINGS_API_KEY or OPENAI_API_KEY environment variable not found"
                        .to_string(),
                )
            })?;

        let api_url = env::var("EMBEDDINGS_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let model = env::var("EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-ada-002".to_string());

        let dimension = match env::var("EMBEDDING_DIMENSION") {
            Ok(raw) => raw.parse::<usize>().map_err(|_| {
                Error::Configuration(format!("EMBEDDING_DIMENSION is not a number: {raw}"))
            })?,
            Err(_) => 1536,
        };

        Ok(Self {
            api_key,
            api_url,
            model,
            dimension,
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-ada-002".to_string(),
            dimension: 1536,
        }
    }
}
