//! Store configuration

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use docbase_core::{Error, Result};

/// Configuration for the document store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// gRPC url of the qdrant server backing the indexed backend.
    pub qdrant_url: String,
    pub collection_name: String,
    /// Directory holding the fallback backend's files.
    pub data_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl StoreConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let qdrant_url = env::var("DOCBASE_QDRANT_URL")
            .or_else(|_| env::var("QDRANT_URL"))
            .unwrap_or_else(|_| "http://localhost:6334".to_string());

        let collection_name =
            env::var("DOCBASE_COLLECTION").unwrap_or_else(|_| "docbase".to_string());

        let data_dir = env::var("DOCBASE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let chunk_size = parse_env("DOCBASE_CHUNK_SIZE", 1000)?;
        let chunk_overlap = parse_env("DOCBASE_CHUNK_OVERLAP", 200)?;

        let config = Self {
            qdrant_url,
            collection_name,
            data_dir,
            chunk_size,
            chunk_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject chunk parameters that could stall the chunker.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Configuration("chunk size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Configuration(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Directory the fallback backend persists into.
    pub fn fallback_dir(&self) -> PathBuf {
        self.data_dir.join("fallback_store")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            qdrant_url: "http://localhost:6334".to_string(),
            collection_name: "docbase".to_string(),
            data_dir: PathBuf::from("./data"),
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

fn parse_env(key: &str, default: usize) -> Result<usize> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<usize>()
            .map_err(|_| Error::Configuration(format!("{key} is not a number: {raw}"))),
        Err(_) => Ok(default),
    }
}
