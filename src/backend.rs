use crate::query::MultiMatchQuery;
use crate::schema::IndexSchema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors reported by a search engine backend
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("search engine request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no such index [{0}]")]
    IndexNotFound(String),

    #[error("unexpected search engine response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Outcome of a document write, as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteResult {
    Created,
    Updated,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterInfo {
    #[serde(default)]
    pub cluster_name: Option<String>,
}

/// A document as stored by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub source: Value,
}

/// A scored search match
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: Option<f64>,
    pub source: Value,
}

/// Operations the service needs from a full-text search engine
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn cluster_info(&self) -> Result<ClusterInfo>;

    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Create an index; succeeds if it already exists
    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()>;

    /// Create or fully replace the document stored under `id`.
    /// The write is visible to gets and searches once this returns.
    async fn index_document(&self, index: &str, id: &str, source: &Value) -> Result<WriteResult>;

    /// Fetch a document; `None` when the engine reports it as not found
    async fn get_document(&self, index: &str, id: &str) -> Result<Option<StoredDocument>>;

    /// Run a relevance query, hits in the order the engine ranks them
    async fn search(&self, index: &str, query: &MultiMatchQuery) -> Result<Vec<SearchHit>>;
}
