//! [`SearchBackend`] over the OpenSearch REST API.

use crate::backend::{
    ClusterInfo, EngineError, Result, SearchBackend, SearchHit, StoredDocument,
    WriteResult,
};
use crate::query::MultiMatchQuery;
use crate::schema::IndexSchema;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct IndexResponse {
    result: WriteResult,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source", default)]
    source: Value,
}

/// Plain-HTTP, unauthenticated OpenSearch client.
///
/// Holds a single pooled [`Client`]; clone the surrounding `Arc` rather than
/// building one per request.
pub struct OpenSearchBackend {
    client: Client,
    base_url: Url,
}

impl OpenSearchBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| EngineError::Decode(format!("invalid engine url {base_url}: {e}")))?;
        let client = Client::builder().timeout(timeout).gzip(true).build()?;
        Ok(Self { client, base_url })
    }

    /// Build `http://{host}:{port}`
    pub fn from_host(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        Self::new(&format!("http://{host}:{port}"), timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL with each segment percent-encoded
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EngineError::Decode(format!("engine url {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.request(method, self.url(segments)?))
    }
}

/// Turn a non-success status into an error carrying the engine's body
async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("<unreadable body: {e}>"),
    };
    Err(EngineError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let response = error_for_status(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| EngineError::Decode(e.to_string()))
}

#[async_trait]
impl SearchBackend for OpenSearchBackend {
    async fn cluster_info(&self) -> Result<ClusterInfo> {
        let response = self.request(Method::GET, &[])?.send().await?;
        decode(response).await
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self.request(Method::HEAD, &[index])?.send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => error_for_status(response).await.map(|_| true),
        }
    }

    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<()> {
        let response = self
            .request(Method::PUT, &[index])?
            .json(&schema.to_body())
            .send()
            .await?;

        match error_for_status(response).await {
            Ok(_) => Ok(()),
            Err(EngineError::Status { status: 400, body })
                if body.contains("resource_already_exists_exception") =>
            {
                tracing::debug!(index, "index created concurrently");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn index_document(&self, index: &str, id: &str, source: &Value) -> Result<WriteResult> {
        let response = self
            .request(Method::PUT, &[index, "_doc", id])?
            .query(&[("refresh", "true")])
            .json(source)
            .send()
            .await?;

        let response: IndexResponse = decode(response).await?;
        Ok(response.result)
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<StoredDocument>> {
        let response = self.request(Method::GET, &[index, "_doc", id])?.send().await?;

        // Covers both a missing document and a missing index
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let found: GetResponse = decode(response).await?;
        Ok(Some(StoredDocument {
            id: found.id,
            source: found.source,
        }))
    }

    async fn search(&self, index: &str, query: &MultiMatchQuery) -> Result<Vec<SearchHit>> {
        let response = self
            .request(Method::POST, &[index, "_search"])?
            .json(&query.to_body())
            .send()
            .await?;

        let found: SearchResponse = decode(response).await?;
        Ok(found
            .hits
            .hits
            .into_iter()
            .map(|hit| SearchHit {
                id: hit.id,
                score: hit.score,
                source: hit.source,
            })
            .collect())
    }
}
