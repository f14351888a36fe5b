//! HTTP/JSON client for the vector backend (Chroma-style REST API).

use std::time::Duration;

use async_trait::async_trait;
use modbot_core::DocumentMetadata;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use crate::{EmbeddedDocument, RagError, ScoredDocument, VectorStore};

/// Default backend base URL; endpoints are appended (`{base}/collections/...`).
pub const DEFAULT_VECTOR_DB_URL: &str = "http://localhost:8000/api/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Vector backend client. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct ChromaClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query_embeddings: [&'a [f32]; 1],
    n_results: usize,
    include: [&'static str; 3],
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<serde_json::Map<String, Value>>>>>,
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    ids: Vec<&'a str>,
    embeddings: Vec<&'a [f32]>,
    documents: Vec<&'a str>,
    metadatas: Vec<&'a DocumentMetadata>,
}

impl ChromaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RagError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RagError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Maps non-2xx responses to [`RagError`]: 404 → NotFound, 409 or an "already exists" body → AlreadyExists.
    async fn check(operation: &'static str, subject: &str, response: Response) -> Result<Response, RagError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let lowered = body.to_lowercase();
        if status == StatusCode::CONFLICT || lowered.contains("already exists") {
            return Err(RagError::AlreadyExists(subject.to_string()));
        }
        if status == StatusCode::NOT_FOUND || lowered.contains("does not exist") {
            return Err(RagError::NotFound(subject.to_string()));
        }
        error!(operation, status = %status, body = %body, "Vector backend returned error status");
        Err(RagError::Http {
            operation,
            status: status.as_u16(),
            body,
        })
    }
}

fn metadata_from_json(map: serde_json::Map<String, Value>) -> DocumentMetadata {
    map.into_iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, v)
        })
        .collect()
}

/// Flattens the single-query column-major response into ranked rows.
fn rows_from_response(resp: QueryResponse) -> Result<Vec<ScoredDocument>, RagError> {
    let ids = resp.ids.into_iter().next().unwrap_or_default();
    let mut documents = resp.documents.and_then(|d| d.into_iter().next()).unwrap_or_default().into_iter();
    let mut distances = resp.distances.and_then(|d| d.into_iter().next()).unwrap_or_default().into_iter();
    let mut metadatas = resp.metadatas.and_then(|m| m.into_iter().next()).unwrap_or_default().into_iter();

    let mut rows = Vec::with_capacity(ids.len());
    for id in ids {
        let distance = distances
            .next()
            .flatten()
            .ok_or_else(|| RagError::Decode(format!("missing distance for {id}")))?;
        let text = documents.next().flatten().unwrap_or_default();
        let metadata = metadatas.next().flatten().map(metadata_from_json).unwrap_or_default();
        rows.push(ScoredDocument {
            id,
            text,
            distance,
            metadata,
        });
    }
    Ok(rows)
}

#[async_trait]
impl VectorStore for ChromaClient {
    #[instrument(skip(self))]
    async fn get_collection(&self, name: &str) -> Result<String, RagError> {
        let response = self.client.get(self.url(&format!("/collections/{name}"))).send().await?;
        let response = Self::check("get_collection", name, response).await?;
        let body: CollectionResponse = response.json().await?;
        debug!(collection = %name, id = %body.id, "step: collection found");
        Ok(body.id)
    }

    #[instrument(skip(self))]
    async fn create_collection(&self, name: &str) -> Result<String, RagError> {
        let body = json!({
            "name": name,
            "metadata": { "distance_metric": "cosine" }
        });
        let response = self.client.post(self.url("/collections")).json(&body).send().await?;
        let response = Self::check("create_collection", name, response).await?;
        let body: CollectionResponse = response.json().await?;
        debug!(collection = %name, id = %body.id, "step: collection created");
        Ok(body.id)
    }

    #[instrument(skip(self, embedding), fields(dimension = embedding.len()))]
    async fn query(
        &self,
        collection_id: &str,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<ScoredDocument>, RagError> {
        let request = QueryRequest {
            query_embeddings: [embedding],
            n_results,
            include: ["documents", "distances", "metadatas"],
        };
        let response = self
            .client
            .post(self.url(&format!("/collections/{collection_id}/query")))
            .json(&request)
            .send()
            .await?;
        let response = Self::check("query", collection_id, response).await?;
        let body: QueryResponse = response.json().await?;
        rows_from_response(body)
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn add(&self, collection_id: &str, documents: &[EmbeddedDocument]) -> Result<(), RagError> {
        let request = AddRequest {
            ids: documents.iter().map(|d| d.document.id.as_str()).collect(),
            embeddings: documents.iter().map(|d| d.embedding.as_slice()).collect(),
            documents: documents.iter().map(|d| d.document.text.as_str()).collect(),
            metadatas: documents.iter().map(|d| &d.document.metadata).collect(),
        };
        let response = self
            .client
            .post(self.url(&format!("/collections/{collection_id}/add")))
            .json(&request)
            .send()
            .await?;
        Self::check("add", collection_id, response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection_id: &str, ids: &[String]) -> Result<(), RagError> {
        let response = self
            .client
            .post(self.url(&format!("/collections/{collection_id}/delete")))
            .json(&json!({ "ids": ids }))
            .send()
            .await?;
        Self::check("delete", collection_id, response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn count(&self, collection_id: &str) -> Result<usize, RagError> {
        let response = self
            .client
            .get(self.url(&format!("/collections/{collection_id}/count")))
            .send()
            .await?;
        let response = Self::check("count", collection_id, response).await?;
        Ok(response.json::<usize>().await?)
    }
}
