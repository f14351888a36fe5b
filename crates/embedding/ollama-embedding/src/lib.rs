//! # Ollama Embedding Service
//!
//! Implements [`EmbeddingService`] against the generation backend's embedding endpoint:
//! `POST {base}/embeddings` with `{model, prompt}` → `{embedding: [float]}`.
//!
//! ```rust,no_run
//! use embedding::EmbeddingService;
//! use ollama_embedding::OllamaEmbedding;
//!
//! async fn example() -> Result<(), anyhow::Error> {
//!     let service = OllamaEmbedding::new("http://localhost:11434/api", "nomic-embed-text")?;
//!     let embedding = service.embed("metabolism").await?;
//!     println!("Embedding dimension: {}", embedding.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use embedding::EmbeddingService;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "nomic-embed-text";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Embedding client for the generation backend.
#[derive(Debug, Clone)]
pub struct OllamaEmbedding {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedding {
    /// Creates a client for `base_url` (e.g. `http://localhost:11434/api`) and `model`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self::with_client(client, base_url, model))
    }

    /// Uses an existing reqwest client (shared pool and timeout).
    pub fn with_client(client: Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Sets a different embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingService for OllamaEmbedding {
    /// Embeds one text. Non-2xx statuses are errors; an empty vector is passed through for the
    /// caller to judge.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("embedding request to {url} failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_text, "Embedding backend returned error status");
            return Err(anyhow::anyhow!("embedding backend error ({}): {}", status, error_text));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .context("failed to decode embedding response")?;
        if body.embedding.is_empty() {
            warn!(model = %self.model, text_len = text.len(), "Embedding backend returned an empty vector");
        }

        debug!(
            dimension = body.embedding.len(),
            text_len = text.len(),
            "step: embedding done"
        );
        Ok(body.embedding)
    }
}
