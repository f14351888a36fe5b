//! reqwest implementation of [`LlmClient`] for an Ollama-style `/generate` endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, instrument};

use super::{GenerateRequest, GenerateResponse, LlmClient};

/// Default backend base URL; endpoints are appended (`{base}/generate`).
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/api";

/// Default per-request timeout. Local models on modest hardware can be slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for the generation backend.
#[derive(Debug, Clone)]
pub struct HttpLlmClient {
    client: Client,
    base_url: String,
}

impl HttpLlmClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self::with_client(client, base_url))
    }

    /// Uses an existing reqwest client (shared connection pool).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/generate", self.base_url);
        debug!(
            url = %url,
            prompt_len = request.prompt.len(),
            num_predict = request.options.num_predict,
            "step: generation request"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("generation request to {url} failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Generation backend returned error status");
            anyhow::bail!("generation backend error ({}): {}", status, body);
        }

        response
            .json::<GenerateResponse>()
            .await
            .context("failed to decode generation response")
    }
}
