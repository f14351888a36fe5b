//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and the wire types of the generation backend
//! (`POST /generate`, non-streaming). [`HttpLlmClient`] is the reqwest implementation.
//! Transport-agnostic; used by the responder crate.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod http_llm;

pub use http_llm::{HttpLlmClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Sampling and context parameters sent as `options`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub num_predict: u32,
    pub top_k: u32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    /// Context window size in tokens.
    pub num_ctx: u32,
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub system: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        system: impl Into<String>,
        options: GenerateOptions,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: system.into(),
            stream: false,
            options,
        }
    }
}

/// Response of `POST /generate`. Counts are tokens; durations are nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    #[serde(default)]
    pub eval_count: u64,
    #[serde(default)]
    pub eval_duration: u64,
    #[serde(default)]
    pub prompt_eval_count: u64,
    #[serde(default)]
    pub prompt_eval_duration: u64,
}

/// Generation backend interface: one prompt in, one complete response out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends a non-streaming generation request. Transport failures and non-2xx statuses are errors.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;
}
