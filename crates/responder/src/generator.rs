//! Response generator: sanitize → mode → prompt → backend → cleanup → metrics.

use std::sync::Arc;

use anyhow::{Context, Result};
use llm_client::{GenerateRequest, GenerateResponse, LlmClient};
use modbot_core::{Intent, ResponseMode};
use tracing::{debug, info, instrument, warn};

use crate::{
    build_prompt, clean_response, detect_language, determine_mode, language_instruction,
    GenerationParams, Personality,
};

/// Throughput reported by the backend for one generation. Durations are nanoseconds on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationMetrics {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub tokens_per_second: f64,
    pub prompt_tokens_per_second: f64,
}

fn per_second(tokens: u64, duration_ns: u64) -> f64 {
    if duration_ns == 0 {
        return 0.0;
    }
    tokens as f64 / (duration_ns as f64 / 1_000_000_000.0)
}

impl GenerationMetrics {
    pub fn from_response(response: &GenerateResponse) -> Self {
        Self {
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
            tokens_per_second: per_second(response.eval_count, response.eval_duration),
            prompt_tokens_per_second: per_second(response.prompt_eval_count, response.prompt_eval_duration),
        }
    }
}

/// Everything produced by one [`ResponseGenerator::generate_detailed`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub mode: ResponseMode,
    pub language: Option<&'static str>,
    pub metrics: GenerationMetrics,
}

/// Holds the backend client, model and per-mode prompts/parameters. Stateless across calls.
pub struct ResponseGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    personality: Personality,
    params: GenerationParams,
}

impl ResponseGenerator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            personality: Personality::default(),
            params: GenerationParams::default(),
        }
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer text only. See [`generate_detailed`](Self::generate_detailed).
    pub async fn generate(&self, user_message: &str, snippets: &[String], intent: Intent) -> Result<String> {
        Ok(self.generate_detailed(user_message, snippets, intent).await?.text)
    }

    /// One backend call. Failures carry the mode and model as context and are not retried.
    #[instrument(skip(self, user_message, snippets), fields(intent = %intent, snippets = snippets.len()))]
    pub async fn generate_detailed(
        &self,
        user_message: &str,
        snippets: &[String],
        intent: Intent,
    ) -> Result<Generation> {
        let message = prompt::sanitize(user_message);
        let mode = determine_mode(intent, !snippets.is_empty());
        let prompt = build_prompt(mode, &message, snippets);

        let language = detect_language(&message);
        let mut system = self.personality.system_prompt(mode).to_string();
        if let Some(language) = language {
            system.push_str(&language_instruction(language));
        }
        debug!(mode = %mode, language = ?language, prompt_chars = prompt.chars().count(), "step: prompt built");

        let request = GenerateRequest::new(&self.model, prompt, system, self.params.options(mode));
        let response = self
            .client
            .generate(request)
            .await
            .with_context(|| format!("generation failed (mode={mode}, model={})", self.model))?;

        let text = clean_response(&response.response);
        if text.is_empty() {
            warn!(mode = %mode, raw_len = response.response.len(), "Generation produced an empty answer");
        }
        let metrics = GenerationMetrics::from_response(&response);
        info!(
            mode = %mode,
            prompt_tokens = metrics.prompt_tokens,
            completion_tokens = metrics.completion_tokens,
            tokens_per_second = metrics.tokens_per_second,
            prompt_tokens_per_second = metrics.prompt_tokens_per_second,
            "step: generation done"
        );

        Ok(Generation {
            text,
            mode,
            language,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_from_counts_and_nanoseconds() {
        let response = GenerateResponse {
            response: String::new(),
            eval_count: 100,
            eval_duration: 2_000_000_000,
            prompt_eval_count: 50,
            prompt_eval_duration: 500_000_000,
        };
        let m = GenerationMetrics::from_response(&response);
        assert_eq!(m.completion_tokens, 100);
        assert!((m.tokens_per_second - 50.0).abs() < 1e-9);
        assert!((m.prompt_tokens_per_second - 100.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_are_zero_safe() {
        let m = GenerationMetrics::from_response(&GenerateResponse::default());
        assert_eq!(m, GenerationMetrics::default());
    }
}
