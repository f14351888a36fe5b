use std::env;
use std::str::FromStr;
use std::time::Duration;

use modbot_core::{BotError, Result};

/// Runtime configuration, loaded from environment variables (optionally seeded from `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    /// Generation and embedding backend base URL (`.../api`).
    pub generation_base_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    pub vector_db_url: String,
    pub collection_name: String,
    /// Maximum accepted cosine distance for retrieved documents.
    pub relevance_threshold: f32,
    pub rag_top_n: usize,
    /// Unset means the in-process counter store (single instance only).
    pub redis_url: Option<String>,
    pub rate_limit_per_minute: u64,
    /// Unset means the built-in prompts.
    pub personality_path: Option<String>,
    /// Whole-answer deadline; also the generation HTTP timeout.
    pub request_timeout: Duration,
    /// Budget for embedding plus vector search; shorter than `request_timeout`.
    pub retrieval_timeout: Duration,
    pub log_file: String,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses `name` when set; an unparsable value is a config error rather than a silent default.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match optional_var(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BotError::Config(format!("{name} has invalid value {raw:?}"))),
    }
}

impl BotConfig {
    pub fn load() -> Result<Self> {
        let relevance_threshold: f32 = parse_var("RELEVANCE_THRESHOLD", rag::DEFAULT_RELEVANCE_THRESHOLD)?;
        if !relevance_threshold.is_finite() || relevance_threshold < 0.0 {
            return Err(BotError::Config(format!(
                "RELEVANCE_THRESHOLD must be a non-negative number, got {relevance_threshold}"
            )));
        }
        let rag_top_n = parse_var("RAG_TOP_N", 3usize)?;
        if rag_top_n == 0 {
            return Err(BotError::Config("RAG_TOP_N must be at least 1".to_string()));
        }

        let request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 120u64)?);
        let retrieval_timeout = Duration::from_secs(parse_var("RETRIEVAL_TIMEOUT_SECS", 10u64)?);
        if retrieval_timeout.is_zero() || retrieval_timeout >= request_timeout {
            return Err(BotError::Config(format!(
                "RETRIEVAL_TIMEOUT_SECS ({}) must be at least 1 and below REQUEST_TIMEOUT_SECS ({})",
                retrieval_timeout.as_secs(),
                request_timeout.as_secs()
            )));
        }

        Ok(Self {
            generation_base_url: var_or("GENERATION_BASE_URL", llm_client::DEFAULT_BASE_URL),
            generation_model: var_or("GENERATION_MODEL", "llama3.2"),
            embedding_model: var_or("EMBEDDING_MODEL", ollama_embedding::DEFAULT_MODEL),
            vector_db_url: var_or("VECTOR_DB_URL", rag::DEFAULT_VECTOR_DB_URL),
            collection_name: var_or("COLLECTION_NAME", rag::DEFAULT_COLLECTION_NAME),
            relevance_threshold,
            rag_top_n,
            redis_url: optional_var("REDIS_URL"),
            rate_limit_per_minute: parse_var("RATE_LIMIT_PER_MINUTE", 5u64)?,
            personality_path: optional_var("PERSONALITY_PATH"),
            request_timeout,
            retrieval_timeout,
            log_file: var_or("LOG_FILE", "logs/modbot.log"),
        })
    }
}
