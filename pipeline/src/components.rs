//! Component factory: builds the concrete services from [`BotConfig`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use llm_client::HttpLlmClient;
use modbot_core::BotError;
use ollama_embedding::OllamaEmbedding;
use rag::{ChromaClient, RetrievalService};
use rate_limit::{CounterStore, InMemoryCounterStore, RateLimiter, RedisCounterStore};
use responder::{Personality, ResponseGenerator};
use tracing::{info, instrument};

use crate::{BotConfig, QueryPipeline};

/// Concrete services shared by the pipeline and the admin commands.
pub struct BotComponents {
    pub rate_limiter: Arc<RateLimiter>,
    pub retrieval: Arc<RetrievalService>,
    pub generator: Arc<ResponseGenerator>,
    pub rag_top_n: usize,
    pub request_timeout: Duration,
    pub retrieval_timeout: Duration,
}

impl BotComponents {
    /// Pipeline over these components, bounded by the configured request timeout.
    pub fn pipeline(&self) -> QueryPipeline {
        QueryPipeline::new(
            self.rate_limiter.clone(),
            self.retrieval.clone(),
            self.generator.clone(),
        )
        .with_top_n(self.rag_top_n)
        .with_retrieval_timeout(self.retrieval_timeout)
        .with_deadline(self.request_timeout)
    }

    /// Number of stored documents. Unlike answering, a backend failure here is an error.
    pub async fn document_count(&self) -> modbot_core::Result<usize> {
        self.retrieval
            .count()
            .await
            .map_err(|e| BotError::Retrieval(e.to_string()))
    }

    pub async fn delete_document(&self, id: &str) -> modbot_core::Result<()> {
        self.retrieval
            .delete_document(id)
            .await
            .map_err(|e| BotError::Retrieval(e.to_string()))
    }
}

async fn create_counter_store(config: &BotConfig) -> Result<Arc<dyn CounterStore>> {
    match &config.redis_url {
        Some(url) => {
            info!("Using Redis counter store");
            let store = RedisCounterStore::connect(url)
                .await
                .context("Failed to connect to Redis for rate limiting")?;
            Ok(Arc::new(store))
        }
        None => {
            info!("REDIS_URL not set, using in-process counter store");
            Ok(Arc::new(InMemoryCounterStore::new()))
        }
    }
}

/// Builds every service. Backends are contacted lazily, except Redis which connects here.
#[instrument(skip(config))]
pub async fn build_components(config: &BotConfig) -> Result<BotComponents> {
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;
    // Embedding and vector calls get the shorter retrieval budget.
    let retrieval_http = reqwest::Client::builder()
        .timeout(config.retrieval_timeout)
        .build()
        .context("Failed to build retrieval HTTP client")?;

    let store = create_counter_store(config).await?;
    let rate_limiter = Arc::new(RateLimiter::new(store, config.rate_limit_per_minute));

    let embedding = Arc::new(OllamaEmbedding::with_client(
        retrieval_http.clone(),
        &config.generation_base_url,
        &config.embedding_model,
    ));
    let chroma = Arc::new(ChromaClient::with_client(retrieval_http, &config.vector_db_url));
    let retrieval = Arc::new(
        RetrievalService::new(chroma, embedding, &config.collection_name)
            .with_relevance_threshold(config.relevance_threshold),
    );

    let personality = match &config.personality_path {
        Some(path) => {
            info!(path = %path, "Loading personality");
            Personality::from_file(path)?
        }
        None => Personality::default(),
    };
    let llm = Arc::new(HttpLlmClient::with_client(http, &config.generation_base_url));
    let generator = Arc::new(
        ResponseGenerator::new(llm, &config.generation_model).with_personality(personality),
    );

    info!(
        generation_model = %config.generation_model,
        embedding_model = %config.embedding_model,
        collection = %config.collection_name,
        relevance_threshold = config.relevance_threshold,
        rate_limit_per_minute = config.rate_limit_per_minute,
        "step: components built"
    );

    Ok(BotComponents {
        rate_limiter,
        retrieval,
        generator,
        rag_top_n: config.rag_top_n,
        request_timeout: config.request_timeout,
        retrieval_timeout: config.retrieval_timeout,
    })
}
