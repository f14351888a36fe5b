//! Per-message orchestration.

use std::sync::Arc;
use std::time::Duration;

use modbot_core::{BotError, Intent, ResponseMode, Result};
use rag::Retriever;
use rate_limit::RateLimiter;
use responder::ResponseGenerator;
use tracing::{info, instrument, warn};

/// Outcome of one [`QueryPipeline::answer`] call. Denial is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Replied {
        text: String,
        intent: Intent,
        mode: ResponseMode,
    },
    RateLimited {
        remaining: u64,
        reset_in: Duration,
    },
}

/// Runs one user message through every stage. Holds no per-request state; share via `Arc`.
pub struct QueryPipeline {
    rate_limiter: Arc<RateLimiter>,
    retriever: Arc<dyn Retriever>,
    generator: Arc<ResponseGenerator>,
    top_n: usize,
    retrieval_timeout: Duration,
    deadline: Option<Duration>,
}

/// Retrieval budget when none is configured. Must stay below the request deadline.
pub const DEFAULT_RETRIEVAL_TIMEOUT: Duration = Duration::from_secs(10);

impl QueryPipeline {
    pub fn new(
        rate_limiter: Arc<RateLimiter>,
        retriever: Arc<dyn Retriever>,
        generator: Arc<ResponseGenerator>,
    ) -> Self {
        Self {
            rate_limiter,
            retriever,
            generator,
            top_n: 3,
            retrieval_timeout: DEFAULT_RETRIEVAL_TIMEOUT,
            deadline: None,
        }
    }

    /// Number of neighbours requested from retrieval.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Bounds the retrieval stage; expiry counts as a retrieval failure (empty context).
    pub fn with_retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.retrieval_timeout = timeout;
        self
    }

    /// Bounds the whole request; expiry drops the in-flight backend call.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Answers `text` for `user_id`.
    ///
    /// Errors: rate-limit store failure, invalid input, generation failure or deadline expiry.
    /// Retrieval failures degrade to an answer without context.
    pub async fn answer(&self, user_id: &str, text: &str) -> Result<Answer> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(user_id, text))
                .await
                .map_err(|_| {
                    warn!(user_id = %user_id, ?deadline, "Request deadline exceeded");
                    BotError::Generation("deadline exceeded".to_string())
                })?,
            None => self.run(user_id, text).await,
        }
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn run(&self, user_id: &str, text: &str) -> Result<Answer> {
        let decision = self
            .rate_limiter
            .check_and_consume(user_id)
            .await
            .map_err(|e| BotError::RateLimitStore(e.to_string()))?;
        if !decision.allowed {
            info!(user_id = %user_id, reset_in = ?decision.reset_in, "step: rate limited");
            return Ok(Answer::RateLimited {
                remaining: decision.remaining,
                reset_in: decision.reset_in,
            });
        }

        if !prompt::validate(text) {
            return Err(BotError::InvalidInput(
                "message is empty, too long, or contains control characters".to_string(),
            ));
        }
        let message = prompt::sanitize(text);
        let intent = intent::classify(&message);
        info!(user_id = %user_id, intent = %intent, remaining = decision.remaining, "step: classified");

        let snippets = if intent.needs_retrieval() {
            self.retrieve_or_empty(&message).await
        } else {
            Vec::new()
        };

        let generation = self
            .generator
            .generate_detailed(&message, &snippets, intent)
            .await
            .map_err(|e| BotError::Generation(format!("{e:#}")))?;

        info!(
            user_id = %user_id,
            intent = %intent,
            mode = %generation.mode,
            snippets = snippets.len(),
            "step: answered"
        );
        Ok(Answer::Replied {
            text: generation.text,
            intent,
            mode: generation.mode,
        })
    }

    /// Fail-open: any retrieval error or timeout becomes an empty context.
    async fn retrieve_or_empty(&self, message: &str) -> Vec<String> {
        let retrieval = self.retriever.retrieve(message, self.top_n);
        match tokio::time::timeout(self.retrieval_timeout, retrieval).await {
            Ok(Ok(snippets)) => snippets,
            Ok(Err(e)) => {
                warn!(error = %e, "Retrieval failed, answering without context");
                Vec::new()
            }
            Err(_) => {
                warn!(timeout = ?self.retrieval_timeout, "Retrieval timed out, answering without context");
                Vec::new()
            }
        }
    }
}
