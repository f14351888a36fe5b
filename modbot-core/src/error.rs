use thiserror::Error;

/// Errors surfaced to callers of the pipeline.
///
/// Rate-limit denial and empty retrieval results are not errors; they are normal outcomes.
#[derive(Error, Debug)]
pub enum BotError {
    /// Input rejected before reaching any backend (empty, oversized, control characters).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The rate-limit store could not be reached or returned garbage.
    #[error("Rate limit store error: {0}")]
    RateLimitStore(String),

    /// Document store administration failed. The answer path never raises this; retrieval there
    /// degrades to empty context.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Text generation failed; fatal to the request.
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
