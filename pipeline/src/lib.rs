//! # Pipeline
//!
//! The "submit message, receive answer" surface. [`QueryPipeline::answer`] runs
//! rate limit → validate → sanitize → classify → retrieve → generate for one user message.
//!
//! [`BotConfig`] reads the environment; [`build_components`] turns it into concrete services.

mod components;
mod config;
mod query;

pub use components::{build_components, BotComponents};
pub use config::BotConfig;
pub use query::{Answer, QueryPipeline, DEFAULT_RETRIEVAL_TIMEOUT};
