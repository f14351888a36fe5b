//! # modbot-core
//!
//! Core types shared by every stage of the question-answering pipeline: [`Intent`],
//! [`ResponseMode`], [`Document`], the caller-facing [`BotError`], and tracing initialization.
//! Transport-agnostic; used by intent, rag, indexer, responder and pipeline.

pub mod error;
pub mod logger;
pub mod types;

pub use error::{BotError, Result};
pub use logger::init_tracing;
pub use types::{Document, DocumentMetadata, Intent, ResponseMode};
