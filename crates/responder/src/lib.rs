//! # Responder
//!
//! Turns a sanitized question plus optional retrieved snippets into an answer.
//!
//! - [`determine_mode`]: (intent, has context) → [`ResponseMode`](modbot_core::ResponseMode).
//! - [`build_prompt`] / [`clean_response`]: prompt template in, echo-trimmed answer out.
//! - [`Personality`] and [`GenerationParams`]: per-mode system prompts and sampling bundles.
//! - [`ResponseGenerator`]: one backend call per answer, with throughput metrics.

mod generator;
mod language;
mod mode;
mod params;
mod personality;
mod template;

pub use generator::{Generation, GenerationMetrics, ResponseGenerator};
pub use language::{detect_language, language_instruction};
pub use mode::determine_mode;
pub use params::{GenerationParams, ModeParams};
pub use personality::Personality;
pub use template::{build_prompt, clean_response, CONTEXT_SEPARATOR, ECHO_MARKERS, SNIPPET_MAX_CHARS};
