//! Chainplan text-generation provider adapter.
//!
//! Implements the [`pipeline::TextGenerator`] trait for OpenAI-compatible
//! chat-completions endpoints (OpenAI itself, Groq, local gateways). Other
//! providers are added as new `impl` blocks in this crate without any changes
//! to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, response parsing,
//! timeout enforcement and status classification live here. The [`pipeline`]
//! crate sees only [`pipeline::TextGenerator`] and
//! [`pipeline::GenerationError`].
//!
//! No call is retried: a throttled or failed request is reported to the runner,
//! which ends the run at that stage.

pub mod chat;
pub mod config;

pub use chat::ChatCompletionsProvider;
pub use config::{ApiKey, ProviderConfig, GROQ_API_BASE, OPENAI_API_BASE};

use thiserror::Error;

/// Errors raised while constructing a provider (before any call is made).
#[derive(Debug, Error)]
pub enum LlmError {
    /// The API base URL is not an absolute http(s) URL.
    #[error("invalid API base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    /// The HTTP client could not be built (e.g. TLS backend initialisation).
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
