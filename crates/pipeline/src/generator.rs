//! Port for the external text-generation service.
//!
//! The runner sees only [`TextGenerator`]. Any provider that accepts a model
//! id, role-tagged messages, a temperature and a token cap, and returns text,
//! is substitutable. The HTTP implementation lives in the `llm` crate.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GenerationSettings, TokenUsage};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message of a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Everything a provider needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub settings: GenerationSettings,
    pub messages: Vec<ChatMessage>,
}

/// Text returned by a provider, plus token usage when reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResponse {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

impl GenerationResponse {
    /// Creates a response without usage figures.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

/// Why a generation call failed.
///
/// The runner never retries; every variant aborts the run at the current stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The provider could not be reached (DNS, TLS, connection reset).
    #[error("could not reach the text-generation service: {message}")]
    Transport { message: String },

    /// The call exceeded the configured timeout.
    #[error("text-generation call timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    /// The provider rejected the credentials.
    #[error("text-generation service rejected the credentials (HTTP {status})")]
    Authentication { status: u16 },

    /// The provider throttled the request.
    #[error("text-generation service rate limit reached")]
    RateLimited {
        /// Delay suggested by the provider's `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// Any other non-success response.
    #[error("text-generation service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not contain generated text.
    #[error("text-generation response could not be understood: {message}")]
    MalformedResponse { message: String },
}

impl GenerationError {
    /// Operator-facing advice for this failure.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Transport { .. } => {
                "Check your internet connection and the configured API base URL."
            }
            Self::Timeout { .. } => {
                "The service is slow or unreachable; try again or raise REQUEST_TIMEOUT_SECS."
            }
            Self::Authentication { .. } => {
                "Verify your API key is set correctly in the environment or .env file."
            }
            Self::RateLimited { .. } => {
                "Wait before re-running, and check that your API key has sufficient credits."
            }
            Self::Api { .. } => "Check the model identifier and the provider's status page.",
            Self::MalformedResponse { .. } => {
                "Confirm the API base URL points at an OpenAI-compatible chat-completions endpoint."
            }
        }
    }
}

/// A text-generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for `request`.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;
}
