//! OpenAI-compatible chat-completions provider.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    ChatMessage, GenerationError, GenerationRequest, GenerationResponse, TextGenerator, TokenUsage,
};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{ApiKey, LlmError, ProviderConfig};

/// Longest error body kept in [`GenerationError::Api`].
const MAX_ERROR_BODY_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u64,
}

impl<'a> From<&'a GenerationRequest> for ChatRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            model: request.settings.model.as_str(),
            messages: &request.messages,
            temperature: request.settings.temperature.as_f32(),
            max_tokens: request.settings.max_tokens.as_u64(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl ChatResponse {
    fn into_generation(self) -> Result<GenerationResponse, GenerationError> {
        let usage = self
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::MalformedResponse {
                message: "response contained no choices".to_string(),
            })?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!("output truncated at the max_tokens limit");
        }

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(GenerationResponse { text, usage }),
            _ => Err(GenerationError::MalformedResponse {
                message: "response message had no content".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Calls `POST {api_base}/chat/completions` with a bearer token.
///
/// Works with any OpenAI-compatible endpoint (OpenAI, Groq, local gateways).
#[derive(Debug, Clone)]
pub struct ChatCompletionsProvider {
    client: Client,
    endpoint: String,
    api_key: ApiKey,
    timeout: Duration,
}

impl ChatCompletionsProvider {
    /// Creates a provider; the HTTP client enforces `config.request_timeout`
    /// on every call.
    pub fn new(config: ProviderConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(LlmError::Client)?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            api_key: config.api_key,
            timeout: config.request_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout {
                after: self.timeout,
            }
        } else if err.is_decode() {
            GenerationError::MalformedResponse {
                message: err.to_string(),
            }
        } else {
            GenerationError::Transport {
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        debug!(
            endpoint = %self.endpoint,
            model = %request.settings.model,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&ChatRequest::from(request))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after(response.headers());
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(error = %e, "failed to read error response body");
                    String::new()
                }
            };
            warn!(status = status.as_u16(), "chat completion rejected");
            return Err(classify_status(status, body, retry_after));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| self.transport_error(e))?;
        let generated = chat.into_generation()?;
        debug!(
            chars = generated.text.chars().count(),
            total_tokens = generated.usage.map(|u| u.total().as_u64()),
            "chat completion received"
        );
        Ok(generated)
    }
}

/// Maps a non-success status onto the generation error taxonomy.
fn classify_status(
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Authentication {
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited { retry_after },
        _ => GenerationError::Api {
            status: status.as_u16(),
            body: truncate(body.trim(), MAX_ERROR_BODY_CHARS),
        },
    }
}

/// Reads a `Retry-After` header given in whole seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
