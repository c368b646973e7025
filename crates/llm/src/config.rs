//! Provider connection settings.

use std::time::Duration;

use reqwest::Url;

use crate::LlmError;

/// Default OpenAI endpoint.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Default Groq endpoint (OpenAI-compatible).
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// A bearer credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps `value`, returning `None` if it is empty or whitespace.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.trim().is_empty() {
            None
        } else {
            Some(Self(v.trim().to_string()))
        }
    }

    /// Returns the secret for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Where and how to reach a chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`. `/chat/completions` is appended.
    pub api_base: Url,
    pub api_key: ApiKey,
    /// Per-call timeout applied to the whole HTTP exchange.
    pub request_timeout: Duration,
}

impl ProviderConfig {
    /// Builds a config, validating that `api_base` is an absolute http(s) URL.
    pub fn new(
        api_base: &str,
        api_key: ApiKey,
        request_timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_base = parse_api_base(api_base)?;
        Ok(Self {
            api_base,
            api_key,
            request_timeout,
        })
    }

    /// The full chat-completions URL.
    pub fn endpoint(&self) -> String {
        let base = self.api_base.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

fn parse_api_base(value: &str) -> Result<Url, LlmError> {
    let url = Url::parse(value.trim()).map_err(|e| LlmError::InvalidBaseUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LlmError::InvalidBaseUrl {
            value: value.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
