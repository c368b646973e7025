//! Environment-driven configuration.
//!
//! Values come from the process environment, which the binaries populate from
//! an optional `.env` file before calling [`AppConfig::from_env`]. Parsing goes
//! through a lookup function so tests never touch the real environment.

use std::path::PathBuf;
use std::time::Duration;

use llm::{ApiKey, LlmError, ProviderConfig, GROQ_API_BASE, OPENAI_API_BASE};
use pipeline::{GenerationSettings, ModelId, Temperature, TokenCount};
use thiserror::Error;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u64 = 1500;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{variable} is not set")]
    Missing { variable: &'static str },

    #[error("{variable}='{value}' is invalid: {reason}")]
    Invalid {
        variable: &'static str,
        value: String,
        reason: String,
    },
}

/// Which OpenAI-compatible service to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Groq,
}

impl Provider {
    fn key_variable(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Groq => "GROQ_API_KEY",
        }
    }

    fn default_base(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_API_BASE,
            Self::Groq => GROQ_API_BASE,
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
            Self::Groq => DEFAULT_GROQ_MODEL,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => f.write_str("OpenAI"),
            Self::Groq => f.write_str("Groq"),
        }
    }
}

/// Shape of the log lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Everything a binary needs to run a plan.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: Provider,
    pub api_key: ApiKey,
    pub api_base: String,
    pub settings: GenerationSettings,
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
    pub log_format: LogFormat,
    /// OTLP/gRPC collector endpoint; span export is disabled when unset.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let provider = match get("USE_GROQ") {
            Some(v) if parse_flag("USE_GROQ", &v)? => Provider::Groq,
            _ => Provider::OpenAi,
        };

        let key_variable = provider.key_variable();
        let api_key = get(key_variable)
            .and_then(ApiKey::new)
            .ok_or(ConfigError::Missing {
                variable: key_variable,
            })?;

        let api_base = get_or("OPENAI_API_BASE", provider.default_base());

        let model = get_or("OPENAI_MODEL", provider.default_model());
        let model = ModelId::new(model).ok_or(ConfigError::Missing {
            variable: "OPENAI_MODEL",
        })?;

        let temperature = temperature(get("AGENT_TEMPERATURE"))?;
        let max_tokens = positive("AGENT_MAX_TOKENS", &get, DEFAULT_MAX_TOKENS)?;
        let max_tokens = TokenCount::new(max_tokens);
        let zero = || invalid("AGENT_MAX_TOKENS", "0", "must be greater than zero");
        let settings = GenerationSettings::new(model, temperature, max_tokens).ok_or_else(zero)?;

        let timeout_secs = positive("REQUEST_TIMEOUT_SECS", &get, DEFAULT_TIMEOUT_SECS)?;

        let log_format = match get("LOG_FORMAT").map(|v| v.to_ascii_lowercase()) {
            None => LogFormat::Text,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => return Err(invalid("LOG_FORMAT", &v, "expected 'text' or 'json'")),
        };

        Ok(Self {
            provider,
            api_key,
            api_base,
            settings,
            request_timeout: Duration::from_secs(timeout_secs),
            output_dir: get_or("PLAN_OUTPUT_DIR", ".").into(),
            log_format,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// Connection settings for the chat-completions provider.
    pub fn provider_config(&self) -> Result<ProviderConfig, LlmError> {
        ProviderConfig::new(&self.api_base, self.api_key.clone(), self.request_timeout)
    }
}

fn invalid(variable: &'static str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        variable,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_flag(variable: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(variable, value, "expected true or false")),
    }
}

/// Parses `AGENT_TEMPERATURE`, falling back to the default when unset.
fn temperature(raw: Option<String>) -> Result<Temperature, ConfigError> {
    const VARIABLE: &str = "AGENT_TEMPERATURE";
    let raw = raw.unwrap_or_else(|| DEFAULT_TEMPERATURE.to_string());
    let value: f32 = raw.parse().map_err(|e| invalid(VARIABLE, &raw, e))?;
    Temperature::new(value).ok_or_else(|| invalid(VARIABLE, &raw, "must be between 0 and 2"))
}

fn positive(
    variable: &'static str,
    get: impl Fn(&str) -> Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = get(variable) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(invalid(variable, &raw, "must be greater than zero")),
        Ok(value) => Ok(value),
        Err(e) => Err(invalid(variable, &raw, e)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn openai_defaults() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.api_base, OPENAI_API_BASE);
        assert_eq!(config.settings.model.as_str(), "gpt-4o-mini");
        assert_eq!(config.settings.temperature.as_f32(), 0.7);
        assert_eq!(config.settings.max_tokens.as_u64(), 1500);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.otlp_endpoint, None);
    }

    #[test]
    fn groq_switches_key_base_and_model() {
        let config = load(&[("USE_GROQ", "true"), ("GROQ_API_KEY", "gsk-test")]).unwrap();
        assert_eq!(config.provider, Provider::Groq);
        assert_eq!(config.api_key.expose(), "gsk-test");
        assert_eq!(config.api_base, GROQ_API_BASE);
        assert_eq!(config.settings.model.as_str(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn missing_key_names_the_variable() {
        assert_eq!(
            load(&[("USE_GROQ", "1"), ("OPENAI_API_KEY", "sk-test")]).unwrap_err(),
            ConfigError::Missing {
                variable: "GROQ_API_KEY"
            }
        );
        assert_eq!(
            load(&[("OPENAI_API_KEY", "   ")]).unwrap_err(),
            ConfigError::Missing {
                variable: "OPENAI_API_KEY"
            }
        );
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "http://localhost:8080/v1"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("AGENT_TEMPERATURE", "0.2"),
            ("AGENT_MAX_TOKENS", "800"),
            ("REQUEST_TIMEOUT_SECS", "30"),
            ("PLAN_OUTPUT_DIR", "plans"),
            ("LOG_FORMAT", "JSON"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
        ])
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:8080/v1");
        assert_eq!(config.settings.model.as_str(), "gpt-4o");
        assert_eq!(config.settings.temperature.as_f32(), 0.2);
        assert_eq!(config.settings.max_tokens.as_u64(), 800);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.output_dir, PathBuf::from("plans"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.otlp_endpoint.as_deref(),
            Some("http://localhost:4317")
        );
        assert!(config.provider_config().is_ok());
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (variable, value) in [
            ("AGENT_TEMPERATURE", "hot"),
            ("AGENT_TEMPERATURE", "3.5"),
            ("AGENT_MAX_TOKENS", "0"),
            ("REQUEST_TIMEOUT_SECS", "-5"),
            ("LOG_FORMAT", "xml"),
            ("USE_GROQ", "maybe"),
        ] {
            let err = load(&[("OPENAI_API_KEY", "sk-test"), (variable, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid { variable: v, .. } if *v == variable),
                "{variable}={value} gave {err:?}"
            );
        }
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = load(&[("OPENAI_API_KEY", "sk-very-secret")]).unwrap();
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }
}
