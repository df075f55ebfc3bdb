//! Application configuration loaded from environment variables.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::BrokerError;

/// Application configuration loaded from environment variables.
#[derive(Deserialize)]
pub struct Config {
    // === Upstream Credentials ===
    /// Long-lived OpenAI API key. Never leaves this process except as the
    /// bearer token of the upstream call.
    #[serde(deserialize_with = "deserialize_secret")]
    pub openai_api_key: SecretString,

    /// Base URL of the OpenAI REST API.
    #[serde(default = "default_api_base")]
    pub openai_api_base: String,

    /// Total timeout for the upstream call, in milliseconds.
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_ms: u64,

    // === Server Configuration ===
    /// HTTP listener port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Title shown by the greeting and the API docs.
    #[serde(default = "default_title")]
    pub api_title: String,

    /// Expose Prometheus metrics at `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_upstream_timeout() -> u64 {
    10_000
}

fn default_port() -> u16 {
    8000
}

fn default_title() -> String {
    "Create ephemeral token for OpenAI realtime API".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, BrokerError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, BrokerError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars).map_err(|e| match e {
            envy::Error::MissingValue(field) if field == "openai_api_key" => {
                BrokerError::InvalidConfig(
                    "OPENAI_API_KEY environment variable is required".to_string(),
                )
            }
            other => BrokerError::Config(other),
        })
    }

    /// Build a config around a key, with every other field at its default.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: SecretString::from(api_key.into()),
            openai_api_base: default_api_base(),
            upstream_timeout_ms: default_upstream_timeout(),
            port: default_port(),
            api_title: default_title(),
            metrics_enabled: default_true(),
        }
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.openai_api_key.expose_secret().trim().is_empty() {
            return Err("OPENAI_API_KEY environment variable is required".to_string());
        }

        if self.upstream_timeout_ms == 0 {
            return Err("UPSTREAM_TIMEOUT_MS must be greater than 0".to_string());
        }

        let base = Url::parse(&self.openai_api_base)
            .map_err(|e| format!("OPENAI_API_BASE is not a valid URL: {}", e))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(format!(
                "OPENAI_API_BASE must be http or https, got {}",
                base.scheme()
            ));
        }

        Ok(())
    }

    /// Upstream endpoint that issues ephemeral realtime sessions.
    pub fn sessions_url(&self) -> String {
        format!(
            "{}/realtime/sessions",
            self.openai_api_base.trim_end_matches('/')
        )
    }

    /// Key with everything but the last four characters masked.
    pub fn redacted_api_key(&self) -> String {
        let key = self.openai_api_key.expose_secret();
        let tail: String = key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if key.chars().count() <= 8 {
            "****".to_string()
        } else {
            format!("****{}", tail)
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &"[REDACTED]")
            .field("openai_api_base", &self.openai_api_base)
            .field("upstream_timeout_ms", &self.upstream_timeout_ms)
            .field("port", &self.port)
            .field("api_title", &self.api_title)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}
