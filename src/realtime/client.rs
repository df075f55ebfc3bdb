//! Client for the upstream realtime session endpoint.

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{BrokerError, SessionError};
use crate::metrics;

use super::types::SessionRequest;

/// Exchanges the server-held key for ephemeral realtime sessions.
#[derive(Debug)]
pub struct SessionClient {
    /// HTTP client for upstream requests.
    http: reqwest::Client,
    /// Full URL of the session-creation endpoint.
    sessions_url: String,
    /// Long-lived API key.
    api_key: SecretString,
}

impl SessionClient {
    /// Create a session client from config.
    pub fn new(config: &Config) -> Result<Self, BrokerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.upstream_timeout_ms))
            .connect_timeout(Duration::from_secs(5))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self::from_parts(
            http,
            config.sessions_url(),
            SecretString::from(config.openai_api_key.expose_secret().to_string()),
        ))
    }

    /// Assemble a client from an existing HTTP client.
    pub fn from_parts(
        http: reqwest::Client,
        sessions_url: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        Self {
            http,
            sessions_url: sessions_url.into(),
            api_key,
        }
    }

    /// Get the session endpoint URL.
    pub fn sessions_url(&self) -> &str {
        &self.sessions_url
    }

    /// Request a new ephemeral session.
    ///
    /// Returns the upstream JSON body untouched on success.
    #[instrument(skip(self), fields(url = %self.sessions_url))]
    pub async fn create_session(&self) -> Result<Value, SessionError> {
        let start = Instant::now();

        let result = self
            .http
            .post(&self.sessions_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&SessionRequest::default())
            .send()
            .await;
        metrics::record_upstream_latency(start);

        let response = result.map_err(|e| {
            warn!(error = %e, "Upstream request failed");
            SessionError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(SessionError::Transport)?;
            warn!(status = %status, "Upstream rejected session request");
            return Err(SessionError::Upstream { status, body });
        }

        let bytes = response.bytes().await.map_err(SessionError::Transport)?;
        let session: Value = serde_json::from_slice(&bytes)
            .map_err(|e| SessionError::Decode(e.to_string()))?;

        debug!(status = %status, "Created ephemeral session");

        Ok(session)
    }
}
