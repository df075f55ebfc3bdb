//! Unified error types for the token broker.

use reqwest::StatusCode;
use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Unified error type for the token broker.
#[derive(Error, Debug)]
pub enum BrokerError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures while exchanging the server key for an ephemeral session.
///
/// Every variant is reported to the caller the same way (HTTP 500 with the
/// `Display` text as `message`); the variants only matter for logs and
/// metrics.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Upstream answered with a non-success status. The message is the raw
    /// response body.
    #[error("{body}")]
    Upstream {
        /// Upstream status code.
        status: StatusCode,
        /// Response body as text.
        body: String,
    },

    /// Request never produced a response (connect refused, DNS, timeout).
    #[error("{0}")]
    Transport(reqwest::Error),

    /// Upstream answered 2xx but the body was not JSON.
    #[error("{0}")]
    Decode(String),
}

/// Coarse failure classification, used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// Non-2xx from upstream.
    Upstream,
    /// Network-level failure.
    Transport,
    /// Malformed upstream body.
    Decode,
}

impl SessionError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            SessionError::Upstream { .. } => FailureKind::Upstream,
            SessionError::Transport(_) => FailureKind::Transport,
            SessionError::Decode(_) => FailureKind::Decode,
        }
    }

    /// Upstream status, if the upstream answered at all.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            SessionError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, BrokerError>;
