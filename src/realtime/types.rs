//! Wire shapes for the realtime session exchange.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Realtime model requested for every session.
pub const REALTIME_MODEL: &str = "gpt-4o-realtime-preview-2024-12-17";

/// Voice requested for every session.
pub const REALTIME_VOICE: &str = "verse";

/// Body of the upstream session-creation call.
///
/// Built by the server only. Callers of `/session` have no way to choose the
/// model, the voice, or any other upstream parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionRequest {
    /// Model identifier.
    pub model: &'static str,
    /// Voice identifier.
    pub voice: &'static str,
}

impl Default for SessionRequest {
    fn default() -> Self {
        Self {
            model: REALTIME_MODEL,
            voice: REALTIME_VOICE,
        }
    }
}

/// Ephemeral credential handed to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClientSecret {
    /// Token value.
    pub value: String,
    /// Unix timestamp (seconds) after which the token is rejected.
    pub expires_at: i64,
}

/// Successful session response.
///
/// Documents the shape only; the upstream body is relayed as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionSuccess {
    /// Ephemeral credential.
    pub client_secret: ClientSecret,
}

/// Failure body for `/session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionFailure {
    /// What went wrong.
    pub message: String,
}

impl SessionFailure {
    /// Create a failure body from any displayable error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
