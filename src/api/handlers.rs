//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{error, info};

use crate::metrics;
use crate::realtime::{SessionClient, SessionFailure, SessionSuccess};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Title used in the greeting and API docs.
    pub title: Arc<str>,
    /// Upstream session client.
    pub sessions: Arc<SessionClient>,
    /// Prometheus handle, when metrics are exposed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(title: impl Into<Arc<str>>, sessions: SessionClient) -> Self {
        Self {
            title: title.into(),
            sessions: Arc::new(sessions),
            metrics: None,
        }
    }

    /// Expose metrics through the given handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Greeting returned by the health responder.
    pub fn greeting(&self) -> String {
        format!("Hello, world! I am {}", self.title)
    }
}

/// Say hello.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "The magical words!", body = String, content_type = "text/plain")
    )
)]
pub async fn hello(State(state): State<AppState>) -> String {
    state.greeting()
}

/// Create a new ephemeral token.
#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses(
        (status = 200, description = "Ephemeral realtime session", body = SessionSuccess),
        (status = 500, description = "Session exchange failed", body = SessionFailure)
    )
)]
pub async fn session(State(state): State<AppState>) -> Response {
    metrics::inc_sessions_requested();

    match state.sessions.create_session().await {
        Ok(body) => {
            metrics::inc_sessions_created();
            info!("Issued ephemeral session");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            let kind = e.kind();
            metrics::inc_sessions_failed(kind);
            error!(
                kind = %kind,
                upstream_status = ?e.upstream_status(),
                error = %e,
                "Session exchange failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SessionFailure::new(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Prometheus exposition - 404 when metrics are disabled.
pub async fn prometheus(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
