//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

use super::docs::{openapi, OPENAPI_PATH};
use super::handlers::{hello, prometheus, session, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let docs = SwaggerUi::new("/docs").url(OPENAPI_PATH, openapi(&state.title));

    Router::new()
        // Health endpoint
        .route("/", get(hello))
        // Ephemeral token exchange
        .route("/session", get(session))
        .route("/session/", get(session))
        .route("/metrics", get(prometheus))
        .with_state(state)
        .merge(docs)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
