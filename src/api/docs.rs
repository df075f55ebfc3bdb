//! OpenAPI document served behind `/docs`.

use utoipa::OpenApi;

use crate::realtime::{ClientSecret, SessionFailure, SessionSuccess};

/// Path the OpenAPI JSON is served from.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    paths(super::handlers::hello, super::handlers::session),
    components(schemas(SessionSuccess, ClientSecret, SessionFailure)),
    tags(
        (name = "health", description = "Liveness"),
        (name = "session", description = "Ephemeral realtime credentials")
    )
)]
struct ApiDoc;

/// Build the OpenAPI document for the given title.
pub fn openapi(title: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = title.to_string();
    doc.info.description = Some("hello".to_string());
    doc.info.version = "v1".to_string();
    doc
}
