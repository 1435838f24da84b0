pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::resume::handlers;
use crate::state::AppState;

/// Slack for multipart framing and the JSON envelope around a data URI.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Largest request body that can still carry a resume of `max_upload_bytes`,
/// sized for the base64 form used by the data-URI endpoints.
fn body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes / 3 * 4 + 4 + BODY_OVERHEAD_BYTES
}

pub fn build_router(state: AppState) -> Router {
    let limit = body_limit(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Editing sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/document",
            put(handlers::handle_replace_document),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(handlers::handle_reset_session),
        )
        .route(
            "/api/v1/sessions/:id/extract",
            post(handlers::handle_extract_upload),
        )
        .route(
            "/api/v1/sessions/:id/extract/data-uri",
            post(handlers::handle_extract_data_uri),
        )
        .route("/api/v1/sessions/:id/preview", get(handlers::handle_preview))
        .route(
            "/api/v1/sessions/:id/preview/print",
            get(handlers::handle_preview_print),
        )
        .route(
            "/api/v1/sessions/:id/notifications",
            get(handlers::handle_drain_notifications),
        )
        // Stateless
        .route("/api/v1/extract", post(handlers::handle_extract_stateless))
        .route("/api/v1/validate", post(handlers::handle_validate))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}
