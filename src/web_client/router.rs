//! Axum router construction.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::web_client::config::{MAX_ENTRY_BODY, MAX_UPLOAD_BODY};
use crate::web_client::handlers;
use crate::web_client::state::SharedState;
use crate::web_client::static_files::static_handler;

/// Build the complete Axum router with all API routes and the page itself.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health_handler))
        // Page and charts
        .route("/api/page", get(handlers::page::page_handler))
        .route("/api/charts", get(handlers::page::charts_handler))
        // Moods
        .route("/api/catalog", get(handlers::moods::catalog_handler))
        .route(
            "/api/mood/select",
            post(handlers::moods::select_mood_handler),
        )
        // Entries
        .route(
            "/api/entries",
            post(handlers::entries::submit_entry_handler)
                .layer(DefaultBodyLimit::max(MAX_ENTRY_BODY)),
        )
        // Comments
        .route(
            "/api/entries/:entry_id/comments",
            get(handlers::comments::list_entry_comments_handler)
                .post(handlers::comments::submit_comment_handler),
        )
        .route(
            "/api/comments",
            get(handlers::comments::list_comments_handler),
        )
        // Images
        .route(
            "/api/images",
            post(handlers::images::upload_image_handler)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY)),
        )
        // Static fallback; unknown /api paths answer a JSON 404
        .fallback(static_handler)
        .with_state(state)
}
