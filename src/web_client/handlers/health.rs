//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::web_client::state::SharedState;
use crate::web_client::utils::storage_error;

pub async fn health_handler(State(state): State<SharedState>) -> Response {
    let mut st = state.lock().await;
    if let Err(e) = st.controller.refresh() {
        return storage_error(&e);
    }
    let journal = st.controller.journal();

    let body = serde_json::json!({
        "status": if journal.warning().is_some() { "degraded" } else { "ok" },
        "variant": journal.variant(),
        "data_file": journal.storage().path().display().to_string(),
        "entries": journal.entries().len(),
        "comments": journal.comments().len(),
        "warning": journal.warning(),
    });
    (StatusCode::OK, axum::Json(body)).into_response()
}
