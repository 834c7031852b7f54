//! Saving mood entries.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::web_client::state::SharedState;
use crate::web_client::utils::{journal_error, storage_error, ApiJson};

#[derive(Deserialize)]
pub struct SubmitEntryRequest {
    intensity: i64,
    #[serde(default)]
    thoughts: String,
    #[serde(default)]
    image: Option<String>,
}

/// Save an entry with the currently selected mood.
pub async fn submit_entry_handler(
    State(state): State<SharedState>,
    WithRejection(axum::Json(req), _): ApiJson<SubmitEntryRequest>,
) -> Response {
    let mut st = state.lock().await;

    // Mutate what is on disk now, not what was loaded for the last page.
    if let Err(e) = st.controller.refresh() {
        return storage_error(&e);
    }

    match st
        .controller
        .submit_entry(req.intensity, &req.thoughts, req.image)
    {
        Ok(entry) => {
            let json = serde_json::json!({
                "entry": st.controller.entry_view(&entry),
                "page": st.controller.render(),
            });
            (StatusCode::CREATED, axum::Json(json)).into_response()
        }
        Err(e) => journal_error(&e),
    }
}
