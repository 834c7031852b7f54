//! Mood catalog and mood selection.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::catalog::catalog;
use crate::web_client::state::SharedState;
use crate::web_client::utils::{api_error, ApiJson};

pub async fn catalog_handler() -> Response {
    (StatusCode::OK, axum::Json(serde_json::json!(catalog()))).into_response()
}

#[derive(Deserialize)]
pub struct SelectMoodRequest {
    mood: String,
}

pub async fn select_mood_handler(
    State(state): State<SharedState>,
    WithRejection(axum::Json(req), _): ApiJson<SelectMoodRequest>,
) -> Response {
    let mut st = state.lock().await;
    match st.controller.select_mood(&req.mood) {
        Ok(mood) => {
            let json = serde_json::json!({ "selected_mood": mood.info() });
            (StatusCode::OK, axum::Json(json)).into_response()
        }
        Err(e) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
    }
}
