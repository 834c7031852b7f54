//! Full page view and charts.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::charts::build_charts;
use crate::web_client::state::SharedState;
use crate::web_client::utils::storage_error;

/// Re-read the journal and render the whole page.
pub async fn page_handler(State(state): State<SharedState>) -> Response {
    let mut st = state.lock().await;
    if let Err(e) = st.controller.refresh() {
        crate::tlog!("page: failed to load journal: {}", e);
        return storage_error(&e);
    }
    let page = st.controller.render();
    (StatusCode::OK, axum::Json(page)).into_response()
}

pub async fn charts_handler(State(state): State<SharedState>) -> Response {
    let mut st = state.lock().await;
    if let Err(e) = st.controller.refresh() {
        return storage_error(&e);
    }
    let charts = build_charts(st.controller.journal().entries());
    (StatusCode::OK, axum::Json(charts)).into_response()
}
