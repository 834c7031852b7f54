//! Comment handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::controller::CommentView;
use crate::web_client::state::SharedState;
use crate::web_client::utils::{api_error, journal_error, storage_error, ApiJson};

#[derive(Deserialize)]
pub struct SubmitCommentRequest {
    #[serde(default)]
    commenter_name: String,
    #[serde(default)]
    comment_text: String,
}

pub async fn submit_comment_handler(
    State(state): State<SharedState>,
    Path(entry_id): Path<u64>,
    WithRejection(axum::Json(req), _): ApiJson<SubmitCommentRequest>,
) -> Response {
    let mut st = state.lock().await;
    if let Err(e) = st.controller.refresh() {
        return storage_error(&e);
    }

    match st
        .controller
        .submit_comment(entry_id, &req.commenter_name, &req.comment_text)
    {
        Ok(comment) => {
            let json = serde_json::json!({
                "comment": CommentView::from(&comment),
                "page": st.controller.render(),
            });
            (StatusCode::CREATED, axum::Json(json)).into_response()
        }
        Err(e) => journal_error(&e),
    }
}

/// Comments shown under one entry, oldest first.
pub async fn list_entry_comments_handler(
    State(state): State<SharedState>,
    Path(entry_id): Path<u64>,
) -> Response {
    let mut st = state.lock().await;
    if let Err(e) = st.controller.refresh() {
        return storage_error(&e);
    }
    let journal = st.controller.journal();
    if journal.entry(entry_id).is_none() {
        return api_error(StatusCode::NOT_FOUND, "entry not found");
    }

    let comments: Vec<CommentView> = journal
        .comments_for(entry_id)
        .into_iter()
        .map(CommentView::from)
        .collect();
    (StatusCode::OK, axum::Json(serde_json::json!(comments))).into_response()
}

/// Every comment, newest first, orphans included.
pub async fn list_comments_handler(State(state): State<SharedState>) -> Response {
    let mut st = state.lock().await;
    if let Err(e) = st.controller.refresh() {
        return storage_error(&e);
    }
    let journal = st.controller.journal();
    let comments: Vec<CommentView> = journal
        .comments()
        .iter()
        .rev()
        .map(CommentView::from)
        .collect();
    let json = serde_json::json!({
        "total": comments.len(),
        "orphaned": journal.orphaned_comments().len(),
        "comments": comments,
    });
    (StatusCode::OK, axum::Json(json)).into_response()
}
