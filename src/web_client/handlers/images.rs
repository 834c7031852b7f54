//! Photo upload: decode, convert and hand back the value to store.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::Multipart;

use crate::photo::{is_data_uri, prepare_image, MAX_IMAGE_SIZE};
use crate::web_client::state::SharedState;
use crate::web_client::utils::{api_error, image_error, multipart_error};

/// Accepts a multipart `file` field. The prepared value goes back to the
/// page, which sends it with the entry; nothing is saved here.
pub async fn upload_image_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Response {
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_error(&e),
        };
        if field.name() != Some("file") {
            continue;
        }
        filename = field.file_name().map(|f| f.to_string());
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return multipart_error(&e),
        };
        if bytes.len() > MAX_IMAGE_SIZE {
            return api_error(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("image exceeds maximum size of {MAX_IMAGE_SIZE} bytes"),
            );
        }
        file_data = Some(bytes.to_vec());
    }

    let Some(data) = file_data else {
        return api_error(StatusCode::BAD_REQUEST, "no file provided");
    };
    let filename = filename.unwrap_or_default();

    let variant = {
        let st = state.lock().await;
        st.controller.journal().variant()
    };

    // Decoding is CPU-bound; keep it off the async workers and outside the lock.
    let name = filename.clone();
    let result = tokio::task::spawn_blocking(move || prepare_image(variant, &name, &data)).await;

    match result {
        Ok(Ok(image)) => {
            let json = serde_json::json!({
                "filename": filename,
                "inline": is_data_uri(&image),
                "image": image,
            });
            (StatusCode::OK, axum::Json(json)).into_response()
        }
        Ok(Err(e)) => {
            crate::tlog!("images: rejected upload {:?}: {}", filename, e);
            image_error(&e)
        }
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("internal error: {e}"),
        ),
    }
}
