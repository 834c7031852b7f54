use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::oneshot;

use mood_journal::photo::MAX_IMAGE_SIZE;
use mood_journal::storage::Variant;
use mood_journal::web_client::config::Config;
use mood_journal::web_client::open_state;
use mood_journal::web_client::router::build_router;

async fn start_server(data_file: &Path, variant: Variant) -> (String, oneshot::Sender<()>) {
    let config = Config {
        bind_addr: "127.0.0.1:0".to_string(),
        data_file: data_file.to_path_buf(),
        variant,
        migrate_legacy: None,
    };
    let state = open_state(&config).expect("open journal");
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind server");
    let addr = listener.local_addr().expect("server addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        let _ = shutdown_rx.await;
    });
    tokio::spawn(async move {
        let _ = server.await;
    });

    (format!("http://{}", addr), shutdown_tx)
}

fn read_response(result: Result<ureq::Response, ureq::Error>) -> (u16, Value) {
    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(e) => panic!("transport error: {e}"),
    };
    let status = response.status();
    let body = response.into_string().expect("response body");
    let value = serde_json::from_str(&body).unwrap_or(Value::Null);
    (status, value)
}

fn get(url: String) -> (u16, Value) {
    read_response(ureq::get(&url).call())
}

fn post(url: String, body: Value) -> (u16, Value) {
    read_response(
        ureq::post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body.to_string()),
    )
}

fn upload(url: String, filename: &str, bytes: &[u8]) -> (u16, Value) {
    let boundary = "----moodjournalboundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    read_response(
        ureq::post(&url)
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .send_bytes(&body),
    )
}

/// Run blocking HTTP calls off the test runtime's worker.
async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.expect("client task")
}

fn sample_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 3, image::Rgb([200, 120, 40]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

fn data_file(tmp: &TempDir) -> PathBuf {
    tmp.path().join("mood_data.json")
}

#[tokio::test]
async fn select_submit_and_render_round_trip() {
    let tmp = TempDir::new().unwrap();
    let path = data_file(&tmp);
    let (base, shutdown_tx) = start_server(&path, Variant::Extended).await;

    let (status, health, page) = blocking({
        let base = base.clone();
        move || {
            let (status, health) = get(format!("{base}/api/health"));
            let (_, page) = get(format!("{base}/api/page"));
            (status, health, page)
        }
    })
    .await;
    assert_eq!(status, 200);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["variant"], "extended");
    assert_eq!(page["moods"].as_array().unwrap().len(), 9);
    assert_eq!(page["intensity"]["default"], 5);
    assert!(page["history"].as_array().unwrap().is_empty());
    assert!(page["charts"]["distribution"].is_null());

    let (select, created) = blocking({
        let base = base.clone();
        move || {
            let select = post(format!("{base}/api/mood/select"), json!({ "mood": "calm" }));
            let created = post(
                format!("{base}/api/entries"),
                json!({ "intensity": 7, "thoughts": "平静的一天" }),
            );
            (select, created)
        }
    })
    .await;
    assert_eq!(select.0, 200);
    assert_eq!(select.1["selected_mood"]["key"], "calm");
    assert_eq!(created.0, 201);
    assert_eq!(created.1["entry"]["id"], 1);
    assert_eq!(created.1["entry"]["mood"]["key"], "calm");
    assert_eq!(created.1["entry"]["intensity"], 7);
    assert!(created.1["page"]["selected_mood"].is_null());
    assert_eq!(created.1["page"]["total_entries"], 1);

    let (charts_status, charts) = blocking({
        let base = base.clone();
        move || get(format!("{base}/api/charts"))
    })
    .await;
    shutdown_tx.send(()).ok();

    assert_eq!(charts_status, 200);
    assert_eq!(charts["distribution"]["kind"], "pie");
    assert_eq!(charts["distribution"]["points"][0]["value"], 1.0);
    assert_eq!(charts["timeline"]["points"][0]["value"], 7.0);

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["mood_data"][0]["thoughts"], "平静的一天");
}

#[tokio::test]
async fn submit_without_selection_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = data_file(&tmp);
    let (base, shutdown_tx) = start_server(&path, Variant::Extended).await;

    let (no_mood, unknown, out_of_range) = blocking({
        let base = base.clone();
        move || {
            let no_mood = post(format!("{base}/api/entries"), json!({ "intensity": 5 }));
            let unknown = post(format!("{base}/api/mood/select"), json!({ "mood": "bored" }));
            post(format!("{base}/api/mood/select"), json!({ "mood": "sad" }));
            let out_of_range = post(format!("{base}/api/entries"), json!({ "intensity": 11 }));
            (no_mood, unknown, out_of_range)
        }
    })
    .await;
    shutdown_tx.send(()).ok();

    assert_eq!(no_mood.0, 400);
    assert!(no_mood.1["error"].as_str().unwrap().contains("select a mood"));
    assert_eq!(unknown.0, 400);
    assert_eq!(out_of_range.0, 400);
    assert!(!path.exists(), "nothing should have been written");
}

#[tokio::test]
async fn comments_are_listed_per_entry_and_globally() {
    let tmp = TempDir::new().unwrap();
    let path = data_file(&tmp);
    let (base, shutdown_tx) = start_server(&path, Variant::Extended).await;

    let (created, missing, per_entry, feed, unknown_entry) = blocking({
        let base = base.clone();
        move || {
            post(format!("{base}/api/mood/select"), json!({ "mood": "happy" }));
            post(format!("{base}/api/entries"), json!({ "intensity": 8 }));

            let created = post(
                format!("{base}/api/entries/1/comments"),
                json!({ "commenter_name": "小明", "comment_text": "加油" }),
            );
            post(
                format!("{base}/api/entries/1/comments"),
                json!({ "commenter_name": "小红", "comment_text": "真好" }),
            );
            let missing = post(
                format!("{base}/api/entries/1/comments"),
                json!({ "commenter_name": "  ", "comment_text": "x" }),
            );
            let per_entry = get(format!("{base}/api/entries/1/comments"));
            let feed = get(format!("{base}/api/comments"));
            let unknown_entry = get(format!("{base}/api/entries/99/comments"));
            (created, missing, per_entry, feed, unknown_entry)
        }
    })
    .await;
    shutdown_tx.send(()).ok();

    assert_eq!(created.0, 201);
    assert_eq!(created.1["comment"]["id"], 1);
    assert_eq!(created.1["page"]["history"][0]["comments"][0]["comment_text"], "加油");
    assert_eq!(missing.0, 400);

    assert_eq!(per_entry.0, 200);
    let listed = per_entry.1.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["commenter_name"], "小明");

    assert_eq!(feed.1["total"], 2);
    assert_eq!(feed.1["comments"][0]["commenter_name"], "小红");
    assert_eq!(unknown_entry.0, 404);

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["comments"].as_array().unwrap().len(), 2);
    assert_eq!(
        saved["mood_data"][0]["comments"].as_array().unwrap().len(),
        2
    );
}

#[tokio::test]
async fn uploaded_image_is_stored_inline() {
    let tmp = TempDir::new().unwrap();
    let path = data_file(&tmp);
    let (base, shutdown_tx) = start_server(&path, Variant::Extended).await;
    let png = sample_png();

    let (uploaded, rejected, entry) = blocking({
        let base = base.clone();
        move || {
            let uploaded = upload(format!("{base}/api/images"), "sunset.png", &png);
            let rejected = upload(format!("{base}/api/images"), "notes.gif", &png);
            post(format!("{base}/api/mood/select"), json!({ "mood": "loved" }));
            let image = uploaded.1["image"].clone();
            let entry = post(
                format!("{base}/api/entries"),
                json!({ "intensity": 9, "image": image }),
            );
            (uploaded, rejected, entry)
        }
    })
    .await;
    shutdown_tx.send(()).ok();

    assert_eq!(uploaded.0, 200);
    assert_eq!(uploaded.1["inline"], true);
    assert!(uploaded.1["image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert_eq!(rejected.0, 400);

    assert_eq!(entry.0, 201);
    assert_eq!(entry.1["entry"]["image_inline"], true);
    assert_eq!(entry.1["entry"]["image"], uploaded.1["image"]);
}

#[tokio::test]
async fn basic_journal_has_no_comments() {
    let tmp = TempDir::new().unwrap();
    let path = data_file(&tmp);
    let (base, shutdown_tx) = start_server(&path, Variant::Basic).await;
    let png = sample_png();

    let (uploaded, entry, comment) = blocking({
        let base = base.clone();
        move || {
            let uploaded = upload(format!("{base}/api/images"), "walk.png", &png);
            post(format!("{base}/api/mood/select"), json!({ "mood": "tired" }));
            let entry = post(
                format!("{base}/api/entries"),
                json!({ "intensity": 3, "image": uploaded.1["image"].clone() }),
            );
            let comment = post(
                format!("{base}/api/entries/1/comments"),
                json!({ "commenter_name": "a", "comment_text": "b" }),
            );
            (uploaded, entry, comment)
        }
    })
    .await;
    shutdown_tx.send(()).ok();

    assert_eq!(uploaded.1["image"], "walk.png");
    assert_eq!(uploaded.1["inline"], false);
    assert_eq!(entry.0, 201);
    assert_eq!(entry.1["page"]["comments_enabled"], false);
    assert_eq!(comment.0, 400);

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(saved.is_array());
    assert_eq!(saved[0]["mood"], "tired");
    assert!(saved[0].get("id").is_none());
}

#[tokio::test]
async fn corrupt_document_makes_journal_read_only() {
    let tmp = TempDir::new().unwrap();
    let path = data_file(&tmp);
    std::fs::write(&path, "{ not json").unwrap();
    let (base, shutdown_tx) = start_server(&path, Variant::Extended).await;

    let (health, page, write) = blocking({
        let base = base.clone();
        move || {
            let health = get(format!("{base}/api/health"));
            let page = get(format!("{base}/api/page"));
            post(format!("{base}/api/mood/select"), json!({ "mood": "angry" }));
            let write = post(format!("{base}/api/entries"), json!({ "intensity": 4 }));
            (health, page, write)
        }
    })
    .await;

    assert_eq!(health.1["status"], "degraded");
    assert!(page.1["warning"].is_string());
    assert_eq!(write.0, 409);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");

    // Repairing the file by hand is picked up by the next health check
    std::fs::write(&path, r#"{ "mood_data": [], "comments": [] }"#).unwrap();
    let repaired = blocking({
        let base = base.clone();
        move || get(format!("{base}/api/health"))
    })
    .await;
    shutdown_tx.send(()).ok();

    assert_eq!(repaired.0, 200);
    assert_eq!(repaired.1["status"], "ok");
    assert!(repaired.1["warning"].is_null());
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() {
    let tmp = TempDir::new().unwrap();
    let path = data_file(&tmp);
    let (base, shutdown_tx) = start_server(&path, Variant::Extended).await;

    let (just_over_image, over_body_limit) = blocking({
        let base = base.clone();
        move || {
            let just_over_image = upload(
                format!("{base}/api/images"),
                "big.png",
                &vec![0u8; MAX_IMAGE_SIZE + 100],
            );
            let over_body_limit = upload(
                format!("{base}/api/images"),
                "big.png",
                &vec![0u8; MAX_IMAGE_SIZE + 8192],
            );
            (just_over_image, over_body_limit)
        }
    })
    .await;
    shutdown_tx.send(()).ok();

    assert_eq!(just_over_image.0, 413);
    assert_eq!(over_body_limit.0, 413);
    assert!(over_body_limit.1["error"]
        .as_str()
        .unwrap()
        .contains("maximum size"));
}

#[tokio::test]
async fn api_errors_keep_json_shape() {
    let tmp = TempDir::new().unwrap();
    let path = data_file(&tmp);
    let (base, shutdown_tx) = start_server(&path, Variant::Extended).await;

    let (unknown_get, unknown_post, page, string_intensity, fractional) = blocking({
        let base = base.clone();
        move || {
            let unknown_get = get(format!("{base}/api/entrys"));
            let unknown_post = post(format!("{base}/api/moods/select"), json!({ "mood": "sad" }));
            let page = read_response(ureq::get(&format!("{base}/history")).call());
            post(format!("{base}/api/mood/select"), json!({ "mood": "sad" }));
            let string_intensity =
                post(format!("{base}/api/entries"), json!({ "intensity": "7" }));
            let fractional = post(format!("{base}/api/entries"), json!({ "intensity": 7.5 }));
            (unknown_get, unknown_post, page, string_intensity, fractional)
        }
    })
    .await;
    shutdown_tx.send(()).ok();

    assert_eq!(unknown_get.0, 404);
    assert!(unknown_get.1["error"].is_string());
    assert_eq!(unknown_post.0, 404);
    assert!(unknown_post.1["error"].is_string());

    // Non-API paths still get the page
    assert_eq!(page.0, 200);

    assert_eq!(string_intensity.0, 422);
    assert!(string_intensity.1["error"].is_string());
    assert_eq!(fractional.0, 422);
    assert!(fractional.1["error"].is_string());
    assert!(!path.exists());
}
