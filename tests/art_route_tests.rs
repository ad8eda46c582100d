use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use pixel_pantry::artwork::{ArtworkStore, encode_png_data_url};
use pixel_pantry::config::Config;
use pixel_pantry::server::router::{PantryState, pantry_router};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x06\x00\x00\x00\x1f\x15\xc4\x89";
const BOUNDARY: &str = "pantry-test-boundary";

static NEXT: AtomicUsize = AtomicUsize::new(0);

struct TestApp {
    app: Router,
    store: ArtworkStore,
    db_path: PathBuf,
    art_dir: PathBuf,
}

impl TestApp {
    async fn new(label: &str) -> Self {
        Self::with_config(label, Config::default()).await
    }

    async fn with_config(label: &str, cfg: Config) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let base = format!(
            "pantry-route-{label}-{}-{nanos}-{}",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        );

        let tmp_dir = std::env::temp_dir();
        let db_path = tmp_dir.join(format!("{base}.sqlite"));
        let art_dir = tmp_dir.join(format!("{base}-art"));

        let database_url = format!("sqlite:{}", db_path.display());
        let db = pixel_pantry::db::spawn(&database_url)
            .await
            .expect("failed to spawn DbActor");
        let store = ArtworkStore::open(db, &art_dir)
            .await
            .expect("failed to open artwork store");

        let app = pantry_router(PantryState::new(store.clone()), &cfg);

        Self {
            app,
            store,
            db_path,
            art_dir,
        }
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let resp = self.app.clone().oneshot(req).await.expect("request failed");
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        (status, headers, body.to_vec())
    }

    async fn cleanup(self) {
        let _ = self.store.db().shutdown().await;
        let wal_path = PathBuf::from(format!("{}-wal", self.db_path.to_string_lossy()));
        let shm_path = PathBuf::from(format!("{}-shm", self.db_path.to_string_lossy()));
        let _ = tokio::fs::remove_file(&wal_path).await;
        let _ = tokio::fs::remove_file(&shm_path).await;
        let _ = tokio::fs::remove_file(&self.db_path).await;
        let _ = tokio::fs::remove_dir_all(&self.art_dir).await;
    }
}

fn percent_encode(s: &str) -> String {
    s.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"-_.~".contains(&b) {
                (b as char).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect()
}

fn urlencoded_save(data_url: &str, width: &str, height: &str) -> Request<Body> {
    let body = format!(
        "data_url={}&width={}&height={}",
        percent_encode(data_url),
        percent_encode(width),
        percent_encode(height)
    );
    Request::builder()
        .method("POST")
        .uri("/api/save")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("failed to build request")
}

fn multipart_save(data_url: &str, width: &str, height: &str) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in [("data_url", data_url), ("width", width), ("height", height)] {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/api/save")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("failed to build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("response body was not JSON")
}

#[tokio::test]
async fn save_list_fetch_delete_flow() {
    let t = TestApp::new("flow").await;
    let data_url = encode_png_data_url(PNG_BYTES);

    // 1) save -> 200 with record + url
    let (status, _, body) = t.send(urlencoded_save(&data_url, "1", "1")).await;
    assert_eq!(status, StatusCode::OK);
    let saved = json(&body);
    assert_eq!(saved["id"], 1);
    assert_eq!(saved["width"], 1);
    assert_eq!(saved["height"], 1);
    assert_eq!(saved["url"], "/api/art/1");
    let filename = saved["filename"].as_str().expect("filename");
    assert!(filename.starts_with("art_") && filename.ends_with(".png"));
    assert!(saved["created_at"].as_str().is_some());

    // 2) list -> [that artwork]
    let (status, _, body) = t.send(get("/api/art?limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    let listed = json(&body);
    let listed = listed.as_array().expect("array");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], saved);

    // 3) fetch -> original bytes as image/png
    let (status, headers, body) = t.send(get("/api/art/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(body, PNG_BYTES);

    // 4) delete -> {"deleted": true}
    let (status, _, body) = t.send(delete("/api/art/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({ "deleted": true }));

    // 5) fetch / delete again -> 404
    let (status, _, body) = t.send(get("/api/art/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"]["code"], "NOT_FOUND");

    let (status, _, _) = t.send(delete("/api/art/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = t.send(get("/api/art")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!([]));

    t.cleanup().await;
}

#[tokio::test]
async fn save_accepts_multipart_form_data() {
    let t = TestApp::new("multipart").await;

    let (status, _, body) = t
        .send(multipart_save(&encode_png_data_url(PNG_BYTES), "64", "32"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let saved = json(&body);
    assert_eq!(saved["width"], 64);
    assert_eq!(saved["height"], 32);

    let id = saved["id"].as_i64().expect("id");
    assert_eq!(t.store.get(id).await.unwrap(), PNG_BYTES);

    t.cleanup().await;
}

#[tokio::test]
async fn save_rejects_bad_payloads() {
    let t = TestApp::new("reject").await;

    let cases = [
        (
            urlencoded_save("data:image/gif;base64,R0lGODlh", "1", "1"),
            "UNSUPPORTED_FORMAT",
        ),
        (
            urlencoded_save("data:image/png;base64,***", "1", "1"),
            "INVALID_ENCODING",
        ),
        (
            urlencoded_save("data:image/png;base64,", "1", "1"),
            "EMPTY_IMAGE",
        ),
        (
            urlencoded_save(&encode_png_data_url(PNG_BYTES), "wide", "1"),
            "INVALID_FORM",
        ),
        (
            Request::builder()
                .method("POST")
                .uri("/api/save")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("width=1&height=1"))
                .expect("failed to build request"),
            "INVALID_FORM",
        ),
    ];

    for (req, code) in cases {
        let (status, _, body) = t.send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "expected 400 for {code}");
        assert_eq!(json(&body)["error"]["code"], code);
    }

    let (_, _, body) = t.send(get("/api/art")).await;
    assert_eq!(json(&body), serde_json::json!([]));

    t.cleanup().await;
}

#[tokio::test]
async fn list_limit_and_path_validation() {
    let t = TestApp::new("validation").await;
    let data_url = encode_png_data_url(PNG_BYTES);
    for _ in 0..3 {
        let (status, _, _) = t.send(urlencoded_save(&data_url, "2", "2")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _, body) = t.send(get("/api/art?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = json(&body)
        .as_array()
        .expect("array")
        .iter()
        .map(|a| a["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(ids, vec![3, 2]);

    for uri in ["/api/art?limit=0", "/api/art?limit=-1", "/api/art?limit=many"] {
        let (status, _, body) = t.send(get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json(&body)["error"]["code"], "INVALID_LIMIT");
    }

    let (status, _, body) = t.send(get("/api/art/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"]["code"], "INVALID_ID");

    let (status, _, body) = t.send(get("/api/art/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"]["code"], "NOT_FOUND");

    t.cleanup().await;
}

#[tokio::test]
async fn fetch_reports_missing_file_and_delete_still_succeeds() {
    let t = TestApp::new("missing").await;

    let artwork = t
        .store
        .create(&encode_png_data_url(PNG_BYTES), 4, 4)
        .await
        .unwrap();
    tokio::fs::remove_file(t.art_dir.join(&artwork.filename))
        .await
        .unwrap();

    let uri = format!("/api/art/{}", artwork.id);
    let (status, _, body) = t.send(get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"]["code"], "FILE_MISSING");

    let (status, _, body) = t.send(delete(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["deleted"], true);
    assert!(t.store.list(None).await.unwrap().is_empty());

    t.cleanup().await;
}

#[tokio::test]
async fn health_fallback_and_ambient_headers() {
    let t = TestApp::new("health").await;

    let (status, headers, body) = t.send(get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["message"], "Pixel Pantry API running");
    // Generated ids are 12 random bytes in unpadded base64url.
    assert_eq!(headers["x-request-id"].len(), 16);

    let (status, _, body) = t.send(get("/definitely/not/here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"]["code"], "NOT_FOUND");

    // Client-supplied request ids are echoed back.
    let (_, headers, _) = t
        .send(
            Request::builder()
                .method("GET")
                .uri("/api/health")
                .header("x-request-id", "req-123")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await;
    assert_eq!(headers["x-request-id"], "req-123");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    t.cleanup().await;
}

#[tokio::test]
async fn oversized_uploads_are_rejected_with_413() {
    let mut cfg = Config::default();
    cfg.storage.max_upload_bytes = 64;
    let t = TestApp::with_config("oversized", cfg).await;

    // Both bodies are well past 64 bytes.
    let data_url = encode_png_data_url(&[0u8; 150]);

    let (status, _, body) = t.send(urlencoded_save(&data_url, "1", "1")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json(&body)["error"]["code"], "PAYLOAD_TOO_LARGE");

    let (status, _, body) = t.send(multipart_save(&data_url, "1", "1")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json(&body)["error"]["code"], "PAYLOAD_TOO_LARGE");

    assert!(t.store.list(None).await.unwrap().is_empty());

    t.cleanup().await;
}

#[tokio::test]
async fn unsupported_method_returns_json_405() {
    let t = TestApp::new("method").await;

    let (status, _, body) = t
        .send(
            Request::builder()
                .method("PUT")
                .uri("/api/art/1")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json(&body)["error"]["code"], "METHOD_NOT_ALLOWED");

    let (status, _, body) = t.send(get("/api/save")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json(&body)["error"]["code"], "METHOD_NOT_ALLOWED");

    t.cleanup().await;
}
