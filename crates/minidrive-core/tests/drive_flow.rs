//! End-to-end tests of `Drive` against an in-process stand-in for the
//! file-hosting service.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use minidrive_core::auth::{MemoryTokenStore, Page, Session, TOKEN_KEY};
use minidrive_core::drive::{Navigation, Operation, LIST_FAILED, LOGIN_REDIRECT_DELAY};
use minidrive_core::listing::FileListView;
use minidrive_core::{ApiClient, Drive, FileRecord, Notice};

const TOKEN: &str = "abc";

#[derive(Clone, Copy)]
enum DownloadMode {
    Binary(&'static [u8]),
    Link(&'static [u8]),
    /// Sends the first chunk, then the body fails.
    Truncated(&'static [u8]),
    Missing,
}

struct Mock {
    login: (StatusCode, Value),
    signup: (StatusCode, Value),
    upload: (StatusCode, Value),
    listing: Value,
    delete: (StatusCode, Value),
    download: DownloadMode,
    share: (StatusCode, Value),
    hits: Mutex<HashMap<&'static str, usize>>,
    uploads: Mutex<Vec<(Option<String>, Vec<u8>)>>,
    link_auth: Mutex<Vec<bool>>,
}

impl Default for Mock {
    fn default() -> Self {
        Self {
            login: (StatusCode::OK, json!({"token": TOKEN})),
            signup: (StatusCode::OK, json!({"message": "signup successful"})),
            upload: (StatusCode::OK, json!({"message": "File uploaded successfully!", "filename": "notes.txt"})),
            listing: json!({"files": [{"filename": "a.txt", "uploaded": "t1", "s3_key": "alice/a.txt"}]}),
            delete: (StatusCode::OK, json!({"message": "File deleted successfully"})),
            download: DownloadMode::Binary(b"file body"),
            share: (StatusCode::OK, json!({"share_url": "http://drive.test/public/tok123"})),
            hits: Mutex::new(HashMap::new()),
            uploads: Mutex::new(Vec::new()),
            link_auth: Mutex::new(Vec::new()),
        }
    }
}

impl Mock {
    fn hit(&self, route: &'static str) {
        *self.hits.lock().unwrap().entry(route).or_default() += 1;
    }

    fn hits(&self, route: &str) -> usize {
        self.hits.lock().unwrap().get(route).copied().unwrap_or(0)
    }

    fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

type Shared = Arc<Mock>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some("Bearer abc")
}

fn auth_required() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Auth required"}))).into_response()
}

async fn health(State(m): State<Shared>) -> &'static str {
    m.hit("health");
    "Mini Google Drive Backend is running!"
}

async fn login(State(m): State<Shared>, Json(body): Json<Value>) -> Response {
    m.hit("login");
    assert!(body.get("username").is_some() && body.get("password").is_some());
    (m.login.0, Json(m.login.1.clone())).into_response()
}

async fn signup(State(m): State<Shared>, Json(_body): Json<Value>) -> Response {
    m.hit("signup");
    (m.signup.0, Json(m.signup.1.clone())).into_response()
}

async fn upload(State(m): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    m.hit("upload");
    if !authorized(&headers) {
        return auth_required();
    }
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            let name = field.file_name().map(str::to_string);
            let data = field.bytes().await.unwrap().to_vec();
            m.uploads.lock().unwrap().push((name, data));
        }
    }
    (m.upload.0, Json(m.upload.1.clone())).into_response()
}

async fn files(State(m): State<Shared>, headers: HeaderMap) -> Response {
    m.hit("files");
    if !authorized(&headers) {
        return auth_required();
    }
    Json(m.listing.clone()).into_response()
}

async fn download(
    State(m): State<Shared>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Response {
    m.hit("download");
    if !authorized(&headers) {
        return auth_required();
    }
    match m.download {
        DownloadMode::Binary(body) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            body.to_vec(),
        )
            .into_response(),
        DownloadMode::Link(_) => {
            let host = headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({"url": format!("http://{}/blob/{}", host, name)})).into_response()
        }
        DownloadMode::Truncated(first) => {
            let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
                Ok(Bytes::from_static(first)),
                Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "storage went away",
                )),
            ];
            (
                [(header::CONTENT_TYPE, "application/octet-stream")],
                Body::from_stream(futures::stream::iter(chunks)),
            )
                .into_response()
        }
        DownloadMode::Missing => {
            (StatusCode::NOT_FOUND, Json(json!({"error": "file not found"}))).into_response()
        }
    }
}

async fn blob(State(m): State<Shared>, headers: HeaderMap) -> Response {
    m.hit("blob");
    m.link_auth
        .lock()
        .unwrap()
        .push(headers.contains_key(header::AUTHORIZATION));
    match m.download {
        DownloadMode::Link(body) => body.to_vec().into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn remove(State(m): State<Shared>, headers: HeaderMap, Path(_name): Path<String>) -> Response {
    m.hit("delete");
    if !authorized(&headers) {
        return auth_required();
    }
    (m.delete.0, Json(m.delete.1.clone())).into_response()
}

async fn share(State(m): State<Shared>, headers: HeaderMap, Path(_name): Path<String>) -> Response {
    m.hit("share");
    if !authorized(&headers) {
        return auth_required();
    }
    (m.share.0, Json(m.share.1.clone())).into_response()
}

async fn spawn(mock: Mock) -> (Shared, SocketAddr) {
    let mock = Arc::new(mock);
    let app = Router::new()
        .route("/", get(health))
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/upload", post(upload))
        .route("/files", get(files))
        .route("/download/{name}", get(download))
        .route("/blob/{name}", get(blob))
        .route("/delete/{name}", delete(remove))
        .route("/share/{name}", post(share))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (mock, addr)
}

struct Harness {
    mock: Shared,
    drive: Drive,
    downloads: TempDir,
}

async fn harness(mock: Mock, token: Option<&str>) -> Harness {
    let (mock, addr) = spawn(mock).await;
    let api = ApiClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let store = match token {
        Some(t) => MemoryTokenStore::with_token(TOKEN_KEY, t),
        None => MemoryTokenStore::default(),
    };
    let session = Arc::new(Session::open(Box::new(store)).unwrap());
    let downloads = TempDir::new().unwrap();
    let drive = Drive::new(api, session, downloads.path().to_path_buf());
    Harness {
        mock,
        drive,
        downloads,
    }
}

fn dir_entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// -------------------------------------------------------------------------
// Auth
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_login_stores_token_and_redirects() {
    let h = harness(Mock::default(), None).await;
    let outcome = h.drive.login(" alice ", "secret").await;

    assert!(outcome.is_success());
    assert_eq!(h.drive.session().token().as_deref(), Some("abc"));
    assert_eq!(
        outcome.navigation,
        Some(Navigation::After(Page::Upload, LOGIN_REDIRECT_DELAY))
    );
    assert_eq!(outcome.notices, vec![Notice::success("Login successful — redirecting...")]);
    assert_eq!(outcome.signed_in_as.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_login_without_token_field_fails() {
    let mock = Mock {
        login: (StatusCode::OK, json!({"message": "welcome"})),
        ..Mock::default()
    };
    let h = harness(mock, None).await;
    let outcome = h.drive.login("alice", "secret").await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.notices, vec![Notice::error("Login failed")]);
    assert!(h.drive.session().token().is_none());
    assert!(outcome.navigation.is_none());
    assert!(outcome.signed_in_as.is_none());
}

#[tokio::test]
async fn test_login_rejection_shows_server_message() {
    let mock = Mock {
        login: (StatusCode::UNAUTHORIZED, json!({"error": "invalid credentials"})),
        ..Mock::default()
    };
    let h = harness(mock, None).await;
    let outcome = h.drive.login("alice", "wrong").await;
    assert_eq!(outcome.notices, vec![Notice::error("invalid credentials")]);
    assert!(!h.drive.is_authenticated());
}

#[tokio::test]
async fn test_login_with_blank_field_sends_nothing() {
    let h = harness(Mock::default(), None).await;
    let outcome = h.drive.login("alice", "   ").await;
    assert_eq!(
        outcome.notices,
        vec![Notice::error("Please enter both username and password.")]
    );
    assert_eq!(h.mock.total_hits(), 0);
}

#[tokio::test]
async fn test_signup_does_not_store_token() {
    let mock = Mock {
        signup: (StatusCode::OK, json!({"message": "signup successful", "token": "sneaky"})),
        ..Mock::default()
    };
    let h = harness(mock, None).await;
    let outcome = h.drive.signup("bob", "pw").await;
    assert_eq!(
        outcome.notices,
        vec![Notice::success("Signup successful — you can now login.")]
    );
    assert!(!h.drive.is_authenticated());
    assert!(outcome.navigation.is_none());
}

#[tokio::test]
async fn test_signup_conflict() {
    let mock = Mock {
        signup: (StatusCode::CONFLICT, json!({"error": "username exists"})),
        ..Mock::default()
    };
    let h = harness(mock, None).await;
    let outcome = h.drive.signup("bob", "pw").await;
    assert_eq!(outcome.notices, vec![Notice::error("username exists")]);
}

#[tokio::test]
async fn test_logout_makes_no_request() {
    let h = harness(Mock::default(), Some(TOKEN)).await;
    let outcome = h.drive.logout();
    assert!(!h.drive.is_authenticated());
    assert_eq!(outcome.navigation, Some(Navigation::Now(Page::Login)));
    assert_eq!(h.mock.total_hits(), 0);
}

#[tokio::test]
async fn test_health() {
    let h = harness(Mock::default(), None).await;
    assert!(h.drive.health().await);
    assert_eq!(h.mock.hits("health"), 1);
}

// -------------------------------------------------------------------------
// Listing
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_refresh_renders_one_row() {
    let h = harness(Mock::default(), Some(TOKEN)).await;
    let outcome = h.drive.refresh().await;
    let records = outcome.listing.expect("listing ran").expect("listing ok");
    assert_eq!(records, vec![FileRecord::new("a.txt", "t1")]);

    let mut view = FileListView::new();
    view.replace(&records);
    assert_eq!(view.len(), 1);
    assert_eq!(view.rows()[0].filename, "a.txt");
}

#[tokio::test]
async fn test_refresh_rejects_missing_files_field() {
    let mock = Mock {
        listing: json!({}),
        ..Mock::default()
    };
    let h = harness(mock, Some(TOKEN)).await;

    let mut view = FileListView::new();
    view.replace(&[FileRecord::new("old.txt", "t0")]);

    let outcome = h.drive.refresh().await;
    assert_eq!(outcome.operation, Operation::List);
    assert_eq!(outcome.notices, vec![Notice::error(LIST_FAILED)]);
    match outcome.listing {
        Some(Err(_)) => {}
        other => panic!("expected listing error, got {:?}", other),
    }
    // Nothing was rendered over the previous rows
    assert_eq!(view.rows()[0].filename, "old.txt");
}

#[tokio::test]
async fn test_refresh_without_token_is_rejected_by_server() {
    let h = harness(Mock::default(), None).await;
    let outcome = h.drive.refresh().await;
    assert!(matches!(outcome.listing, Some(Err(_))));
    assert_eq!(h.mock.hits("files"), 1);
}

// -------------------------------------------------------------------------
// Mutations
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_delete_success_refreshes_once() {
    let h = harness(Mock::default(), Some(TOKEN)).await;
    let outcome = h.drive.delete("a.txt").await;
    assert_eq!(outcome.notices, vec![Notice::success("File deleted.")]);
    assert!(matches!(outcome.listing, Some(Ok(_))));
    assert_eq!(h.mock.hits("delete"), 1);
    assert_eq!(h.mock.hits("files"), 1);
}

#[tokio::test]
async fn test_delete_failure_does_not_refresh() {
    let mock = Mock {
        delete: (StatusCode::NOT_FOUND, json!({"error": "file not found"})),
        ..Mock::default()
    };
    let h = harness(mock, Some(TOKEN)).await;
    let outcome = h.drive.delete("ghost.txt").await;
    assert_eq!(outcome.notices, vec![Notice::error("file not found")]);
    assert!(outcome.listing.is_none());
    assert_eq!(h.mock.hits("files"), 0);
}

#[tokio::test]
async fn test_delete_failure_without_message_uses_fallback() {
    let mock = Mock {
        delete: (StatusCode::INTERNAL_SERVER_ERROR, json!({})),
        ..Mock::default()
    };
    let h = harness(mock, Some(TOKEN)).await;
    let outcome = h.drive.delete("a.txt").await;
    assert_eq!(outcome.notices, vec![Notice::error("Delete failed.")]);
}

#[tokio::test]
async fn test_upload_sends_multipart_and_refreshes_once() {
    let h = harness(Mock::default(), Some(TOKEN)).await;
    let src = TempDir::new().unwrap();
    let path = src.path().join("notes.txt");
    std::fs::write(&path, b"remember the milk").unwrap();

    let outcome = h.drive.upload(path.to_str().unwrap()).await;
    assert_eq!(outcome.notices, vec![Notice::success("File uploaded successfully.")]);
    assert!(matches!(outcome.listing, Some(Ok(_))));
    assert_eq!(h.mock.hits("files"), 1);

    let uploads = h.mock.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0.as_deref(), Some("notes.txt"));
    assert_eq!(uploads[0].1, b"remember the milk");
}

#[tokio::test]
async fn test_upload_failure_shows_server_error() {
    let mock = Mock {
        upload: (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "S3 upload failed: boom"})),
        ..Mock::default()
    };
    let h = harness(mock, Some(TOKEN)).await;
    let src = TempDir::new().unwrap();
    let path = src.path().join("notes.txt");
    std::fs::write(&path, b"x").unwrap();

    let outcome = h.drive.upload(path.to_str().unwrap()).await;
    assert_eq!(outcome.notices, vec![Notice::error("S3 upload failed: boom")]);
    assert!(outcome.listing.is_none());
    assert_eq!(h.mock.hits("files"), 0);
}

// -------------------------------------------------------------------------
// Download & share
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_download_binary_leaves_only_file() {
    let h = harness(Mock::default(), Some(TOKEN)).await;
    let outcome = h.drive.download("a.txt").await;
    assert!(outcome.is_success());

    let saved = outcome.saved_to.expect("saved path");
    assert_eq!(saved, h.downloads.path().join("a.txt"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"file body");
    assert_eq!(dir_entries(h.downloads.path()), ["a.txt"]);
}

#[tokio::test]
async fn test_download_follows_link_without_bearer() {
    let mock = Mock {
        download: DownloadMode::Link(b"from storage"),
        ..Mock::default()
    };
    let h = harness(mock, Some(TOKEN)).await;
    let outcome = h.drive.download("report.pdf").await;
    assert!(outcome.is_success(), "{:?}", outcome.notices);

    assert_eq!(
        std::fs::read(h.downloads.path().join("report.pdf")).unwrap(),
        b"from storage"
    );
    assert_eq!(h.mock.hits("blob"), 1);
    assert_eq!(*h.mock.link_auth.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn test_download_interrupted_leaves_no_partial_file() {
    let mock = Mock {
        download: DownloadMode::Truncated(b"first half of the file"),
        ..Mock::default()
    };
    let h = harness(mock, Some(TOKEN)).await;
    let outcome = h.drive.download("big.bin").await;

    assert!(!outcome.is_success());
    assert!(outcome.saved_to.is_none());
    assert_eq!(outcome.notices.len(), 1);
    assert!(
        outcome.notices[0].text.starts_with("Network error:"),
        "{:?}",
        outcome.notices
    );
    assert!(dir_entries(h.downloads.path()).is_empty());
}

#[tokio::test]
async fn test_download_missing_file() {
    let mock = Mock {
        download: DownloadMode::Missing,
        ..Mock::default()
    };
    let h = harness(mock, Some(TOKEN)).await;
    let outcome = h.drive.download("ghost.txt").await;
    assert_eq!(outcome.notices, vec![Notice::error("file not found")]);
    assert!(outcome.saved_to.is_none());
    assert!(dir_entries(h.downloads.path()).is_empty());
}

#[tokio::test]
async fn test_share_returns_link() {
    let h = harness(Mock::default(), Some(TOKEN)).await;
    let outcome = h.drive.share("a.txt").await;
    let link = outcome.share.expect("share link");
    assert_eq!(link.filename, "a.txt");
    assert_eq!(link.url, "http://drive.test/public/tok123");
    assert!(outcome.notices.is_empty());
}

#[tokio::test]
async fn test_share_without_url_fails() {
    let mock = Mock {
        share: (StatusCode::OK, json!({})),
        ..Mock::default()
    };
    let h = harness(mock, Some(TOKEN)).await;
    let outcome = h.drive.share("a.txt").await;
    assert!(outcome.share.is_none());
    assert_eq!(outcome.notices, vec![Notice::error("Failed to generate share link.")]);
}
