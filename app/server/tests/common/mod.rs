//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for the HTTP integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use rusqlite::Connection;
use serde_json::Value as Json;
use tempfile::TempDir;
use tower::ServiceExt;
use viewer_lib::{build_router, create_app_state, AppState, ServerConfig};

const BOUNDARY: &str = "----dbviewer-test-boundary";

/// Test harness owning a temporary datasets folder and a router over it.
pub struct TestHarness {
    pub dir: TempDir,
    pub state: Arc<AppState>,
}

impl TestHarness {
    /// Harness over an empty datasets folder.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Harness whose folder is seeded before the state is created.
    pub fn with_sample_data() -> Self {
        Self::with_seed(PeopleFixture::write_all, |_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        Self::with_seed(|_| {}, adjust)
    }

    pub fn with_seed(
        seed: impl FnOnce(&std::path::Path),
        adjust: impl FnOnce(&mut ServerConfig),
    ) -> Self {
        let dir = TempDir::new().unwrap();
        seed(dir.path());

        let mut config = ServerConfig {
            databases_dir: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };
        adjust(&mut config);

        let state = Arc::new(create_app_state(config).unwrap());
        TestHarness { dir, state }
    }

    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state))
    }

    /// Sends a GET and decodes the JSON body.
    pub async fn get(&self, uri: &str) -> (StatusCode, Json) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Uploads `contents` as `filename` in multipart field `field`.
    pub async fn upload_as(&self, field: &str, filename: &str, contents: &[u8]) -> (StatusCode, Json) {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/database/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn upload(&self, filename: &str, contents: &[u8]) -> (StatusCode, Json) {
        self.upload_as("db", filename, contents).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Json) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
        (status, json)
    }
}

/// A small census: people with a city and an age.
pub struct PeopleFixture;

impl PeopleFixture {
    pub fn data() -> Vec<(&'static str, Option<&'static str>, Option<i64>)> {
        vec![
            ("ann", Some("Oslo"), Some(30)),
            ("bob", Some("Oslo"), None),
            ("cid", Some("Rome"), Some(40)),
            ("dee", Some("Oslo"), Some(20)),
            ("eve", None, Some(99)),
            ("fay", Some("Rome"), Some(50)),
            ("gus", Some("Lima"), None),
        ]
    }

    pub fn write_sqlite(dir: &std::path::Path) {
        let conn = Connection::open(dir.join("people.db")).unwrap();
        conn.execute_batch(
            "CREATE TABLE person (name TEXT, city TEXT, age INTEGER);
             CREATE TABLE empty (city TEXT, age INTEGER);",
        )
        .unwrap();
        for (name, city, age) in Self::data() {
            conn.execute(
                "INSERT INTO person (name, city, age) VALUES (?1, ?2, ?3)",
                rusqlite::params![name, city, age],
            )
            .unwrap();
        }
    }

    pub fn write_csv(dir: &std::path::Path) {
        let mut csv = String::from("name,city,age\n");
        for (name, city, age) in Self::data() {
            csv.push_str(&format!(
                "{},{},{}\n",
                name,
                city.unwrap_or(""),
                age.map(|a| a.to_string()).unwrap_or_default()
            ));
        }
        std::fs::write(dir.join("people.csv"), csv).unwrap();
    }

    pub fn write_all(dir: &std::path::Path) {
        Self::write_sqlite(dir);
        Self::write_csv(dir);
    }
}
