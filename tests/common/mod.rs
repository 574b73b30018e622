//! Shared helpers for router-level tests: an app over the in-memory store
//! with a temporary upload directory, and request builders that carry the
//! session cookie.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use blogpost_api::{
    app::build_app, config::AppConfig, state::AppState, storage::LocalStorage,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

pub struct TestApp {
    pub app: Router,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().expect("temp upload dir");
        let config = AppConfig::for_tests(uploads.path());
        let storage = Arc::new(LocalStorage::new(
            &config.uploads.dir,
            &config.uploads.public_base_url,
        ));
        let state = AppState::in_memory(Arc::new(config), storage);
        let app = build_app(state).expect("router builds");
        Self { app, uploads }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.expect("infallible")
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.json(
            "POST",
            "/api/register",
            None,
            Some(json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": email,
                "phone": "555-0100",
                "password": password,
            })),
        )
        .await
    }

    /// Registers and logs in; returns the `Cookie` header value.
    pub async fn login_new_user(&self, email: &str) -> String {
        let (status, _) = self.register(email, "password123").await;
        assert_eq!(status, StatusCode::OK);
        let response = self
            .send(login_request(email, "password123"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).expect("login sets cookie")
    }

    pub async fn create_post(&self, cookie: &str, title: &str) {
        let (status, body) = self
            .json(
                "POST",
                "/api/post",
                Some(cookie),
                Some(json!({ "title": title, "desc": "body" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
}

pub fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap()
}

/// `jwt=<token>` taken from the response's `Set-Cookie`, if any.
pub fn session_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("jwt="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }
}

/// Single-part multipart body for the `image` field.
pub fn multipart_request(
    cookie: &str,
    field: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let boundary = "X-TEST-BOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload-image")
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}
