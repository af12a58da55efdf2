pub mod fixtures;
pub mod pdf_assertions;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wayfare::itinerary::EmailTemplates;
use wayfare::{AppState, Config, api};
use wayfare_mail::{DEFAULT_FROM, MemoryMailer};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A router backed by an in-memory mailer and no backend.
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<MemoryMailer>,
}

pub fn test_config(extra_toml: &str) -> Config {
    let toml = format!("[mail]\ntransport = \"log\"\n\n{}", extra_toml);
    Config::from_toml_str(&toml).expect("test config should parse")
}

pub fn test_app() -> TestApp {
    test_app_with(test_config(""), MemoryMailer::new(DEFAULT_FROM).unwrap())
}

pub fn test_app_with(config: Config, mailer: MemoryMailer) -> TestApp {
    let mailer = Arc::new(mailer);
    let state = AppState::new(config, mailer.clone(), None, EmailTemplates::new().unwrap());
    TestApp {
        router: api::router(state),
        mailer,
    }
}

/// Response parts collected from a single `oneshot` call.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub async fn call(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.call(json_request(Method::POST, uri, &body)).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.call(
            Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
