//! Shared test utilities for integration tests.
//!
//! `TestApp` wires the router to in-memory storages so tests can drive real HTTP
//! requests through `tower::ServiceExt::oneshot` and inspect the backends afterwards.

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use cabinet_services::{
    AppState,
    catalog::MockCatalogStorage,
    config::Config,
    database::MockSqlStorage,
    routes,
    storage::MockFileStorage,
    users::{MockUserStorage, RecordingMailer, SessionResponse},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "hunter22";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: MockUserStorage,
    pub catalog: MockCatalogStorage,
    pub files: MockFileStorage,
    pub mailer: RecordingMailer,
    pub config: Config,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config::new_for_test();
        let users = MockUserStorage::new();
        let catalog = MockCatalogStorage::new();
        let files = MockFileStorage::new();
        let mailer = RecordingMailer::new();

        let state = AppState::new(
            MockSqlStorage::default(),
            users.clone(),
            catalog.clone(),
            files.clone(),
            Arc::new(mailer.clone()),
        );

        Self {
            router: routes(state, config.clone()),
            users,
            catalog,
            files,
            mailer,
            config,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn send_empty(&self, method: Method, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Signs up `email` with `TEST_PASSWORD` and returns the session.
    pub async fn sign_up(&self, email: &str) -> SessionResponse {
        let response = self
            .send_json(
                Method::POST,
                "/auth/sign-up",
                None,
                serde_json::json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        serde_json::from_slice(&response.body).expect("session body")
    }
}
