#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use lexilist_backend::config::Config;
use lexilist_backend::db::Database;
use lexilist_backend::services::email_provider::EmailService;
use lexilist_backend::state::AppState;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub email: Arc<EmailService>,
    _dir: TempDir,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(|_| {}).await
}

pub async fn create_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexilist.db");

    let mut config = Config::for_database(&path);
    config.jwt_secret = Some("test-secret".to_string());
    configure(&mut config);

    let db = Database::open(&path, 5).await.unwrap();
    let state = AppState::new(config, db, EmailService::mock());
    let email = state.email_service();

    TestApp {
        router: lexilist_backend::build_app(state.clone()),
        state,
        email,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Runs raw SQL against the app's database, e.g. to install a failing trigger.
    pub async fn execute_sql(&self, sql: &str) {
        sqlx::query(sql).execute(self.state.db().pool()).await.unwrap();
    }

    /// Registers a user and returns its bearer token.
    pub async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                serde_json::json!({
                    "email": email,
                    "password": "secret123",
                    "displayName": "Tester",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Creates a list with the given `(word, meaning)` pairs and returns its id.
    pub async fn seed_list(&self, token: &str, name: &str, words: &[(&str, &str)]) -> String {
        let (status, body) = self
            .post("/api/lists", Some(token), serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create list failed: {body}");
        let list_id = body["data"]["id"].as_str().unwrap().to_string();

        for (word, meaning) in words {
            let (status, body) = self
                .post(
                    &format!("/api/lists/{list_id}/words"),
                    Some(token),
                    serde_json::json!({ "word": word, "meaning": meaning }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "create word failed: {body}");
        }
        list_id
    }
}
