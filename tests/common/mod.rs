#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::DbConn;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use time::{Duration, UtcOffset};
use tower::ServiceExt;

use stagedoor::api::auth::{issue_token, Authority};
use stagedoor::{router, AppState};

pub const SECRET: &str = "integration-secret";

pub struct TestApp {
    pub router: Router,
    pub db: DbConn,
}

pub async fn app() -> TestApp {
    app_with(Authority::local(SECRET)).await
}

pub async fn app_with(authority: Authority) -> TestApp {
    let db = base::database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let state = AppState {
        db: db.clone(),
        authority: Arc::new(authority),
        zone: UtcOffset::UTC,
    };
    TestApp {
        router: router(state),
        db,
    }
}

pub fn token(permissions: &[&str]) -> String {
    let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
    issue_token(SECRET, Some("tester"), &permissions, Duration::minutes(10)).unwrap()
}

/// Signs arbitrary claims with the test secret.
pub fn signed(claims: serde_json::Value) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn expires_in(minutes: i64) -> i64 {
    (time::OffsetDateTime::now_utc() + Duration::minutes(minutes)).unix_timestamp()
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn redirect(&self, request: Request<Body>) -> (StatusCode, Option<String>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        (response.status(), location)
    }

    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.send(request).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> (StatusCode, String) {
        self.send(form_request(uri, body)).await
    }
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}
