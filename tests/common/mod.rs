// SPDX-License-Identifier: MIT

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use coachbench::config::Config;
use coachbench::db::{MemoryDatabase, SharedDatabase};
use coachbench::routes::create_router;
use coachbench::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt; // for oneshot

/// Create a test app over the in-memory gateway.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let config = Config::test_default();
    let db: SharedDatabase = Arc::new(MemoryDatabase::new());
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// Mint a valid JWT for the given user against the test signing key.
#[allow(dead_code)]
pub fn auth_token(state: &AppState, user_id: i64) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&state.config.jwt_signing_key),
    )
    .unwrap()
}

/// Issue one authenticated request against the router.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Response {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register an athlete through the API and return its id.
#[allow(dead_code)]
pub async fn seed_athlete(app: &Router, token: &str, name: &str) -> i64 {
    let response = send(
        app,
        "POST",
        "/athlete",
        token,
        Some(serde_json::json!({ "name": name })),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Register a device through the API and return its id.
#[allow(dead_code)]
pub async fn seed_device(app: &Router, token: &str, serial: &str) -> i64 {
    let response = send(
        app,
        "POST",
        "/device",
        token,
        Some(serde_json::json!({ "serial_number": serial })),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Start a session through the API.
#[allow(dead_code)]
pub async fn start_session(app: &Router, token: &str, date: Option<&str>) {
    let body = match date {
        Some(date) => serde_json::json!({ "date": date }),
        None => serde_json::json!({}),
    };
    let response = send(app, "POST", "/session", token, Some(body)).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
}
