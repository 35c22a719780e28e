// SPDX-License-Identifier: MIT

//! Session lifecycle routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", post(start_session))
        .route("/session", delete(end_session))
}

#[derive(Deserialize)]
struct StartSessionRequest {
    date: Option<String>,
}

/// Start a training session, optionally dated.
async fn start_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<StartSessionRequest>,
) -> Result<StatusCode> {
    state
        .sessions
        .start(user.user_id, body.date.as_deref())
        .await?;
    Ok(StatusCode::CREATED)
}

/// End the caller's session. A no-op when no session is running.
async fn end_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<StatusCode> {
    state.sessions.end(user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
