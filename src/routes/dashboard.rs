// SPDX-License-Identifier: MIT

//! Coach dashboard: roster counts and the active session, in one request.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}

#[derive(Serialize)]
struct DashboardResponse {
    number_of_athletes: i64,
    number_of_devices: i64,
    /// Date of the active session; `None` when no session is running or
    /// the session is undated.
    active_session: Option<NaiveDate>,
    session_active: bool,
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>> {
    let number_of_athletes = state.db.count_athletes(user.user_id).await?;
    let number_of_devices = state.db.count_devices(user.user_id).await?;
    let session = state.sessions.active(user.user_id).await?;

    Ok(Json(DashboardResponse {
        number_of_athletes,
        number_of_devices,
        active_session: session.as_ref().and_then(|s| s.date),
        session_active: session.is_some(),
    }))
}
