// SPDX-License-Identifier: MIT

//! Test result routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{PrimaryKey, SessionResult, TestResult};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/test", post(record_result))
        .route("/test/athlete/{id}", get(results_for_athlete))
        .route("/test/session/{date}", get(results_for_session))
        .route("/test/{id}", delete(delete_result))
}

#[derive(Deserialize)]
struct RecordResultRequest {
    athlete_id: PrimaryKey,
    result_data: serde_json::Value,
}

/// Record a result for a supervised athlete under the active session.
async fn record_result(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<RecordResultRequest>,
) -> Result<StatusCode> {
    state
        .results
        .record(user.user_id, body.athlete_id, body.result_data)
        .await?;
    Ok(StatusCode::CREATED)
}

#[derive(Serialize)]
struct AthleteResultsResponse {
    athlete_name: String,
    results: Vec<TestResult>,
}

async fn results_for_athlete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(athlete_id): Path<PrimaryKey>,
) -> Result<Json<AthleteResultsResponse>> {
    let (athlete_name, results) = state
        .results
        .list_for_athlete(user.user_id, athlete_id)
        .await?;
    Ok(Json(AthleteResultsResponse {
        athlete_name,
        results,
    }))
}

#[derive(Serialize)]
struct SessionResultsResponse {
    session: String,
    results: Vec<SessionResult>,
}

async fn results_for_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<Json<SessionResultsResponse>> {
    let results = state.results.list_for_session(user.user_id, &date).await?;
    Ok(Json(SessionResultsResponse {
        session: date,
        results,
    }))
}

async fn delete_result(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(result_id): Path<PrimaryKey>,
) -> Result<StatusCode> {
    state.results.remove(user.user_id, result_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
