// SPDX-License-Identifier: MIT

//! Pairing routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{PairedAthlete, PrimaryKey};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pair", get(list_pairs).post(create_pair).put(update_pair))
        .route("/pair/{id}", delete(delete_pair))
}

#[derive(Deserialize)]
struct CreatePairRequest {
    athlete_id: PrimaryKey,
    device_id: PrimaryKey,
}

/// Pair an athlete to a device for the caller's active session.
async fn create_pair(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreatePairRequest>,
) -> Result<StatusCode> {
    state
        .pairing
        .create(user.user_id, body.athlete_id, body.device_id)
        .await?;
    Ok(StatusCode::CREATED)
}

#[derive(Serialize)]
struct PairListResponse {
    pairs: Vec<PairedAthlete>,
}

async fn list_pairs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PairListResponse>> {
    let pairs = state.pairing.list(user.user_id).await?;
    Ok(Json(PairListResponse { pairs }))
}

#[derive(Deserialize)]
struct UpdatePairRequest {
    pair_id: PrimaryKey,
    athlete_id: PrimaryKey,
}

/// Reassign the athlete on an existing pair.
async fn update_pair(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdatePairRequest>,
) -> Result<StatusCode> {
    state
        .pairing
        .reassign(user.user_id, body.pair_id, body.athlete_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_pair(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(pair_id): Path<PrimaryKey>,
) -> Result<StatusCode> {
    state.pairing.remove(user.user_id, pair_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
