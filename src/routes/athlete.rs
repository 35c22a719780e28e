// SPDX-License-Identifier: MIT

//! Athlete roster routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Athlete, PrimaryKey};
use crate::services::AthleteAttributes;
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
        .route(
            "/athlete",
            get(list_athletes).post(register_athlete).put(update_athlete),
        )
        .route("/athlete/{id}", delete(delete_athlete))
}

#[derive(Deserialize, Default)]
struct AthleteRequest {
    id: Option<PrimaryKey>,
    name: Option<String>,
    birthdate: Option<String>,
    age: Option<i32>,
    gender: Option<String>,
    height: Option<f64>,
    weight: Option<f64>,
    team: Option<String>,
}

impl From<AthleteRequest> for AthleteAttributes {
    fn from(body: AthleteRequest) -> Self {
        AthleteAttributes {
            name: body.name,
            birthdate: body.birthdate,
            age: body.age,
            gender: body.gender,
            height: body.height,
            weight: body.weight,
            team: body.team,
        }
    }
}

async fn register_athlete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AthleteRequest>,
) -> Result<(StatusCode, Json<Athlete>)> {
    let athlete = state.roster.register(user.user_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(athlete)))
}

#[derive(Serialize)]
struct AthleteListResponse {
    athletes: Vec<Athlete>,
}

async fn list_athletes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AthleteListResponse>> {
    let athletes = state.roster.list(user.user_id).await?;
    Ok(Json(AthleteListResponse { athletes }))
}

async fn update_athlete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AthleteRequest>,
) -> Result<StatusCode> {
    let athlete_id = body
        .id
        .ok_or_else(|| crate::error::AppError::Validation("Athlete id is required".to_string()))?;
    state
        .roster
        .update(user.user_id, athlete_id, body.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_athlete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(athlete_id): Path<PrimaryKey>,
) -> Result<StatusCode> {
    state.roster.remove(user.user_id, athlete_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
