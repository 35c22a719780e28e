// SPDX-License-Identifier: MIT

//! Device roster routes. Pairing status appears in the listing but is never
//! writable here.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Device, PrimaryKey};
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
        .route("/device", get(list_devices).post(register_device).put(update_device))
        .route("/device/{id}", delete(delete_device))
}

#[derive(Deserialize)]
struct RegisterDeviceRequest {
    serial_number: String,
}

async fn register_device(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<RegisterDeviceRequest>,
) -> Result<(StatusCode, Json<Device>)> {
    let device = state
        .devices
        .register(user.user_id, &body.serial_number)
        .await?;
    Ok((StatusCode::CREATED, Json(device)))
}

#[derive(Serialize)]
struct DeviceListResponse {
    devices: Vec<Device>,
}

async fn list_devices(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeviceListResponse>> {
    let devices = state.devices.list(user.user_id).await?;
    Ok(Json(DeviceListResponse { devices }))
}

#[derive(Deserialize)]
struct UpdateDeviceRequest {
    id: PrimaryKey,
    color: String,
}

async fn update_device(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdateDeviceRequest>,
) -> Result<StatusCode> {
    state
        .devices
        .update_color(user.user_id, body.id, &body.color)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_device(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(device_id): Path<PrimaryKey>,
) -> Result<StatusCode> {
    state.devices.remove(user.user_id, device_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
