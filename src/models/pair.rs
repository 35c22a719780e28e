// SPDX-License-Identifier: MIT

//! Athlete-device pairing model.

use crate::models::PrimaryKey;
use serde::Serialize;

/// A temporary binding of one athlete to one device, valid only within a
/// session's lifetime. A given device carries at most one live pair.
#[derive(Debug, Clone, Serialize)]
pub struct Pair {
    pub id: PrimaryKey,
    pub user_id: PrimaryKey,
    pub session_id: PrimaryKey,
    pub athlete_id: PrimaryKey,
    pub device_id: PrimaryKey,
}

/// A pair joined with the device and athlete it binds, as returned by the
/// listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PairedAthlete {
    pub pair_id: PrimaryKey,
    pub device_id: PrimaryKey,
    pub serial_number: String,
    pub color: Option<String>,
    pub athlete_id: PrimaryKey,
    pub athlete_name: String,
}
