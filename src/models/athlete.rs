// SPDX-License-Identifier: MIT

//! Athlete roster model.

use crate::models::PrimaryKey;
use chrono::NaiveDate;
use serde::Serialize;

/// An athlete registered under a coach's supervision.
///
/// Everything beyond the name is optional and stored as an explicit
/// `Option` rather than coalesced at call sites.
#[derive(Debug, Clone, Serialize)]
pub struct Athlete {
    pub id: PrimaryKey,
    pub user_id: PrimaryKey,
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub team: Option<String>,
}
