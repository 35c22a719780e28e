// SPDX-License-Identifier: MIT

//! Recorded test result model.

use crate::models::PrimaryKey;
use chrono::NaiveDate;
use serde::Serialize;

/// An opaque recorded outcome of a test. Append-only; the payload is stored
/// verbatim and never interpreted by the backend.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub id: PrimaryKey,
    pub athlete_id: PrimaryKey,
    /// Date of the session the result was recorded in. `None` when the
    /// session itself was undated.
    pub session_date: Option<NaiveDate>,
    pub data: serde_json::Value,
}

/// A result joined with the athlete it belongs to, as returned by the
/// per-session listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    pub result_id: PrimaryKey,
    pub athlete_name: String,
    pub data: serde_json::Value,
}
