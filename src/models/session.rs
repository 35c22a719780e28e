// SPDX-License-Identifier: MIT

//! Training session model.

use crate::models::PrimaryKey;
use chrono::NaiveDate;
use serde::Serialize;

/// A bounded training period for one coach.
///
/// At most one exists per user at any time; everything the pairing and
/// result subsystems do is gated on its presence.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: PrimaryKey,
    pub user_id: PrimaryKey,
    /// Optional calendar date the session is tagged with. Results recorded
    /// during the session inherit it.
    pub date: Option<NaiveDate>,
}
