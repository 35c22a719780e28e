// SPDX-License-Identifier: MIT

//! Session lifecycle: at most one active training session per coach.

use crate::db::{NewSession, SharedDatabase};
use crate::error::{AppError, Result};
use crate::models::{PrimaryKey, Session};
use crate::time_utils::parse_calendar_date;

#[derive(Clone)]
pub struct SessionManager {
    db: SharedDatabase,
}

impl SessionManager {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    /// Start a session, optionally tagged with a `YYYY-MM-DD` date.
    ///
    /// The single-active-session invariant is enforced by the gateway at
    /// insert time, not by a separate existence check, so two concurrent
    /// starts cannot both succeed.
    pub async fn start(&self, user_id: PrimaryKey, date: Option<&str>) -> Result<Session> {
        let date = match date {
            Some(raw) => Some(parse_calendar_date(raw).ok_or_else(|| {
                AppError::Validation("Invalid date format. Please use YYYY-MM-DD.".to_string())
            })?),
            None => None,
        };

        let session = self
            .db
            .create_session(NewSession { user_id, date })
            .await
            .map_err(|err| match err {
                crate::db::DatabaseError::Conflict { .. } => AppError::Conflict(
                    "Please end ongoing session before starting a new one".to_string(),
                ),
                other => other.into(),
            })?;

        tracing::info!(user_id, session_id = session.id, "Session started");
        Ok(session)
    }

    /// End the caller's session: unpair their devices, drop their pairs,
    /// delete the session. Ending with no active session is a no-op.
    pub async fn end(&self, user_id: PrimaryKey) -> Result<()> {
        let existed = self.db.end_session(user_id).await?;
        if existed {
            tracing::info!(user_id, "Session ended");
        }
        Ok(())
    }

    /// The caller's active session, if any. The precondition query used by
    /// pairing and result recording.
    pub async fn active(&self, user_id: PrimaryKey) -> Result<Option<Session>> {
        Ok(self.db.active_session(user_id).await?)
    }
}
