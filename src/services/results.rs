// SPDX-License-Identifier: MIT

//! Test result recording and retrieval, scoped to the caller's active
//! session and supervised athletes.

use crate::db::{DatabaseError, NewResult, SharedDatabase};
use crate::error::{AppError, Result};
use crate::models::{PrimaryKey, SessionResult, TestResult};
use crate::services::SessionManager;
use crate::time_utils::parse_calendar_date;

#[derive(Clone)]
pub struct ResultStore {
    db: SharedDatabase,
    sessions: SessionManager,
}

impl ResultStore {
    pub fn new(db: SharedDatabase, sessions: SessionManager) -> Self {
        Self { db, sessions }
    }

    /// Check that the athlete is under the caller's supervision. Surfaced
    /// as a conflict, not a not-found, so cross-tenant probing by id gets
    /// the same answer as a genuinely unknown athlete.
    async fn supervised(&self, user_id: PrimaryKey, athlete_id: PrimaryKey) -> Result<String> {
        match self.db.athlete_by_id(user_id, athlete_id).await {
            Ok(athlete) => Ok(athlete.name),
            Err(DatabaseError::NotFound { .. }) => Err(AppError::Conflict(
                "Can not find such athlete under supervision".to_string(),
            )),
            Err(other) => Err(other.into()),
        }
    }

    /// Record a result for an athlete. The result is stamped with the
    /// active session's date, which may be absent for undated sessions.
    /// The payload is stored verbatim.
    pub async fn record(
        &self,
        user_id: PrimaryKey,
        athlete_id: PrimaryKey,
        data: serde_json::Value,
    ) -> Result<TestResult> {
        let session = self
            .sessions
            .active(user_id)
            .await?
            .ok_or_else(|| AppError::Conflict("Please start a session".to_string()))?;

        self.supervised(user_id, athlete_id).await?;

        let result = self
            .db
            .create_result(NewResult {
                athlete_id,
                session_date: session.date,
                data,
            })
            .await?;

        tracing::debug!(user_id, athlete_id, result_id = result.id, "Result recorded");
        Ok(result)
    }

    /// All results for a supervised athlete, ascending by insertion order.
    /// Returns the athlete's name alongside.
    pub async fn list_for_athlete(
        &self,
        user_id: PrimaryKey,
        athlete_id: PrimaryKey,
    ) -> Result<(String, Vec<TestResult>)> {
        let name = self.supervised(user_id, athlete_id).await?;
        let results = self.db.results_for_athlete(athlete_id).await?;
        Ok((name, results))
    }

    /// Results recorded on a given session date for the caller's athletes,
    /// ordered by athlete name. Sessions are matched by date value; two
    /// sessions sharing a date are indistinguishable here.
    pub async fn list_for_session(
        &self,
        user_id: PrimaryKey,
        date: &str,
    ) -> Result<Vec<SessionResult>> {
        let date = parse_calendar_date(date).ok_or_else(|| {
            AppError::Validation("Invalid date format. Please use YYYY-MM-DD.".to_string())
        })?;
        Ok(self.db.results_for_session(user_id, date).await?)
    }

    /// Delete a result. Only results belonging to the caller's athletes can
    /// be deleted; anything else reads as not found.
    pub async fn remove(&self, user_id: PrimaryKey, result_id: PrimaryKey) -> Result<()> {
        self.db.delete_result(user_id, result_id).await?;
        Ok(())
    }
}
