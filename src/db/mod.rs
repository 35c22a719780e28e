// SPDX-License-Identifier: MIT

//! Persistence gateway.
//!
//! Every component receives the gateway as an injected `Arc<dyn Database>`;
//! there is no process-wide pool. Multi-step lifecycle mutations (session
//! teardown, pair replacement, pair deletion) are single gateway calls so
//! each implementation can make them atomic: the Postgres backend wraps them
//! in transactions, the in-memory backend holds one lock across the steps.

pub mod memory;
pub mod postgres;

pub use memory::MemoryDatabase;
pub use postgres::PgDatabase;

use crate::models::{
    Athlete, Device, Pair, PairedAthlete, PrimaryKey, Session, SessionResult, TestResult,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabaseError>;
pub type SharedDatabase = Arc<dyn Database>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error("storage failure")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// A uniqueness invariant would be violated
    #[error("{resource} already exists for this {field}")]
    Conflict {
        resource: &'static str,
        field: &'static str,
    },
    /// A referenced row doesn't exist (or isn't owned by the caller)
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
}

impl DatabaseError {
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DatabaseError::Internal(Box::new(err))
    }
}

/// New-row and partial-update parameter types.
#[derive(Debug)]
pub struct NewSession {
    pub user_id: PrimaryKey,
    pub date: Option<NaiveDate>,
}

#[derive(Debug)]
pub struct NewDevice {
    pub user_id: PrimaryKey,
    pub serial_number: String,
}

#[derive(Debug)]
pub struct NewAthlete {
    pub user_id: PrimaryKey,
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub team: Option<String>,
}

/// Fields left as `None` keep their current value.
#[derive(Debug, Default)]
pub struct UpdatedAthlete {
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub team: Option<String>,
}

#[derive(Debug)]
pub struct NewPair {
    pub user_id: PrimaryKey,
    pub session_id: PrimaryKey,
    pub athlete_id: PrimaryKey,
    pub device_id: PrimaryKey,
}

#[derive(Debug)]
pub struct NewResult {
    pub athlete_id: PrimaryKey,
    pub session_date: Option<NaiveDate>,
    pub data: serde_json::Value,
}

/// Storage operations the backend needs, scoped by owner everywhere a row
/// has one.
#[async_trait]
pub trait Database: Send + Sync {
    // Sessions
    /// The caller's active session, if any.
    async fn active_session(&self, user_id: PrimaryKey) -> Result<Option<Session>>;
    /// Create a session. Fails with `Conflict` if the user already has one;
    /// the check and the insert are atomic.
    async fn create_session(&self, new_session: NewSession) -> Result<Session>;
    /// Tear down the caller's session: unpair their paired devices, delete
    /// their pairs, delete the session row, all atomically. Returns whether
    /// a session row existed.
    async fn end_session(&self, user_id: PrimaryKey) -> Result<bool>;

    // Devices
    async fn create_device(&self, new_device: NewDevice) -> Result<Device>;
    async fn list_devices(&self, user_id: PrimaryKey) -> Result<Vec<Device>>;
    async fn device_by_id(&self, user_id: PrimaryKey, device_id: PrimaryKey) -> Result<Device>;
    async fn update_device_color(
        &self,
        user_id: PrimaryKey,
        device_id: PrimaryKey,
        color: String,
    ) -> Result<()>;
    async fn delete_device(&self, user_id: PrimaryKey, device_id: PrimaryKey) -> Result<()>;

    // Athletes
    async fn create_athlete(&self, new_athlete: NewAthlete) -> Result<Athlete>;
    async fn list_athletes(&self, user_id: PrimaryKey) -> Result<Vec<Athlete>>;
    async fn athlete_by_id(&self, user_id: PrimaryKey, athlete_id: PrimaryKey) -> Result<Athlete>;
    async fn update_athlete(
        &self,
        user_id: PrimaryKey,
        athlete_id: PrimaryKey,
        update: UpdatedAthlete,
    ) -> Result<Athlete>;
    async fn delete_athlete(&self, user_id: PrimaryKey, athlete_id: PrimaryKey) -> Result<()>;

    // Pairs
    /// Bind an athlete to a device: evict any existing pair for the device,
    /// insert a new one, mark the device `Paired`, all atomically.
    async fn replace_pair(&self, new_pair: NewPair) -> Result<Pair>;
    async fn list_pairs(&self, user_id: PrimaryKey) -> Result<Vec<PairedAthlete>>;
    /// Reassign the athlete on an existing pair. Device status untouched.
    async fn reassign_pair(
        &self,
        user_id: PrimaryKey,
        pair_id: PrimaryKey,
        athlete_id: PrimaryKey,
    ) -> Result<()>;
    /// Delete a pair and reset its device to `Unpaired`, atomically.
    async fn delete_pair(&self, user_id: PrimaryKey, pair_id: PrimaryKey) -> Result<()>;

    // Results
    async fn create_result(&self, new_result: NewResult) -> Result<TestResult>;
    /// All results for one athlete, ascending by id.
    async fn results_for_athlete(&self, athlete_id: PrimaryKey) -> Result<Vec<TestResult>>;
    /// Results recorded on the given session date for athletes owned by the
    /// caller, ordered by athlete name.
    async fn results_for_session(
        &self,
        user_id: PrimaryKey,
        date: NaiveDate,
    ) -> Result<Vec<SessionResult>>;
    /// Delete a result, but only when its athlete belongs to the caller.
    async fn delete_result(&self, user_id: PrimaryKey, result_id: PrimaryKey) -> Result<()>;

    // Dashboard
    async fn count_athletes(&self, user_id: PrimaryKey) -> Result<i64>;
    async fn count_devices(&self, user_id: PrimaryKey) -> Result<i64>;
}
