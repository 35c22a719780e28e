// SPDX-License-Identifier: MIT

//! Pairing engine: binds athletes to devices for the duration of a session.
//!
//! Invariant: a device carries at most one live pair. Re-pairing a device
//! silently replaces the prior pairing. The symmetric invariant is not
//! enforced; an athlete may be bound to several devices at once.

use crate::db::{NewPair, SharedDatabase};
use crate::error::{AppError, Result};
use crate::models::{Pair, PairedAthlete, PrimaryKey};
use crate::services::SessionManager;

#[derive(Clone)]
pub struct PairingEngine {
    db: SharedDatabase,
    sessions: SessionManager,
}

impl PairingEngine {
    pub fn new(db: SharedDatabase, sessions: SessionManager) -> Self {
        Self { db, sessions }
    }

    /// Pair an athlete to a device under the caller's active session.
    ///
    /// Requires an active session and caller ownership of both the athlete
    /// and the device. Eviction of the prior pair, the insert, and the
    /// device status transition happen atomically in the gateway.
    pub async fn create(
        &self,
        user_id: PrimaryKey,
        athlete_id: PrimaryKey,
        device_id: PrimaryKey,
    ) -> Result<Pair> {
        let session = self
            .sessions
            .active(user_id)
            .await?
            .ok_or_else(|| AppError::Conflict("Please start a session".to_string()))?;

        // Ownership of both ends is checked here, before the gateway touches
        // any pair rows, so an unknown device cannot surface as a storage
        // error out of the eviction-insert sequence.
        self.db.athlete_by_id(user_id, athlete_id).await?;
        self.db.device_by_id(user_id, device_id).await?;

        let pair = self
            .db
            .replace_pair(NewPair {
                user_id,
                session_id: session.id,
                athlete_id,
                device_id,
            })
            .await?;

        tracing::info!(user_id, athlete_id, device_id, "Pair created");
        Ok(pair)
    }

    /// All of the caller's live pairs, joined with device and athlete.
    pub async fn list(&self, user_id: PrimaryKey) -> Result<Vec<PairedAthlete>> {
        Ok(self.db.list_pairs(user_id).await?)
    }

    /// Move an existing pair onto another athlete. The device stays
    /// `Paired` throughout.
    pub async fn reassign(
        &self,
        user_id: PrimaryKey,
        pair_id: PrimaryKey,
        athlete_id: PrimaryKey,
    ) -> Result<()> {
        self.db.athlete_by_id(user_id, athlete_id).await?;
        self.db.reassign_pair(user_id, pair_id, athlete_id).await?;
        Ok(())
    }

    /// Delete a pair. The device is reset to `Unpaired` in the same
    /// operation, keeping device status consistent with the pair table.
    pub async fn remove(&self, user_id: PrimaryKey, pair_id: PrimaryKey) -> Result<()> {
        self.db.delete_pair(user_id, pair_id).await?;
        tracing::debug!(user_id, pair_id, "Pair deleted");
        Ok(())
    }
}
