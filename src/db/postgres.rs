// SPDX-License-Identifier: MIT

//! Postgres implementation of the persistence gateway.
//!
//! Lifecycle mutations that touch more than one table run inside a single
//! transaction; the uniqueness invariants (one session per user, one pair
//! per device) are backed by unique indexes so concurrent writers conflict
//! at the database instead of racing a pre-check.

use crate::db::{
    Database, DatabaseError, NewAthlete, NewDevice, NewPair, NewResult, NewSession, Result,
    UpdatedAthlete,
};
use crate::models::{
    Athlete, Device, DeviceStatus, Pair, PairedAthlete, PrimaryKey, Session, SessionResult,
    TestResult,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::str::FromStr;

pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    /// Connect to Postgres and run any pending migrations.
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(DatabaseError::internal)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(DatabaseError::internal)?;

        tracing::info!("Connected to Postgres");

        Ok(Self { pool })
    }
}

fn session_from_row(row: &PgRow) -> Result<Session> {
    Ok(Session {
        id: row.try_get("session_id").map_err(DatabaseError::internal)?,
        user_id: row.try_get("user_id").map_err(DatabaseError::internal)?,
        date: row
            .try_get("session_date")
            .map_err(DatabaseError::internal)?,
    })
}

fn device_from_row(row: &PgRow) -> Result<Device> {
    let status: String = row
        .try_get("device_status")
        .map_err(DatabaseError::internal)?;

    Ok(Device {
        id: row.try_get("device_id").map_err(DatabaseError::internal)?,
        user_id: row.try_get("user_id").map_err(DatabaseError::internal)?,
        serial_number: row
            .try_get("device_serial_number")
            .map_err(DatabaseError::internal)?,
        color: row
            .try_get("device_color")
            .map_err(DatabaseError::internal)?,
        status: DeviceStatus::from_str(&status).map_err(|e| DatabaseError::Internal(e.into()))?,
    })
}

fn athlete_from_row(row: &PgRow) -> Result<Athlete> {
    Ok(Athlete {
        id: row.try_get("athlete_id").map_err(DatabaseError::internal)?,
        user_id: row.try_get("user_id").map_err(DatabaseError::internal)?,
        name: row
            .try_get("athlete_name")
            .map_err(DatabaseError::internal)?,
        birthdate: row
            .try_get("athlete_birthdate")
            .map_err(DatabaseError::internal)?,
        age: row
            .try_get("athlete_age")
            .map_err(DatabaseError::internal)?,
        gender: row
            .try_get("athlete_gender")
            .map_err(DatabaseError::internal)?,
        height: row
            .try_get("athlete_height")
            .map_err(DatabaseError::internal)?,
        weight: row
            .try_get("athlete_weight")
            .map_err(DatabaseError::internal)?,
        team: row
            .try_get("athlete_team")
            .map_err(DatabaseError::internal)?,
    })
}

fn result_from_row(row: &PgRow) -> Result<TestResult> {
    Ok(TestResult {
        id: row.try_get("result_id").map_err(DatabaseError::internal)?,
        athlete_id: row.try_get("athlete_id").map_err(DatabaseError::internal)?,
        session_date: row
            .try_get("session_date")
            .map_err(DatabaseError::internal)?,
        data: row
            .try_get("result_data")
            .map_err(DatabaseError::internal)?,
    })
}

#[async_trait]
impl Database for PgDatabase {
    async fn active_session(&self, user_id: PrimaryKey) -> Result<Option<Session>> {
        let row = sqlx::query("SELECT session_id, user_id, session_date FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::internal)?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn create_session(&self, new_session: NewSession) -> Result<Session> {
        // ON CONFLICT against the per-user unique index keeps the existence
        // check and the insert atomic under concurrent starts.
        let row = sqlx::query(
            "INSERT INTO sessions (user_id, session_date) VALUES ($1, $2)
             ON CONFLICT (user_id) DO NOTHING
             RETURNING session_id, user_id, session_date",
        )
        .bind(new_session.user_id)
        .bind(new_session.date)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        match row {
            Some(row) => session_from_row(&row),
            None => Err(DatabaseError::Conflict {
                resource: "session",
                field: "user",
            }),
        }
    }

    async fn end_session(&self, user_id: PrimaryKey) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::internal)?;

        sqlx::query(
            "UPDATE devices SET device_status = 'Unpaired'
             WHERE user_id = $1 AND device_status = 'Paired'",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::internal)?;

        sqlx::query("DELETE FROM pairs WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::internal)?;

        let deleted = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::internal)?;

        tx.commit().await.map_err(DatabaseError::internal)?;

        Ok(deleted.rows_affected() > 0)
    }

    async fn create_device(&self, new_device: NewDevice) -> Result<Device> {
        let row = sqlx::query(
            "INSERT INTO devices (user_id, device_serial_number, device_status)
             VALUES ($1, $2, 'Unpaired')
             RETURNING device_id, user_id, device_serial_number, device_color, device_status",
        )
        .bind(new_device.user_id)
        .bind(&new_device.serial_number)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        device_from_row(&row)
    }

    async fn list_devices(&self, user_id: PrimaryKey) -> Result<Vec<Device>> {
        let rows = sqlx::query(
            "SELECT device_id, user_id, device_serial_number, device_color, device_status
             FROM devices WHERE user_id = $1 ORDER BY device_id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        rows.iter().map(device_from_row).collect()
    }

    async fn device_by_id(&self, user_id: PrimaryKey, device_id: PrimaryKey) -> Result<Device> {
        let row = sqlx::query(
            "SELECT device_id, user_id, device_serial_number, device_color, device_status
             FROM devices WHERE device_id = $1 AND user_id = $2",
        )
        .bind(device_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        match row {
            Some(row) => device_from_row(&row),
            None => Err(DatabaseError::NotFound { resource: "device" }),
        }
    }

    async fn update_device_color(
        &self,
        user_id: PrimaryKey,
        device_id: PrimaryKey,
        color: String,
    ) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE devices SET device_color = $1 WHERE device_id = $2 AND user_id = $3",
        )
        .bind(&color)
        .bind(device_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound { resource: "device" });
        }
        Ok(())
    }

    async fn delete_device(&self, user_id: PrimaryKey, device_id: PrimaryKey) -> Result<()> {
        sqlx::query("DELETE FROM devices WHERE device_id = $1 AND user_id = $2")
            .bind(device_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::internal)?;

        Ok(())
    }

    async fn create_athlete(&self, new_athlete: NewAthlete) -> Result<Athlete> {
        let row = sqlx::query(
            "INSERT INTO athletes
               (user_id, athlete_name, athlete_birthdate, athlete_age, athlete_gender,
                athlete_height, athlete_weight, athlete_team)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING athlete_id, user_id, athlete_name, athlete_birthdate, athlete_age,
                       athlete_gender, athlete_height, athlete_weight, athlete_team",
        )
        .bind(new_athlete.user_id)
        .bind(&new_athlete.name)
        .bind(new_athlete.birthdate)
        .bind(new_athlete.age)
        .bind(&new_athlete.gender)
        .bind(new_athlete.height)
        .bind(new_athlete.weight)
        .bind(&new_athlete.team)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        athlete_from_row(&row)
    }

    async fn list_athletes(&self, user_id: PrimaryKey) -> Result<Vec<Athlete>> {
        let rows = sqlx::query(
            "SELECT athlete_id, user_id, athlete_name, athlete_birthdate, athlete_age,
                    athlete_gender, athlete_height, athlete_weight, athlete_team
             FROM athletes WHERE user_id = $1 ORDER BY athlete_name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        rows.iter().map(athlete_from_row).collect()
    }

    async fn athlete_by_id(&self, user_id: PrimaryKey, athlete_id: PrimaryKey) -> Result<Athlete> {
        let row = sqlx::query(
            "SELECT athlete_id, user_id, athlete_name, athlete_birthdate, athlete_age,
                    athlete_gender, athlete_height, athlete_weight, athlete_team
             FROM athletes WHERE athlete_id = $1 AND user_id = $2",
        )
        .bind(athlete_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        match row {
            Some(row) => athlete_from_row(&row),
            None => Err(DatabaseError::NotFound {
                resource: "athlete",
            }),
        }
    }

    async fn update_athlete(
        &self,
        user_id: PrimaryKey,
        athlete_id: PrimaryKey,
        update: UpdatedAthlete,
    ) -> Result<Athlete> {
        let current = self.athlete_by_id(user_id, athlete_id).await?;

        sqlx::query(
            "UPDATE athletes SET
                athlete_name = $1,
                athlete_birthdate = $2,
                athlete_age = $3,
                athlete_gender = $4,
                athlete_height = $5,
                athlete_weight = $6,
                athlete_team = $7
             WHERE athlete_id = $8 AND user_id = $9",
        )
        .bind(update.name.unwrap_or(current.name))
        .bind(update.birthdate.or(current.birthdate))
        .bind(update.age.or(current.age))
        .bind(update.gender.or(current.gender))
        .bind(update.height.or(current.height))
        .bind(update.weight.or(current.weight))
        .bind(update.team.or(current.team))
        .bind(athlete_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        self.athlete_by_id(user_id, athlete_id).await
    }

    async fn delete_athlete(&self, user_id: PrimaryKey, athlete_id: PrimaryKey) -> Result<()> {
        sqlx::query("DELETE FROM athletes WHERE athlete_id = $1 AND user_id = $2")
            .bind(athlete_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::internal)?;

        Ok(())
    }

    async fn replace_pair(&self, new_pair: NewPair) -> Result<Pair> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::internal)?;

        // Evict any prior pairing for this device before inserting, so the
        // per-device unique index never trips for a legitimate re-pair.
        sqlx::query("DELETE FROM pairs WHERE device_id = $1 AND user_id = $2")
            .bind(new_pair.device_id)
            .bind(new_pair.user_id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::internal)?;

        let row = sqlx::query(
            "INSERT INTO pairs (user_id, session_id, athlete_id, device_id)
             VALUES ($1, $2, $3, $4)
             RETURNING pair_id",
        )
        .bind(new_pair.user_id)
        .bind(new_pair.session_id)
        .bind(new_pair.athlete_id)
        .bind(new_pair.device_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::internal)?;

        let updated = sqlx::query(
            "UPDATE devices SET device_status = 'Paired' WHERE device_id = $1 AND user_id = $2",
        )
        .bind(new_pair.device_id)
        .bind(new_pair.user_id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::internal)?;

        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound { resource: "device" });
        }

        tx.commit().await.map_err(DatabaseError::internal)?;

        Ok(Pair {
            id: row.try_get("pair_id").map_err(DatabaseError::internal)?,
            user_id: new_pair.user_id,
            session_id: new_pair.session_id,
            athlete_id: new_pair.athlete_id,
            device_id: new_pair.device_id,
        })
    }

    async fn list_pairs(&self, user_id: PrimaryKey) -> Result<Vec<PairedAthlete>> {
        let rows = sqlx::query(
            "SELECT pairs.pair_id, devices.device_id, devices.device_serial_number,
                    devices.device_color, athletes.athlete_id, athletes.athlete_name
             FROM pairs
                 JOIN devices ON pairs.device_id = devices.device_id
                 JOIN athletes ON pairs.athlete_id = athletes.athlete_id
             WHERE pairs.user_id = $1
             ORDER BY pairs.pair_id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        rows.iter()
            .map(|row| {
                Ok(PairedAthlete {
                    pair_id: row.try_get("pair_id").map_err(DatabaseError::internal)?,
                    device_id: row.try_get("device_id").map_err(DatabaseError::internal)?,
                    serial_number: row
                        .try_get("device_serial_number")
                        .map_err(DatabaseError::internal)?,
                    color: row
                        .try_get("device_color")
                        .map_err(DatabaseError::internal)?,
                    athlete_id: row.try_get("athlete_id").map_err(DatabaseError::internal)?,
                    athlete_name: row
                        .try_get("athlete_name")
                        .map_err(DatabaseError::internal)?,
                })
            })
            .collect()
    }

    async fn reassign_pair(
        &self,
        user_id: PrimaryKey,
        pair_id: PrimaryKey,
        athlete_id: PrimaryKey,
    ) -> Result<()> {
        let updated =
            sqlx::query("UPDATE pairs SET athlete_id = $1 WHERE pair_id = $2 AND user_id = $3")
                .bind(athlete_id)
                .bind(pair_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(DatabaseError::internal)?;

        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound { resource: "pair" });
        }
        Ok(())
    }

    async fn delete_pair(&self, user_id: PrimaryKey, pair_id: PrimaryKey) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::internal)?;

        let row = sqlx::query("SELECT device_id FROM pairs WHERE pair_id = $1 AND user_id = $2")
            .bind(pair_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DatabaseError::internal)?;

        let device_id: PrimaryKey = match row {
            Some(row) => row.try_get("device_id").map_err(DatabaseError::internal)?,
            None => return Err(DatabaseError::NotFound { resource: "pair" }),
        };

        sqlx::query("DELETE FROM pairs WHERE pair_id = $1 AND user_id = $2")
            .bind(pair_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::internal)?;

        sqlx::query(
            "UPDATE devices SET device_status = 'Unpaired' WHERE device_id = $1 AND user_id = $2",
        )
        .bind(device_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::internal)?;

        tx.commit().await.map_err(DatabaseError::internal)?;

        Ok(())
    }

    async fn create_result(&self, new_result: NewResult) -> Result<TestResult> {
        let row = sqlx::query(
            "INSERT INTO results (athlete_id, session_date, result_data)
             VALUES ($1, $2, $3)
             RETURNING result_id, athlete_id, session_date, result_data",
        )
        .bind(new_result.athlete_id)
        .bind(new_result.session_date)
        .bind(&new_result.data)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        result_from_row(&row)
    }

    async fn results_for_athlete(&self, athlete_id: PrimaryKey) -> Result<Vec<TestResult>> {
        let rows = sqlx::query(
            "SELECT result_id, athlete_id, session_date, result_data
             FROM results WHERE athlete_id = $1 ORDER BY result_id ASC",
        )
        .bind(athlete_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        rows.iter().map(result_from_row).collect()
    }

    async fn results_for_session(
        &self,
        user_id: PrimaryKey,
        date: NaiveDate,
    ) -> Result<Vec<SessionResult>> {
        let rows = sqlx::query(
            "SELECT results.result_id, athletes.athlete_name, results.result_data
             FROM results
                 JOIN athletes ON results.athlete_id = athletes.athlete_id
             WHERE results.session_date = $1 AND athletes.user_id = $2
             ORDER BY athletes.athlete_name ASC, results.result_id ASC",
        )
        .bind(date)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        rows.iter()
            .map(|row| {
                Ok(SessionResult {
                    result_id: row.try_get("result_id").map_err(DatabaseError::internal)?,
                    athlete_name: row
                        .try_get("athlete_name")
                        .map_err(DatabaseError::internal)?,
                    data: row
                        .try_get("result_data")
                        .map_err(DatabaseError::internal)?,
                })
            })
            .collect()
    }

    async fn delete_result(&self, user_id: PrimaryKey, result_id: PrimaryKey) -> Result<()> {
        // Scope the delete to the caller's athletes; a bare id is not enough.
        let deleted = sqlx::query(
            "DELETE FROM results
             WHERE result_id = $1
               AND athlete_id IN (SELECT athlete_id FROM athletes WHERE user_id = $2)",
        )
        .bind(result_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::internal)?;

        if deleted.rows_affected() == 0 {
            return Err(DatabaseError::NotFound { resource: "result" });
        }
        Ok(())
    }

    async fn count_athletes(&self, user_id: PrimaryKey) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM athletes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::internal)?;

        row.try_get("total").map_err(DatabaseError::internal)
    }

    async fn count_devices(&self, user_id: PrimaryKey) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM devices WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::internal)?;

        row.try_get("total").map_err(DatabaseError::internal)
    }
}
