// SPDX-License-Identifier: MIT

//! Athlete roster CRUD.

use crate::db::{NewAthlete, SharedDatabase, UpdatedAthlete};
use crate::error::{AppError, Result};
use crate::models::{Athlete, PrimaryKey};
use crate::time_utils::parse_calendar_date;
use chrono::NaiveDate;

/// Incoming athlete attributes, shared by register and update. Fields left
/// as `None` are simply not set (on update: left unchanged).
#[derive(Debug, Default)]
pub struct AthleteAttributes {
    pub name: Option<String>,
    pub birthdate: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub team: Option<String>,
}

#[derive(Clone)]
pub struct AthleteRoster {
    db: SharedDatabase,
}

impl AthleteRoster {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    fn parse_birthdate(raw: Option<&str>) -> Result<Option<NaiveDate>> {
        raw.map(|raw| {
            parse_calendar_date(raw).ok_or_else(|| {
                AppError::Validation("Invalid date format. Please use YYYY-MM-DD.".to_string())
            })
        })
        .transpose()
    }

    pub async fn register(&self, user_id: PrimaryKey, attrs: AthleteAttributes) -> Result<Athlete> {
        let name = attrs
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;
        let birthdate = Self::parse_birthdate(attrs.birthdate.as_deref())?;

        let athlete = self
            .db
            .create_athlete(NewAthlete {
                user_id,
                name,
                birthdate,
                age: attrs.age,
                gender: attrs.gender,
                height: attrs.height,
                weight: attrs.weight,
                team: attrs.team,
            })
            .await?;

        tracing::debug!(user_id, athlete_id = athlete.id, "Athlete registered");
        Ok(athlete)
    }

    pub async fn list(&self, user_id: PrimaryKey) -> Result<Vec<Athlete>> {
        Ok(self.db.list_athletes(user_id).await?)
    }

    /// Partial update: only the provided fields change.
    pub async fn update(
        &self,
        user_id: PrimaryKey,
        athlete_id: PrimaryKey,
        attrs: AthleteAttributes,
    ) -> Result<Athlete> {
        let birthdate = Self::parse_birthdate(attrs.birthdate.as_deref())?;

        let athlete = self
            .db
            .update_athlete(
                user_id,
                athlete_id,
                UpdatedAthlete {
                    name: attrs.name,
                    birthdate,
                    age: attrs.age,
                    gender: attrs.gender,
                    height: attrs.height,
                    weight: attrs.weight,
                    team: attrs.team,
                },
            )
            .await?;

        Ok(athlete)
    }

    pub async fn remove(&self, user_id: PrimaryKey, athlete_id: PrimaryKey) -> Result<()> {
        self.db.delete_athlete(user_id, athlete_id).await?;
        Ok(())
    }
}
