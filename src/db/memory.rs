// SPDX-License-Identifier: MIT

//! In-memory implementation of the persistence gateway.
//!
//! Backs the offline test suite and local development without Postgres.
//! A single mutex guards all tables, so every multi-step lifecycle
//! operation is observed atomically, matching the transactional guarantees
//! of the Postgres backend.

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
use std::sync::Mutex;

#[derive(Default)]
struct Tables {
    next_id: PrimaryKey,
    sessions: Vec<Session>,
    devices: Vec<Device>,
    athletes: Vec<Athlete>,
    pairs: Vec<Pair>,
    results: Vec<TestResult>,
}

impl Tables {
    fn next_id(&mut self) -> PrimaryKey {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A poisoned lock means a panic mid-operation; tests should see it.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn active_session(&self, user_id: PrimaryKey) -> Result<Option<Session>> {
        let tables = self.lock();
        Ok(tables
            .sessions
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn create_session(&self, new_session: NewSession) -> Result<Session> {
        let mut tables = self.lock();
        if tables
            .sessions
            .iter()
            .any(|s| s.user_id == new_session.user_id)
        {
            return Err(DatabaseError::Conflict {
                resource: "session",
                field: "user",
            });
        }

        let session = Session {
            id: tables.next_id(),
            user_id: new_session.user_id,
            date: new_session.date,
        };
        tables.sessions.push(session.clone());
        Ok(session)
    }

    async fn end_session(&self, user_id: PrimaryKey) -> Result<bool> {
        let mut tables = self.lock();

        for device in tables
            .devices
            .iter_mut()
            .filter(|d| d.user_id == user_id && d.status == DeviceStatus::Paired)
        {
            device.status = DeviceStatus::Unpaired;
        }
        tables.pairs.retain(|p| p.user_id != user_id);

        let before = tables.sessions.len();
        tables.sessions.retain(|s| s.user_id != user_id);
        Ok(tables.sessions.len() < before)
    }

    async fn create_device(&self, new_device: NewDevice) -> Result<Device> {
        let mut tables = self.lock();
        let device = Device {
            id: tables.next_id(),
            user_id: new_device.user_id,
            serial_number: new_device.serial_number,
            color: None,
            status: DeviceStatus::Unpaired,
        };
        tables.devices.push(device.clone());
        Ok(device)
    }

    async fn list_devices(&self, user_id: PrimaryKey) -> Result<Vec<Device>> {
        let tables = self.lock();
        let mut devices: Vec<_> = tables
            .devices
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        devices.sort_by_key(|d| d.id);
        Ok(devices)
    }

    async fn device_by_id(&self, user_id: PrimaryKey, device_id: PrimaryKey) -> Result<Device> {
        let tables = self.lock();
        tables
            .devices
            .iter()
            .find(|d| d.id == device_id && d.user_id == user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound { resource: "device" })
    }

    async fn update_device_color(
        &self,
        user_id: PrimaryKey,
        device_id: PrimaryKey,
        color: String,
    ) -> Result<()> {
        let mut tables = self.lock();
        let device = tables
            .devices
            .iter_mut()
            .find(|d| d.id == device_id && d.user_id == user_id)
            .ok_or(DatabaseError::NotFound { resource: "device" })?;
        device.color = Some(color);
        Ok(())
    }

    async fn delete_device(&self, user_id: PrimaryKey, device_id: PrimaryKey) -> Result<()> {
        let mut tables = self.lock();
        let before = tables.devices.len();
        tables
            .devices
            .retain(|d| !(d.id == device_id && d.user_id == user_id));
        // Pairs follow their device, as the foreign key cascade does.
        if tables.devices.len() < before {
            tables.pairs.retain(|p| p.device_id != device_id);
        }
        Ok(())
    }

    async fn create_athlete(&self, new_athlete: NewAthlete) -> Result<Athlete> {
        let mut tables = self.lock();
        let athlete = Athlete {
            id: tables.next_id(),
            user_id: new_athlete.user_id,
            name: new_athlete.name,
            birthdate: new_athlete.birthdate,
            age: new_athlete.age,
            gender: new_athlete.gender,
            height: new_athlete.height,
            weight: new_athlete.weight,
            team: new_athlete.team,
        };
        tables.athletes.push(athlete.clone());
        Ok(athlete)
    }

    async fn list_athletes(&self, user_id: PrimaryKey) -> Result<Vec<Athlete>> {
        let tables = self.lock();
        let mut athletes: Vec<_> = tables
            .athletes
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        athletes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(athletes)
    }

    async fn athlete_by_id(&self, user_id: PrimaryKey, athlete_id: PrimaryKey) -> Result<Athlete> {
        let tables = self.lock();
        tables
            .athletes
            .iter()
            .find(|a| a.id == athlete_id && a.user_id == user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "athlete",
            })
    }

    async fn update_athlete(
        &self,
        user_id: PrimaryKey,
        athlete_id: PrimaryKey,
        update: UpdatedAthlete,
    ) -> Result<Athlete> {
        let mut tables = self.lock();
        let athlete = tables
            .athletes
            .iter_mut()
            .find(|a| a.id == athlete_id && a.user_id == user_id)
            .ok_or(DatabaseError::NotFound {
                resource: "athlete",
            })?;

        if let Some(name) = update.name {
            athlete.name = name;
        }
        athlete.birthdate = update.birthdate.or(athlete.birthdate);
        athlete.age = update.age.or(athlete.age);
        athlete.gender = update.gender.or(athlete.gender.take());
        athlete.height = update.height.or(athlete.height);
        athlete.weight = update.weight.or(athlete.weight);
        athlete.team = update.team.or(athlete.team.take());

        Ok(athlete.clone())
    }

    async fn delete_athlete(&self, user_id: PrimaryKey, athlete_id: PrimaryKey) -> Result<()> {
        let mut tables = self.lock();
        tables
            .athletes
            .retain(|a| !(a.id == athlete_id && a.user_id == user_id));
        Ok(())
    }

    async fn replace_pair(&self, new_pair: NewPair) -> Result<Pair> {
        let mut tables = self.lock();

        if !tables
            .devices
            .iter()
            .any(|d| d.id == new_pair.device_id && d.user_id == new_pair.user_id)
        {
            return Err(DatabaseError::NotFound { resource: "device" });
        }

        tables
            .pairs
            .retain(|p| !(p.device_id == new_pair.device_id && p.user_id == new_pair.user_id));

        let pair = Pair {
            id: tables.next_id(),
            user_id: new_pair.user_id,
            session_id: new_pair.session_id,
            athlete_id: new_pair.athlete_id,
            device_id: new_pair.device_id,
        };
        tables.pairs.push(pair.clone());

        if let Some(device) = tables
            .devices
            .iter_mut()
            .find(|d| d.id == new_pair.device_id && d.user_id == new_pair.user_id)
        {
            device.status = DeviceStatus::Paired;
        }

        Ok(pair)
    }

    async fn list_pairs(&self, user_id: PrimaryKey) -> Result<Vec<PairedAthlete>> {
        let tables = self.lock();
        let mut pairs: Vec<PairedAthlete> = tables
            .pairs
            .iter()
            .filter(|p| p.user_id == user_id)
            .filter_map(|p| {
                let device = tables.devices.iter().find(|d| d.id == p.device_id)?;
                let athlete = tables.athletes.iter().find(|a| a.id == p.athlete_id)?;
                Some(PairedAthlete {
                    pair_id: p.id,
                    device_id: device.id,
                    serial_number: device.serial_number.clone(),
                    color: device.color.clone(),
                    athlete_id: athlete.id,
                    athlete_name: athlete.name.clone(),
                })
            })
            .collect();
        pairs.sort_by_key(|p| p.pair_id);
        Ok(pairs)
    }

    async fn reassign_pair(
        &self,
        user_id: PrimaryKey,
        pair_id: PrimaryKey,
        athlete_id: PrimaryKey,
    ) -> Result<()> {
        let mut tables = self.lock();
        let pair = tables
            .pairs
            .iter_mut()
            .find(|p| p.id == pair_id && p.user_id == user_id)
            .ok_or(DatabaseError::NotFound { resource: "pair" })?;
        pair.athlete_id = athlete_id;
        Ok(())
    }

    async fn delete_pair(&self, user_id: PrimaryKey, pair_id: PrimaryKey) -> Result<()> {
        let mut tables = self.lock();
        let device_id = tables
            .pairs
            .iter()
            .find(|p| p.id == pair_id && p.user_id == user_id)
            .map(|p| p.device_id)
            .ok_or(DatabaseError::NotFound { resource: "pair" })?;

        tables.pairs.retain(|p| p.id != pair_id);

        if let Some(device) = tables
            .devices
            .iter_mut()
            .find(|d| d.id == device_id && d.user_id == user_id)
        {
            device.status = DeviceStatus::Unpaired;
        }

        Ok(())
    }

    async fn create_result(&self, new_result: NewResult) -> Result<TestResult> {
        let mut tables = self.lock();
        let result = TestResult {
            id: tables.next_id(),
            athlete_id: new_result.athlete_id,
            session_date: new_result.session_date,
            data: new_result.data,
        };
        tables.results.push(result.clone());
        Ok(result)
    }

    async fn results_for_athlete(&self, athlete_id: PrimaryKey) -> Result<Vec<TestResult>> {
        let tables = self.lock();
        let mut results: Vec<_> = tables
            .results
            .iter()
            .filter(|r| r.athlete_id == athlete_id)
            .cloned()
            .collect();
        results.sort_by_key(|r| r.id);
        Ok(results)
    }

    async fn results_for_session(
        &self,
        user_id: PrimaryKey,
        date: NaiveDate,
    ) -> Result<Vec<SessionResult>> {
        let tables = self.lock();
        let mut results: Vec<SessionResult> = tables
            .results
            .iter()
            .filter(|r| r.session_date == Some(date))
            .filter_map(|r| {
                let athlete = tables
                    .athletes
                    .iter()
                    .find(|a| a.id == r.athlete_id && a.user_id == user_id)?;
                Some(SessionResult {
                    result_id: r.id,
                    athlete_name: athlete.name.clone(),
                    data: r.data.clone(),
                })
            })
            .collect();
        results.sort_by(|a, b| {
            a.athlete_name
                .cmp(&b.athlete_name)
                .then(a.result_id.cmp(&b.result_id))
        });
        Ok(results)
    }

    async fn delete_result(&self, user_id: PrimaryKey, result_id: PrimaryKey) -> Result<()> {
        let mut tables = self.lock();
        let owned = tables.results.iter().any(|r| {
            r.id == result_id
                && tables
                    .athletes
                    .iter()
                    .any(|a| a.id == r.athlete_id && a.user_id == user_id)
        });
        if !owned {
            return Err(DatabaseError::NotFound { resource: "result" });
        }
        tables.results.retain(|r| r.id != result_id);
        Ok(())
    }

    async fn count_athletes(&self, user_id: PrimaryKey) -> Result<i64> {
        let tables = self.lock();
        Ok(tables.athletes.iter().filter(|a| a.user_id == user_id).count() as i64)
    }

    async fn count_devices(&self, user_id: PrimaryKey) -> Result<i64> {
        let tables = self.lock();
        Ok(tables.devices.iter().filter(|d| d.user_id == user_id).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn concurrent_session_starts_admit_exactly_one() {
        let db = Arc::new(MemoryDatabase::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                db.create_session(NewSession {
                    user_id: 1,
                    date: None,
                })
                .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert!(db.active_session(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn end_session_is_a_complete_teardown() {
        let db = MemoryDatabase::new();
        let session = db
            .create_session(NewSession {
                user_id: 1,
                date: None,
            })
            .await
            .unwrap();
        let athlete = db
            .create_athlete(NewAthlete {
                user_id: 1,
                name: "Asha".into(),
                birthdate: None,
                age: None,
                gender: None,
                height: None,
                weight: None,
                team: None,
            })
            .await
            .unwrap();
        let device = db
            .create_device(NewDevice {
                user_id: 1,
                serial_number: "SN-1".into(),
            })
            .await
            .unwrap();

        db.replace_pair(NewPair {
            user_id: 1,
            session_id: session.id,
            athlete_id: athlete.id,
            device_id: device.id,
        })
        .await
        .unwrap();

        assert!(db.end_session(1).await.unwrap());
        assert!(db.list_pairs(1).await.unwrap().is_empty());
        let device = db.device_by_id(1, device.id).await.unwrap();
        assert_eq!(device.status, DeviceStatus::Unpaired);
        assert!(db.active_session(1).await.unwrap().is_none());

        // Second teardown finds nothing to delete
        assert!(!db.end_session(1).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_device_drops_its_pairs() {
        let db = MemoryDatabase::new();
        let session = db
            .create_session(NewSession {
                user_id: 1,
                date: None,
            })
            .await
            .unwrap();
        let athlete = db
            .create_athlete(NewAthlete {
                user_id: 1,
                name: "Asha".into(),
                birthdate: None,
                age: None,
                gender: None,
                height: None,
                weight: None,
                team: None,
            })
            .await
            .unwrap();
        let device = db
            .create_device(NewDevice {
                user_id: 1,
                serial_number: "SN-1".into(),
            })
            .await
            .unwrap();
        db.replace_pair(NewPair {
            user_id: 1,
            session_id: session.id,
            athlete_id: athlete.id,
            device_id: device.id,
        })
        .await
        .unwrap();

        db.delete_device(1, device.id).await.unwrap();

        // No orphaned pair row survives the device
        assert!(db.lock().pairs.is_empty());
        assert!(db.list_pairs(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replacing_a_pair_keeps_one_row_per_device() {
        let db = MemoryDatabase::new();
        let session = db
            .create_session(NewSession {
                user_id: 1,
                date: None,
            })
            .await
            .unwrap();
        let device = db
            .create_device(NewDevice {
                user_id: 1,
                serial_number: "SN-1".into(),
            })
            .await
            .unwrap();
        let mut athlete_ids = Vec::new();
        for name in ["Asha", "Bram"] {
            let athlete = db
                .create_athlete(NewAthlete {
                    user_id: 1,
                    name: name.into(),
                    birthdate: None,
                    age: None,
                    gender: None,
                    height: None,
                    weight: None,
                    team: None,
                })
                .await
                .unwrap();
            athlete_ids.push(athlete.id);
        }

        for &athlete_id in &athlete_ids {
            db.replace_pair(NewPair {
                user_id: 1,
                session_id: session.id,
                athlete_id,
                device_id: device.id,
            })
            .await
            .unwrap();
        }

        let pairs = db.list_pairs(1).await.unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].athlete_id, athlete_ids[1]);
    }
}
