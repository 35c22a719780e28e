// SPDX-License-Identifier: MIT

//! Coachbench: multi-tenant coaching-session backend.
//!
//! Coaches register athletes and wearable devices, run timed training
//! sessions, pair athletes to devices for the session's duration, and
//! record test results scoped to the active session.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SharedDatabase;
use services::{AthleteRoster, DeviceRegistry, PairingEngine, ResultStore, SessionManager};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SharedDatabase,
    pub sessions: SessionManager,
    pub devices: DeviceRegistry,
    pub pairing: PairingEngine,
    pub results: ResultStore,
    pub roster: AthleteRoster,
}

impl AppState {
    /// Wire the service layer around one persistence gateway.
    pub fn new(config: Config, db: SharedDatabase) -> Self {
        let sessions = SessionManager::new(db.clone());
        let devices = DeviceRegistry::new(db.clone());
        let pairing = PairingEngine::new(db.clone(), sessions.clone());
        let results = ResultStore::new(db.clone(), sessions.clone());
        let roster = AthleteRoster::new(db.clone());

        Self {
            config,
            db,
            sessions,
            devices,
            pairing,
            results,
            roster,
        }
    }
}
