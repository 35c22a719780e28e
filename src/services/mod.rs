// SPDX-License-Identifier: MIT

//! Services module - business logic layer.
//!
//! Each service owns one slice of the session/device/pairing lifecycle and
//! talks to storage through the injected gateway.

pub mod device;
pub mod pairing;
pub mod results;
pub mod roster;
pub mod session;

pub use device::DeviceRegistry;
pub use pairing::PairingEngine;
pub use results::ResultStore;
pub use roster::{AthleteAttributes, AthleteRoster};
pub use session::SessionManager;
