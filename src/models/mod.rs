// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod athlete;
pub mod device;
pub mod pair;
pub mod result;
pub mod session;

pub use athlete::Athlete;
pub use device::{Device, DeviceStatus};
pub use pair::{Pair, PairedAthlete};
pub use result::{SessionResult, TestResult};
pub use session::Session;

/// Row identifier used across all tables.
pub type PrimaryKey = i64;
