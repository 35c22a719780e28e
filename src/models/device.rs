// SPDX-License-Identifier: MIT

//! Wearable device model.

use crate::models::PrimaryKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pairing state of a device. Derived state: mutated only as a side effect
/// of pairing operations and session teardown, never directly by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Unpaired,
    Paired,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Unpaired => write!(f, "Unpaired"),
            DeviceStatus::Paired => write!(f, "Paired"),
        }
    }
}

impl FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaired" => Ok(DeviceStatus::Unpaired),
            "Paired" => Ok(DeviceStatus::Paired),
            other => Err(format!("unknown device status: {other}")),
        }
    }
}

/// A registered wearable device.
#[derive(Debug, Clone, Serialize)]
pub struct Device {
    pub id: PrimaryKey,
    pub user_id: PrimaryKey,
    pub serial_number: String,
    pub color: Option<String>,
    pub status: DeviceStatus,
}
