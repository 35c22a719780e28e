// SPDX-License-Identifier: MIT

//! Device roster. Pairing status is owned by the pairing engine and session
//! teardown; nothing here touches it.

use crate::db::{NewDevice, SharedDatabase};
use crate::error::{AppError, Result};
use crate::models::{Device, PrimaryKey};

#[derive(Clone)]
pub struct DeviceRegistry {
    db: SharedDatabase,
}

impl DeviceRegistry {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }

    /// Register a device; it starts out `Unpaired`. Serial numbers are not
    /// unique across tenants.
    pub async fn register(&self, user_id: PrimaryKey, serial_number: &str) -> Result<Device> {
        let serial_number = serial_number.trim();
        if serial_number.is_empty() {
            return Err(AppError::Validation(
                "Serial number is required".to_string(),
            ));
        }

        let device = self
            .db
            .create_device(NewDevice {
                user_id,
                serial_number: serial_number.to_string(),
            })
            .await?;

        tracing::debug!(user_id, device_id = device.id, "Device registered");
        Ok(device)
    }

    pub async fn list(&self, user_id: PrimaryKey) -> Result<Vec<Device>> {
        Ok(self.db.list_devices(user_id).await?)
    }

    /// Update the cosmetic color attribute only.
    pub async fn update_color(
        &self,
        user_id: PrimaryKey,
        device_id: PrimaryKey,
        color: &str,
    ) -> Result<()> {
        self.db
            .update_device_color(user_id, device_id, color.to_string())
            .await?;
        Ok(())
    }

    pub async fn remove(&self, user_id: PrimaryKey, device_id: PrimaryKey) -> Result<()> {
        self.db.delete_device(user_id, device_id).await?;
        Ok(())
    }
}
