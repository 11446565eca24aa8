// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store health check.

use pawlink_config::PawlinkConfig;
use pawlink_core::{HealthStatus, MessageStore, PawlinkError, ServiceAdapter};
use pawlink_storage::SqliteMessageStore;

/// Open the configured store and report its health.
pub async fn run(config: &PawlinkConfig) -> Result<(), PawlinkError> {
    let store = SqliteMessageStore::new(config.storage.clone());
    store.initialize().await?;

    match store.health_check().await? {
        HealthStatus::Healthy => {
            println!("store: healthy ({})", config.storage.database_path);
        }
        HealthStatus::Degraded(reason) => {
            println!("store: degraded -- {reason}");
        }
        HealthStatus::Unhealthy(reason) => {
            println!("store: unhealthy -- {reason}");
        }
    }

    store.close().await?;
    Ok(())
}
