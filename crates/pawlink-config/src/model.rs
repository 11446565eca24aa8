// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Pawlink messaging sync core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Pawlink configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PawlinkConfig {
    /// Application identity and logging settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Realtime sync timing settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Notification presentation settings.
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the application.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "pawlink".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Whether to enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "pawlink.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Realtime sync timing configuration.
///
/// The debounce windows coalesce bursts of realtime events into a single
/// corrective reload; the read-receipt delay keeps an incoming message
/// unread until the user has plausibly seen it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Debounce window for insert-driven unread reloads, in milliseconds.
    #[serde(default = "default_insert_debounce_ms")]
    pub insert_debounce_ms: u64,

    /// Debounce window for read-flag-update-driven reloads, in milliseconds.
    #[serde(default = "default_update_debounce_ms")]
    pub update_debounce_ms: u64,

    /// Delay before an incoming message in the open conversation is marked
    /// read, in milliseconds.
    #[serde(default = "default_read_receipt_delay_ms")]
    pub read_receipt_delay_ms: u64,

    /// Capacity of each realtime subscription buffer.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl SyncConfig {
    /// Insert-reload debounce window as a `Duration`.
    pub fn insert_debounce(&self) -> Duration {
        Duration::from_millis(self.insert_debounce_ms)
    }

    /// Update-reload debounce window as a `Duration`.
    pub fn update_debounce(&self) -> Duration {
        Duration::from_millis(self.update_debounce_ms)
    }

    /// Read-receipt delay as a `Duration`.
    pub fn read_receipt_delay(&self) -> Duration {
        Duration::from_millis(self.read_receipt_delay_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            insert_debounce_ms: default_insert_debounce_ms(),
            update_debounce_ms: default_update_debounce_ms(),
            read_receipt_delay_ms: default_read_receipt_delay_ms(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_insert_debounce_ms() -> u64 {
    300
}

fn default_update_debounce_ms() -> u64 {
    500
}

fn default_read_receipt_delay_ms() -> u64 {
    1000
}

fn default_event_buffer() -> usize {
    256
}

/// Notification presentation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// Auto-dismiss delay for toasts, in milliseconds.
    #[serde(default = "default_toast_dismiss_ms")]
    pub toast_dismiss_ms: u64,

    /// Whether system-level notifications are requested when unfocused.
    #[serde(default = "default_system_notifications")]
    pub system_notifications: bool,

    /// Maximum number of characters of the message body shown in a
    /// notification.
    #[serde(default = "default_body_preview_chars")]
    pub body_preview_chars: usize,

    /// Icon path or URL for system notifications.
    #[serde(default)]
    pub icon: Option<String>,
}

impl NotifyConfig {
    /// Toast auto-dismiss delay as a `Duration`.
    pub fn toast_dismiss(&self) -> Duration {
        Duration::from_millis(self.toast_dismiss_ms)
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            toast_dismiss_ms: default_toast_dismiss_ms(),
            system_notifications: default_system_notifications(),
            body_preview_chars: default_body_preview_chars(),
            icon: None,
        }
    }
}

fn default_toast_dismiss_ms() -> u64 {
    5000
}

fn default_system_notifications() -> bool {
    true
}

fn default_body_preview_chars() -> usize {
    100
}
