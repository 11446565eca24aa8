// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./pawlink.toml` > `~/.config/pawlink/pawlink.toml` > `/etc/pawlink/pawlink.toml`
//! with environment variable overrides via `PAWLINK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PawlinkConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pawlink/pawlink.toml` (system-wide)
/// 3. `~/.config/pawlink/pawlink.toml` (user XDG config)
/// 4. `./pawlink.toml` (local directory)
/// 5. `PAWLINK_*` environment variables
pub fn load_config() -> Result<PawlinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PawlinkConfig::default()))
        .merge(Toml::file("/etc/pawlink/pawlink.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("pawlink/pawlink.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("pawlink.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PawlinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PawlinkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PawlinkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PawlinkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `PAWLINK_SYNC_INSERT_DEBOUNCE_MS`
/// must map to `sync.insert_debounce_ms`, not `sync.insert.debounce.ms`.
fn env_provider() -> Env {
    Env::prefixed("PAWLINK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: PAWLINK_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("sync_", "sync.", 1)
            .replacen("notify_", "notify.", 1);
        mapped.into()
    })
}
