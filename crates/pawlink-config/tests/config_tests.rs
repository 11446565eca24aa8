// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Pawlink configuration system.

use pawlink_config::diagnostic::{suggest_key, ConfigError};
use pawlink_config::model::PawlinkConfig;
use pawlink_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_pawlink_config() {
    let toml = r#"
[app]
name = "pawlink-test"
log_level = "debug"

[storage]
database_path = "/tmp/pawlink-test.db"
wal_mode = false

[sync]
insert_debounce_ms = 150
update_debounce_ms = 400
read_receipt_delay_ms = 750
event_buffer = 64

[notify]
toast_dismiss_ms = 4000
system_notifications = false
body_preview_chars = 80
icon = "/paw.png"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.name, "pawlink-test");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/pawlink-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.sync.insert_debounce_ms, 150);
    assert_eq!(config.sync.update_debounce_ms, 400);
    assert_eq!(config.sync.read_receipt_delay_ms, 750);
    assert_eq!(config.sync.event_buffer, 64);
    assert_eq!(config.notify.toast_dismiss_ms, 4000);
    assert!(!config.notify.system_notifications);
    assert_eq!(config.notify.body_preview_chars, 80);
    assert_eq!(config.notify.icon.as_deref(), Some("/paw.png"));
}

/// Unknown field in [sync] section produces an error.
#[test]
fn unknown_field_in_sync_produces_error() {
    let toml = r#"
[sync]
insert_debouce_ms = 300
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("insert_debouce_ms"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let toml = "";
    let config = load_config_from_str(toml).expect("empty TOML should use defaults");

    assert_eq!(config.app.name, "pawlink");
    assert_eq!(config.app.log_level, "info");
    assert_eq!(config.storage.database_path, "pawlink.db");
    assert!(config.storage.wal_mode);
    assert_eq!(config.sync.insert_debounce_ms, 300);
    assert_eq!(config.sync.update_debounce_ms, 500);
    assert_eq!(config.sync.read_receipt_delay_ms, 1000);
    assert_eq!(config.notify.toast_dismiss_ms, 5000);
    assert!(config.notify.system_notifications);
    assert!(config.notify.icon.is_none());
}

/// A dotted profile override takes precedence over TOML content.
#[test]
fn override_takes_precedence_over_toml() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let toml_content = r#"
[app]
name = "from-toml"
"#;

    let config: PawlinkConfig = Figment::new()
        .merge(Serialized::defaults(PawlinkConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("app.name", "from-override"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.app.name, "from-override");
}

/// Dot notation maps underscore-containing keys correctly.
#[test]
fn dotted_key_maps_to_nested_field() {
    use figment::{providers::Serialized, Figment};

    let config: PawlinkConfig = Figment::new()
        .merge(Serialized::defaults(PawlinkConfig::default()))
        .merge(("sync.read_receipt_delay_ms", 250u64))
        .extract()
        .expect("should set nested key via dot notation");

    assert_eq!(config.sync.read_receipt_delay_ms, 250);
}

/// Validation failures surface as ConfigError::Validation diagnostics.
#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[app]
log_level = "shout"

[sync]
insert_debounce_ms = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("insert_debounce_ms"))));
}

/// Typo suggestions work for config-model key names.
#[test]
fn suggestions_cover_model_keys() {
    let valid = &[
        "insert_debounce_ms",
        "update_debounce_ms",
        "read_receipt_delay_ms",
        "event_buffer",
    ];
    assert_eq!(
        suggest_key("insert_debouce_ms", valid),
        Some("insert_debounce_ms".to_string())
    );
    assert_eq!(suggest_key("unrelated", valid), None);
}
