// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths, known log levels, and non-zero
//! timing windows.

use crate::diagnostic::ConfigError;
use crate::model::PawlinkConfig;

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PawlinkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate app.name is not empty
    if config.app.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "app.name must not be empty".to_string(),
        });
    }

    // Validate log level is a known tracing level
    if !KNOWN_LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of {}",
                config.app.log_level,
                KNOWN_LOG_LEVELS.join(", ")
            ),
        });
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Timing windows must be non-zero; a zero window would collapse the
    // debounce into an immediate reload per event.
    if config.sync.insert_debounce_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "sync.insert_debounce_ms must be greater than zero".to_string(),
        });
    }

    if config.sync.update_debounce_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "sync.update_debounce_ms must be greater than zero".to_string(),
        });
    }

    if config.sync.event_buffer == 0 {
        errors.push(ConfigError::Validation {
            message: "sync.event_buffer must be greater than zero".to_string(),
        });
    }

    if config.notify.toast_dismiss_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "notify.toast_dismiss_ms must be greater than zero".to_string(),
        });
    }

    if config.notify.body_preview_chars == 0 {
        errors.push(ConfigError::Validation {
            message: "notify.body_preview_chars must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = PawlinkConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = PawlinkConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = PawlinkConfig::default();
        config.app.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    }

    #[test]
    fn zero_debounce_window_fails_validation() {
        let mut config = PawlinkConfig::default();
        config.sync.insert_debounce_ms = 0;
        config.sync.update_debounce_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ConfigError::Validation { message } if message.contains("debounce")))
                .count(),
            2,
            "both zero windows should be reported"
        );
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = PawlinkConfig::default();
        config.app.log_level = "debug".to_string();
        config.storage.database_path = "/tmp/pawlink-test.db".to_string();
        config.sync.insert_debounce_ms = 100;
        config.notify.toast_dismiss_ms = 2500;
        assert!(validate_config(&config).is_ok());
    }
}
