// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and thresholds inside [0, 1].

use crate::diagnostic::ConfigError;
use crate::model::CogentConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CogentConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.max_steps == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.max_steps must be at least 1".to_string(),
        });
    }

    if config.agent.buffer_capacity < 2 {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.buffer_capacity must be at least 2 (system prompt + one message), got {}",
                config.agent.buffer_capacity
            ),
        });
    }

    if !(0.0..=2.0).contains(&config.agent.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.temperature must be within [0.0, 2.0], got {}",
                config.agent.temperature
            ),
        });
    }

    if config.api.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    }

    if config.memory.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "memory.database_path must not be empty".to_string(),
        });
    }

    if config.memory.embedding_dim == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.embedding_dim must be at least 1".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&config.memory.min_importance) {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.min_importance must be within [0.0, 1.0], got {}",
                config.memory.min_importance
            ),
        });
    }

    if !(0.0..=1.0).contains(&config.memory.consolidation_threshold) {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.consolidation_threshold must be within [0.0, 1.0], got {}",
                config.memory.consolidation_threshold
            ),
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
        let config = CogentConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_max_steps_fails_validation() {
        let mut config = CogentConfig::default();
        config.agent.max_steps = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("max_steps"))));
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = CogentConfig::default();
        config.memory.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn out_of_range_threshold_fails_validation() {
        let mut config = CogentConfig::default();
        config.memory.consolidation_threshold = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("consolidation_threshold"))));
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = CogentConfig::default();
        config.agent.max_steps = 0;
        config.memory.min_importance = -0.1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = CogentConfig::default();
        config.agent.max_steps = 12;
        config.memory.database_path = "/tmp/test.db".to_string();
        config.memory.min_importance = 0.0;
        assert!(validate_config(&config).is_ok());
    }
}
