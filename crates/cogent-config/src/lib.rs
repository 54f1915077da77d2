// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Cogent agent.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and Elm-style diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use cogent_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Agent name: {}", config.agent.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CogentConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to rich miette diagnostics with typo suggestions
///
/// Returns either a valid `CogentConfig` or a list of diagnostic errors.
pub fn load_and_validate() -> Result<CogentConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            // Read TOML source files for error source span information
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<CogentConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    // Local config
    if let Ok(content) = std::fs::read_to_string("cogent.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("cogent.toml").display().to_string())
            .unwrap_or_else(|_| "cogent.toml".to_string());
        sources.push((path, content));
    }

    // XDG user config
    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("cogent/cogent.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    // System config
    let system_path = std::path::Path::new("/etc/cogent/cogent.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_and_validate() {
        let config = load_and_validate_str("").expect("defaults should be valid");
        assert_eq!(config.agent.name, "cogent");
        assert_eq!(config.agent.max_steps, 6);
        assert_eq!(config.agent.buffer_capacity, 100);
        assert!((config.agent.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.api.base_url, "https://api.openai.com/v1");
        assert_eq!(config.api.model, "gpt-4o-mini");
        assert_eq!(config.memory.embedding_dim, 384);
        assert!((config.memory.min_importance - 0.6).abs() < f64::EPSILON);
        assert!((config.memory.consolidation_threshold - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_key_gets_suggestion() {
        let toml = r#"
[agent]
naem = "assistant"
"#;
        let errors = load_and_validate_str(toml).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "naem" && suggestion.as_deref() == Some("name")
        )));
    }

    #[test]
    fn partial_overrides_keep_defaults() {
        let toml = r#"
[agent]
max_steps = 10

[api]
model = "gpt-4o"
"#;
        let config = load_and_validate_str(toml).expect("valid config");
        assert_eq!(config.agent.max_steps, 10);
        assert_eq!(config.agent.name, "cogent");
        assert_eq!(config.api.model, "gpt-4o");
        assert_eq!(config.api.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn semantic_errors_surface_as_validation() {
        let toml = r#"
[memory]
min_importance = 2.0
"#;
        let errors = load_and_validate_str(toml).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("min_importance"))));
    }
}
