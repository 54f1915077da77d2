// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./cogent.toml` > `~/.config/cogent/cogent.toml` > `/etc/cogent/cogent.toml`
//! with environment variable overrides via `COGENT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CogentConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/cogent/cogent.toml` (system-wide)
/// 3. `~/.config/cogent/cogent.toml` (user XDG config)
/// 4. `./cogent.toml` (local directory)
/// 5. `COGENT_*` environment variables
pub fn load_config() -> Result<CogentConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CogentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CogentConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CogentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CogentConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CogentConfig::default()))
        .merge(Toml::file("/etc/cogent/cogent.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("cogent/cogent.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("cogent.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `COGENT_API_API_KEY` must
/// map to `api.api_key`, not `api.api.key`.
fn env_provider() -> Env {
    Env::prefixed("COGENT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: COGENT_MEMORY_MIN_IMPORTANCE -> "memory_min_importance"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("api_", "api.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("tools_", "tools.", 1);
        mapped.into()
    })
}
