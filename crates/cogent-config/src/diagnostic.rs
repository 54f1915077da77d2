// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config error diagnostics.
//!
//! Figment reports deserialization failures as flat error values. This module
//! turns each one into a miette report the CLI can print: a source window
//! underlining the offending key, a "did you mean" suggestion for typos, and
//! the set of keys the enclosing section accepts. The config has exactly one
//! level of nesting (`agent`, `api`, `memory`, `tools`), so key location is a
//! direct section-scoped scan rather than a general TOML path walk.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score below which a key suggestion is noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error carrying what miette needs to render it.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key the section does not accept.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(cogent::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest accepted key, when one clears the similarity floor.
        suggestion: Option<String>,
        /// Comma-separated keys the enclosing section accepts.
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type.
    #[error("invalid type for `{key}`: found {found}")]
    #[diagnostic(code(cogent::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    /// A required key that no layer provided.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(cogent::config::missing_key),
        help("add `{key} = <value>` to cogent.toml")
    )]
    MissingKey { key: String },

    /// A value that deserialized fine but fails a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(cogent::config::validation))]
    Validation { message: String },

    /// Anything figment reports that has no richer mapping.
    #[error("configuration error: {0}")]
    #[diagnostic(code(cogent::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? valid keys are: {valid_keys}"),
        None => format!("valid keys are: {valid_keys}"),
    }
}

/// Convert every entry of a figment error into a diagnostic.
///
/// `toml_sources` carries (path, content) pairs for the files that fed the
/// merge; the first file that actually contains an offending key supplies
/// the source window for its report.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert_error(error, toml_sources))
        .collect()
}

fn convert_error(error: figment::Error, sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, accepted) => {
            let accepted: Vec<&str> = accepted.to_vec();
            let section = error.path.first().map(String::as_str);
            let (span, src) = spanned_source(sources, section, field);
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, &accepted),
                valid_keys: accepted.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.clone().into_owned(),
        },
        Kind::InvalidType(found, expected) => ConfigError::InvalidType {
            key: error.path.join("."),
            found: found.to_string(),
            expected: expected.to_string(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Find the first source file containing `key` under `section` and build the
/// span miette needs to underline it.
fn spanned_source(
    sources: &[(String, String)],
    section: Option<&str>,
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    for (path, content) in sources {
        if let Some(offset) = find_key_offset(content, section, key) {
            let span = SourceSpan::new(offset.into(), key.len());
            let src = NamedSource::new(path, content.clone());
            return (Some(span), Some(src));
        }
    }
    (None, None)
}

/// Byte offset of `key` within its section of a TOML document.
///
/// Finds the `[section]` header (or starts at the top of the file for
/// top-level keys), then the first following line that opens with the key
/// followed by `=` or whitespace.
pub fn find_key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let start = match section {
        None => 0,
        Some(name) => {
            let header = format!("[{name}]");
            content.find(&header)? + header.len()
        }
    };

    let mut offset = start;
    for line in content[start..].lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(key) {
            if rest.starts_with('=') || rest.starts_with(' ') || rest.starts_with('\t') {
                return Some(offset + (line.len() - trimmed.len()));
            }
        }
        offset += line.len() + 1;
    }
    None
}

/// The accepted key most similar to `unknown`, when it clears the noise floor.
pub fn suggest_key(unknown: &str, accepted: &[&str]) -> Option<String> {
    accepted
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, key)| key.to_string())
}

/// Print every diagnostic to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_key() {
        assert_eq!(
            suggest_key("naem", &["name", "max_steps"]),
            Some("name".to_string())
        );
        assert_eq!(
            suggest_key("max_stesp", &["name", "max_steps", "buffer_capacity"]),
            Some("max_steps".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_key() {
        assert_eq!(suggest_key("zzzzzz", &["name", "max_steps", "log_level"]), None);
    }

    #[test]
    fn locates_key_inside_section() {
        let toml = "[agent]\nnaem = \"test\"\n";
        let offset = find_key_offset(toml, Some("agent"), "naem").unwrap();
        assert_eq!(&toml[offset..offset + 4], "naem");
    }

    #[test]
    fn locates_top_level_key() {
        let toml = "stray = 1\n\n[agent]\nname = \"x\"\n";
        assert_eq!(find_key_offset(toml, None, "stray"), Some(0));
    }

    #[test]
    fn missing_section_yields_no_offset() {
        let toml = "[agent]\nname = \"x\"\n";
        assert_eq!(find_key_offset(toml, Some("memory"), "enabled"), None);
    }

    #[test]
    fn span_points_at_the_file_containing_the_key() {
        let sources = vec![
            ("a.toml".to_string(), "[agent]\nname = \"x\"\n".to_string()),
            ("b.toml".to_string(), "[agent]\nnaem = \"y\"\n".to_string()),
        ];
        let (span, src) = spanned_source(&sources, Some("agent"), "naem");
        assert!(span.is_some());
        assert!(src.is_some());
    }

    #[test]
    fn absent_key_yields_no_span() {
        let sources = vec![("a.toml".to_string(), "[agent]\nname = \"x\"\n".to_string())];
        let (span, src) = spanned_source(&sources, Some("agent"), "absent");
        assert!(span.is_none());
        assert!(src.is_none());
    }

    #[test]
    fn help_text_carries_suggestion_and_valid_keys() {
        let help = unknown_key_help(Some("name"), "name, max_steps");
        assert!(help.contains("did you mean `name`?"));
        assert!(help.contains("max_steps"));
        assert_eq!(unknown_key_help(None, "a, b"), "valid keys are: a, b");
    }
}
