//! # Configuration
//!
//! Limits and accepted versions shared by the codecs.
//!
//! | Variable | Default | Effect |
//! |----------|---------|--------|
//! | `ENGINEIO_MAX_DEPTH` | 64 | nesting limit for wire decode, value encode and value decode |
//! | `ENGINEIO_SUPPORTED_SYNTAX` | `0.1.0` | comma separated manifest syntax versions |

use crate::codec::values::EncoderConfig;
use tracing::warn;

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = shared_wire::DEFAULT_MAX_DEPTH;

/// Manifest syntax versions understood by default.
pub const SUPPORTED_SYNTAX: &[&str] = &["0.1.0"];

/// Codec configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineIoConfig {
    /// Nesting limit for every decoder and encoder.
    pub max_depth: usize,
    /// Accepted manifest syntax versions.
    pub supported_syntax: Vec<String>,
}

impl Default for EngineIoConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            supported_syntax: SUPPORTED_SYNTAX.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl EngineIoConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_depth = match lookup("ENGINEIO_MAX_DEPTH") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => depth,
                _ => {
                    warn!(value = %raw, "Ignoring invalid ENGINEIO_MAX_DEPTH");
                    defaults.max_depth
                }
            },
            None => defaults.max_depth,
        };

        let supported_syntax = lookup("ENGINEIO_SUPPORTED_SYNTAX")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|versions| !versions.is_empty())
            .unwrap_or(defaults.supported_syntax);

        Self {
            max_depth,
            supported_syntax,
        }
    }

    /// Returns true if manifests with `syntax` are accepted.
    #[must_use]
    pub fn is_supported_syntax(&self, syntax: &str) -> bool {
        self.supported_syntax.iter().any(|s| s == syntax)
    }

    /// Value encoder settings derived from this configuration.
    #[must_use]
    pub fn encoder(&self) -> EncoderConfig {
        EncoderConfig {
            max_depth: self.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineIoConfig::default();
        assert_eq!(config.max_depth, 64);
        assert!(config.is_supported_syntax("0.1.0"));
        assert!(!config.is_supported_syntax("0.2.0"));
        assert_eq!(config.encoder().max_depth, 64);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = EngineIoConfig::from_lookup(lookup(&[
            ("ENGINEIO_MAX_DEPTH", "16"),
            ("ENGINEIO_SUPPORTED_SYNTAX", "0.1.0, 0.2.0"),
        ]));
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.supported_syntax, vec!["0.1.0", "0.2.0"]);
    }

    #[test]
    fn test_from_lookup_ignores_invalid() {
        let config = EngineIoConfig::from_lookup(lookup(&[
            ("ENGINEIO_MAX_DEPTH", "zero"),
            ("ENGINEIO_SUPPORTED_SYNTAX", " , "),
        ]));
        assert_eq!(config, EngineIoConfig::default());
    }
}
