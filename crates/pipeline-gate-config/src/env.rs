// crates/pipeline-gate-config/src/env.rs
// ============================================================================
// Module: Environment Source
// Description: Deterministic access to the configuration environment.
// Purpose: Read configuration variables with an override map for tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The environment source wraps process environment reads behind an optional
//! override map so configuration loading stays deterministic in tests and
//! never touches ambient global state twice. Empty values count as unset,
//! matching how pipeline platforms template optional variables.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

// ============================================================================
// SECTION: Environment Source
// ============================================================================

/// Configuration variable source.
///
/// # Invariants
/// - When `overrides` is set, the process environment is never consulted.
/// - Values consisting only of whitespace count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    /// Optional override map used for deterministic lookups.
    overrides: Option<BTreeMap<String, String>>,
}

impl EnvSource {
    /// Creates a source backed by the process environment.
    #[must_use]
    pub const fn process() -> Self {
        Self {
            overrides: None,
        }
    }

    /// Creates a source backed by the given map only.
    #[must_use]
    pub const fn from_map(overrides: BTreeMap<String, String>) -> Self {
        Self {
            overrides: Some(overrides),
        }
    }

    /// Returns the value of a variable, treating empty values as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match &self.overrides {
            Some(overrides) => overrides.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        value.filter(|value| !value.trim().is_empty())
    }

    /// Returns all variables with the given prefix, sorted by key, with the
    /// prefix stripped.
    #[must_use]
    pub fn prefixed(&self, prefix: &str) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = match &self.overrides {
            Some(overrides) => overrides
                .iter()
                .filter_map(|(key, value)| {
                    key.strip_prefix(prefix).map(|name| (name.to_string(), value.clone()))
                })
                .collect(),
            None => std::env::vars()
                .filter_map(|(key, value)| {
                    key.strip_prefix(prefix).map(|name| (name.to_string(), value))
                })
                .collect(),
        };
        entries.retain(|(name, value)| !name.is_empty() && !value.trim().is_empty());
        entries.sort();
        entries
    }
}
