// crates/pipeline-gate-config/src/secrets.rs
// ============================================================================
// Module: Environment Secret Store
// Description: Secret resolution from the process environment.
// Purpose: Resolve named gate credentials once at configuration load.
// Dependencies: pipeline-gate-core
// ============================================================================

//! ## Overview
//! The environment secret store resolves a configured secret name to the
//! environment variable of the same name. Secrets are resolved exactly once
//! during configuration load and carried as redacted
//! [`pipeline_gate_core::SecretValue`] material; a missing secret is a
//! pre-flight configuration failure, never a runtime surprise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use pipeline_gate_core::SecretError;
use pipeline_gate_core::SecretStore;
use pipeline_gate_core::SecretValue;

// ============================================================================
// SECTION: Store Implementation
// ============================================================================

/// Secret store backed by the process environment.
///
/// # Invariants
/// - When `overrides` is set, the process environment is never consulted.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore {
    /// Optional override map used for deterministic lookups.
    overrides: Option<BTreeMap<String, String>>,
}

impl EnvSecretStore {
    /// Creates a store backed by the process environment.
    #[must_use]
    pub const fn process() -> Self {
        Self {
            overrides: None,
        }
    }

    /// Creates a store backed by the given map only.
    #[must_use]
    pub const fn from_map(overrides: BTreeMap<String, String>) -> Self {
        Self {
            overrides: Some(overrides),
        }
    }
}

impl SecretStore for EnvSecretStore {
    fn resolve(&self, name: &str) -> Result<SecretValue, SecretError> {
        let value = match &self.overrides {
            Some(overrides) => overrides.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.map(SecretValue::new).ok_or_else(|| SecretError::NotFound {
            name: name.to_string(),
        })
    }
}
