// crates/pipeline-gate-core/src/core/context.rs
// ============================================================================
// Module: Pipeline Context
// Description: Pipeline run identity and template substitution.
// Purpose: Carry run metadata into payloads, polling URLs, and templates.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The pipeline context is the immutable identity of the run that invoked the
//! gate: run identifier, repository, branch, and invocation timestamp. It is
//! injected into notify payloads, appended to polling URLs, shipped to the
//! control point, and exposed as `${...}` substitution variables for
//! operation templates. The core never reads the environment or the clock;
//! the configuration layer supplies every value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Pipeline Context
// ============================================================================

/// Identity of the pipeline run that invoked the gate.
///
/// # Invariants
/// - Values are snapshots taken at configuration load; the gate never
///   mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineContext {
    /// Pipeline run identifier.
    pub run_id: String,
    /// Repository the pipeline is building.
    pub repository: String,
    /// Branch the pipeline is building.
    pub branch: String,
    /// Invocation timestamp, RFC 3339.
    pub timestamp: String,
}

impl PipelineContext {
    /// Returns the substitution variables exposed to `${...}` templates.
    #[must_use]
    pub fn variables(&self) -> BTreeMap<String, String> {
        let mut variables = BTreeMap::new();
        variables.insert("runId".to_string(), self.run_id.clone());
        variables.insert("repository".to_string(), self.repository.clone());
        variables.insert("branch".to_string(), self.branch.clone());
        variables.insert("timestamp".to_string(), self.timestamp.clone());
        variables
    }

    /// Returns the `context` object injected into notify payloads.
    #[must_use]
    pub fn notify_object(&self) -> Value {
        json!({
            "pipelineRunId": self.run_id,
            "repository": self.repository,
            "branch": self.branch,
            "timestamp": self.timestamp,
        })
    }
}

// ============================================================================
// SECTION: Template Substitution
// ============================================================================

/// Errors raised while rendering a `${...}` template.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Placeholder referenced a variable that is not defined.
    #[error("unknown template variable `{name}`")]
    UnknownVariable {
        /// The unresolved variable name.
        name: String,
    },
    /// Placeholder was missing its closing brace.
    #[error("unterminated placeholder at offset {position}")]
    UnterminatedPlaceholder {
        /// Byte offset of the opening `${`.
        position: usize,
    },
}

/// Renders a `${...}` template against the given variables.
///
/// Text outside placeholders is copied verbatim; `$` not followed by `{` is
/// literal.
///
/// # Errors
///
/// Returns [`TemplateError`] for an unterminated placeholder or a variable
/// with no binding.
pub fn render_template(
    template: &str,
    variables: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut consumed = 0usize;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[.. start]);
        let after = &rest[start + 2 ..];
        let Some(end) = after.find('}') else {
            return Err(TemplateError::UnterminatedPlaceholder {
                position: consumed + start,
            });
        };
        let name = &after[.. end];
        let value = variables.get(name).ok_or_else(|| TemplateError::UnknownVariable {
            name: name.to_string(),
        })?;
        out.push_str(value);
        consumed += start + 2 + end + 1;
        rest = &after[end + 1 ..];
    }
    out.push_str(rest);
    Ok(out)
}
