// crates/pipeline-gate-core/src/document/json.rs
// ============================================================================
// Module: JSON Document Backing
// Description: JSONPath resolution over parsed JSON response bodies.
// Purpose: Provide ordered, non-failing node resolution for the JSON format.
// Dependencies: jsonpath_lib, serde_json
// ============================================================================

//! ## Overview
//! The JSON backing parses bodies with `serde_json` and resolves paths with
//! the `jsonpath_lib` selector: dotted and bracket field access, array
//! indexing, and the `[*]` wildcard. Matches are returned in document order.
//! Path text is validated eagerly at configuration time so a malformed path
//! is a configuration error rather than an evaluation surprise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonpath_lib::select;
use serde_json::Value;

use crate::document::DocumentError;
use crate::document::DocumentFormat;
use crate::document::ResolvedNode;

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a JSON body.
///
/// # Errors
///
/// Returns [`DocumentError::Malformed`] when the body is not well-formed JSON.
pub fn parse(body: &[u8]) -> Result<Value, DocumentError> {
    serde_json::from_slice(body).map_err(|err| DocumentError::Malformed {
        format: DocumentFormat::Json,
        detail: err.to_string(),
    })
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Validates JSONPath text by running the selector against an empty document.
///
/// The selector parses the path before matching, so a selection against
/// `null` exercises exactly the parse step.
///
/// # Errors
///
/// Returns [`DocumentError::InvalidPath`] when the selector rejects the text.
pub fn validate_path(path: &str) -> Result<(), DocumentError> {
    select(&Value::Null, path).map(|_| ()).map_err(|_| DocumentError::InvalidPath {
        format: DocumentFormat::Json,
        path: path.to_string(),
        detail: "invalid jsonpath".to_string(),
    })
}

/// Resolves a JSONPath against the document root, in document order.
///
/// Resolution failures yield an empty list; the path was validated at
/// configuration time, so a selector error here means the document shape
/// defeated the query, which is the same outcome as "not found".
#[must_use]
pub fn resolve(root: &Value, path: &str) -> Vec<ResolvedNode> {
    select(root, path).map_or_else(
        |_| Vec::new(),
        |matches| matches.into_iter().cloned().map(ResolvedNode::Json).collect(),
    )
}
