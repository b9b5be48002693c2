// crates/pipeline-gate-core/src/document/mod.rs
// ============================================================================
// Module: Response Document Abstraction
// Description: Format-agnostic wrapper over fetched JSON and XML bodies.
// Purpose: Expose ordered path resolution without format branching in callers.
// Dependencies: crate::dsl::ast, jsonpath_lib, roxmltree, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ResponseDocument`] wraps one fetched response body. Path resolution
//! never fails on "not found": it returns an empty, ordered node list and
//! leaves the missing-value policy to the evaluator. A body that does not
//! parse for its declared format can be carried as an unparsed document whose
//! every resolution is empty, so a malformed response never aborts a run.
//!
//! Security posture: response bodies are untrusted; parsing is bounded by
//! [`MAX_DOCUMENT_BYTES`] and resolution is read-only.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod json;
pub mod xml;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::document::xml::XmlElement;
use crate::dsl::ast::PathExpression;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum response body size accepted for parsing, in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Document Format
// ============================================================================

/// Structured formats a response body can be parsed as.
///
/// # Invariants
/// - Variants are stable for serialization and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// JSON body addressed with JSONPath.
    Json,
    /// XML body addressed with XPath.
    Xml,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Xml => write!(f, "xml"),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing a response body or a path expression.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Body exceeded the configured size limit.
    #[error("response body exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual body length in bytes.
        actual_bytes: usize,
    },
    /// Body was not well-formed for the declared format.
    #[error("malformed {format} body: {detail}")]
    Malformed {
        /// Declared document format.
        format: DocumentFormat,
        /// Parser diagnostic.
        detail: String,
    },
    /// Path text was not valid for its format's path engine.
    #[error("invalid {format} path `{path}`: {detail}")]
    InvalidPath {
        /// Declared document format.
        format: DocumentFormat,
        /// Path text as written.
        path: String,
        /// Path engine diagnostic.
        detail: String,
    },
}

// ============================================================================
// SECTION: Resolved Nodes
// ============================================================================

/// One node matched by a path resolution, in document order.
///
/// Each node is coercible to String/Number/Bool/Null according to its
/// underlying representation: JSON nodes keep their JSON types, XML attribute
/// and text matches coerce by parsing their text, and XML elements coerce
/// through their string value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedNode {
    /// Matched JSON value.
    Json(Value),
    /// Matched XML element subtree.
    XmlElement(XmlElement),
    /// Matched XML attribute value or text content.
    XmlText(String),
}

impl ResolvedNode {
    /// Coerces the node to a number when its representation allows it.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Json(Value::Number(number)) => number.as_f64(),
            Self::Json(_) => None,
            Self::XmlElement(element) => element.string_value().trim().parse().ok(),
            Self::XmlText(text) => text.trim().parse().ok(),
        }
    }

    /// Coerces the node to text when its representation allows it.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Json(Value::String(text)) => Some(text.clone()),
            Self::Json(_) => None,
            Self::XmlElement(element) => Some(element.string_value()),
            Self::XmlText(text) => Some(text.clone()),
        }
    }

    /// Coerces the node to a boolean when its representation allows it.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Json(Value::Bool(value)) => Some(*value),
            Self::Json(_) => None,
            Self::XmlElement(element) => parse_bool(element.string_value().trim()),
            Self::XmlText(text) => parse_bool(text.trim()),
        }
    }

    /// Returns true when the node represents an explicit null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }

    /// Returns the node's elements when it is a container, for membership
    /// tests.
    #[must_use]
    pub fn members(&self) -> Option<Vec<Self>> {
        match self {
            Self::Json(Value::Array(items)) => {
                Some(items.iter().cloned().map(Self::Json).collect())
            }
            Self::Json(_) | Self::XmlText(_) => None,
            Self::XmlElement(element) => {
                if element.children.is_empty() {
                    None
                } else {
                    Some(element.children.iter().cloned().map(Self::XmlElement).collect())
                }
            }
        }
    }
}

/// Parses the XML boolean text forms.
fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// ============================================================================
// SECTION: Response Document
// ============================================================================

/// Parsed backing tree for a response document.
#[derive(Debug, Clone, PartialEq)]
enum DocumentTree {
    /// Well-formed JSON tree.
    Json(Value),
    /// Well-formed XML element tree.
    Xml(XmlElement),
    /// Body that failed to parse; every resolution is empty.
    Unparsed,
}

/// One fetched response body with path-based lookup.
///
/// # Invariants
/// - Created once per fetch and immutable afterwards.
/// - `raw_body` preserves the body text for audit payloads even when the
///   tree failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDocument {
    /// Declared document format.
    format: DocumentFormat,
    /// Body text as received (lossy UTF-8).
    raw_body: String,
    /// Parsed backing tree.
    tree: DocumentTree,
}

impl ResponseDocument {
    /// Parses a response body for the declared format.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the body exceeds [`MAX_DOCUMENT_BYTES`]
    /// or is not well-formed for `format`.
    pub fn parse(format: DocumentFormat, body: &[u8]) -> Result<Self, DocumentError> {
        if body.len() > MAX_DOCUMENT_BYTES {
            return Err(DocumentError::TooLarge {
                max_bytes: MAX_DOCUMENT_BYTES,
                actual_bytes: body.len(),
            });
        }
        let raw_body = String::from_utf8_lossy(body).into_owned();
        let tree = match format {
            DocumentFormat::Json => DocumentTree::Json(json::parse(body)?),
            DocumentFormat::Xml => DocumentTree::Xml(xml::parse(&raw_body)?),
        };
        Ok(Self {
            format,
            raw_body,
            tree,
        })
    }

    /// Wraps a body that failed to parse; every path resolves to zero nodes.
    #[must_use]
    pub fn unparsed(format: DocumentFormat, body: &[u8]) -> Self {
        Self {
            format,
            raw_body: String::from_utf8_lossy(body).into_owned(),
            tree: DocumentTree::Unparsed,
        }
    }

    /// Returns the declared document format.
    #[must_use]
    pub const fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Returns the body text as received.
    #[must_use]
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Resolves a path expression to an ordered node list.
    ///
    /// Resolution never fails: an unknown path, a format mismatch between the
    /// expression and the document, or an unparsed body all yield an empty
    /// list.
    #[must_use]
    pub fn resolve(&self, path: &PathExpression) -> Vec<ResolvedNode> {
        match (&self.tree, path.format) {
            (DocumentTree::Json(root), DocumentFormat::Json) => json::resolve(root, &path.raw),
            (DocumentTree::Xml(root), DocumentFormat::Xml) => xml::resolve(root, &path.raw),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Path Validation
// ============================================================================

/// Validates path text against the format's path engine.
///
/// # Errors
///
/// Returns [`DocumentError::InvalidPath`] when the text is rejected by the
/// JSONPath compiler or falls outside the supported XPath subset.
pub fn validate_path(format: DocumentFormat, path: &str) -> Result<(), DocumentError> {
    match format {
        DocumentFormat::Json => json::validate_path(path),
        DocumentFormat::Xml => xml::validate_path(path),
    }
}
