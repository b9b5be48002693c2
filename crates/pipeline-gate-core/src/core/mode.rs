// crates/pipeline-gate-core/src/core/mode.rs
// ============================================================================
// Module: Gate Mode Configuration
// Description: Per-mode configuration variants and operation templates.
// Purpose: Carry validated, ready-to-execute mode state into the runtime.
// Dependencies: crate::core, crate::document, crate::dsl, crate::interfaces
// ============================================================================

//! ## Overview
//! Exactly one mode variant is active per invocation, chosen by
//! configuration. Mode state is fully validated before execution: expressions
//! arrive parsed, operation templates arrive resolved, and secrets arrive as
//! resolved values. The runtime dispatches on the [`ModeConfig`] sum type, so
//! adding a mode is a compile-time exhaustiveness obligation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::core::context::TemplateError;
use crate::core::context::render_template;
use crate::core::decision::FallbackAction;
use crate::document::DocumentFormat;
use crate::document::ResponseDocument;
use crate::dsl::Expression;
use crate::dsl::SyntaxError;
use crate::dsl::evaluate;
use crate::dsl::parse;
use crate::interfaces::GateRequest;
use crate::interfaces::HttpMethod;
use crate::interfaces::SecretValue;

// ============================================================================
// SECTION: Gate Expressions
// ============================================================================

/// A parsed expression paired with its source text.
///
/// # Invariants
/// - `source` is the text the expression was parsed from, kept verbatim for
///   audit records.
#[derive(Debug, Clone, PartialEq)]
pub struct GateExpression {
    /// Expression source text as configured.
    source: String,
    /// Parsed expression tree.
    expression: Expression,
}

impl GateExpression {
    /// Parses expression text into a ready-to-evaluate expression.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError`] when the text is not a well-formed Eval DSL
    /// expression.
    pub fn parse(source: &str) -> Result<Self, SyntaxError> {
        let expression = parse(source)?;
        Ok(Self {
            source: source.to_string(),
            expression,
        })
    }

    /// Returns the expression source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates the expression against a response document.
    #[must_use]
    pub fn evaluate(&self, document: &ResponseDocument) -> bool {
        evaluate(&self.expression, document)
    }

    /// Returns the document format of the expression's leftmost path.
    ///
    /// Executors use this as the preferred format when parsing a fetched
    /// body.
    #[must_use]
    pub fn primary_format(&self) -> DocumentFormat {
        leftmost_format(&self.expression)
    }
}

/// Walks to the leftmost comparison and returns its path format.
fn leftmost_format(expression: &Expression) -> DocumentFormat {
    match expression {
        Expression::Comparison(comparison) => comparison.path.format,
        Expression::Logical {
            left, ..
        } => leftmost_format(left),
    }
}

// ============================================================================
// SECTION: Operation Templates
// ============================================================================

/// Where an operation parameter is injected.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// Substituted into a `{name}` URL segment.
    Path,
    /// Appended as a query parameter.
    Query,
    /// Sent as a request header.
    Header,
}

/// One operation parameter binding.
///
/// # Invariants
/// - `value` may itself contain `${...}` placeholders, rendered against the
///   pipeline context variables at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBinding {
    /// Injection location.
    pub location: ParamLocation,
    /// Parameter name.
    pub name: String,
    /// Parameter value template.
    pub value: String,
}

/// Already-resolved HTTP operation contract for Custom mode.
///
/// # Invariants
/// - `url_template` is absolute once its `{name}` segments are substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    /// HTTP method to invoke.
    pub method: HttpMethod,
    /// URL template with `{name}` path-parameter segments.
    pub url_template: String,
    /// Parameter bindings in configuration order.
    pub params: Vec<ParamBinding>,
    /// Optional body template with `${...}` placeholders.
    pub body_template: Option<String>,
}

/// Errors raised while resolving an operation template.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum OperationError {
    /// A `{name}` URL segment had no path parameter binding.
    #[error("unbound path parameter `{{{name}}}`")]
    UnboundPathParam {
        /// The unbound segment name.
        name: String,
    },
    /// The substituted URL did not parse.
    #[error("invalid operation url: {detail}")]
    InvalidUrl {
        /// URL parser diagnostic.
        detail: String,
    },
    /// A template placeholder failed to render.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl OperationSpec {
    /// Resolves the operation into a concrete request.
    ///
    /// Path parameters are substituted into the URL template, query
    /// parameters are appended, header parameters become request headers, and
    /// the body template is rendered. Every binding value and the body
    /// template may reference `${...}` pipeline variables.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] when a `{name}` segment stays unbound, the
    /// final URL does not parse, or a placeholder has no variable binding.
    pub fn resolve(
        &self,
        variables: &BTreeMap<String, String>,
        bearer: Option<SecretValue>,
    ) -> Result<GateRequest, OperationError> {
        let mut url = self.url_template.clone();
        for param in &self.params {
            if param.location == ParamLocation::Path {
                let value = render_template(&param.value, variables)?;
                url = url.replace(&format!("{{{}}}", param.name), &value);
            }
        }
        if let Some(name) = unbound_segment(&url) {
            return Err(OperationError::UnboundPathParam {
                name,
            });
        }

        let mut parsed = Url::parse(&url).map_err(|err| OperationError::InvalidUrl {
            detail: err.to_string(),
        })?;
        for param in &self.params {
            if param.location == ParamLocation::Query {
                let value = render_template(&param.value, variables)?;
                parsed.query_pairs_mut().append_pair(&param.name, &value);
            }
        }

        let mut headers = Vec::new();
        for param in &self.params {
            if param.location == ParamLocation::Header {
                let value = render_template(&param.value, variables)?;
                headers.push((param.name.clone(), value));
            }
        }

        let body = match &self.body_template {
            Some(template) => Some(render_template(template, variables)?),
            None => None,
        };

        Ok(GateRequest {
            method: self.method,
            url: parsed.to_string(),
            headers,
            bearer,
            body,
        })
    }
}

/// Returns the first `{name}` segment left in the URL, if any.
fn unbound_segment(url: &str) -> Option<String> {
    let open = url.find('{')?;
    let close = url[open ..].find('}')?;
    Some(url[open + 1 .. open + close].to_string())
}

// ============================================================================
// SECTION: Mode Variants
// ============================================================================

/// Synchronous check: one fetch, one success expression.
///
/// # Invariants
/// - `fallback` applies only when the success expression is false.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicMode {
    /// Endpoint to fetch.
    pub url: String,
    /// Optional bearer credential.
    pub bearer: Option<SecretValue>,
    /// Success expression.
    pub success: GateExpression,
    /// Action when the success expression is false.
    pub fallback: FallbackAction,
}

/// Fire-and-forget notification: one POST, binary outcome.
///
/// # Invariants
/// - `payload` is a JSON object; the executor injects the `context` member.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyMode {
    /// Endpoint to notify.
    pub url: String,
    /// Optional bearer credential.
    pub bearer: Option<SecretValue>,
    /// Configured payload template object.
    pub payload: serde_json::Value,
}

/// Bounded polling workflow: repeated fetch and evaluate.
///
/// # Invariants
/// - `poll_interval` is nonzero and no longer than `timeout`.
/// - `fallback` applies only when the deadline elapses.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitForMode {
    /// Base endpoint; `runId` is appended as a query parameter.
    pub url: String,
    /// Optional bearer credential.
    pub bearer: Option<SecretValue>,
    /// Success expression.
    pub success: GateExpression,
    /// Optional failure expression, checked before success.
    pub failure: Option<GateExpression>,
    /// Action when the deadline elapses.
    pub fallback: FallbackAction,
    /// Polling deadline measured from loop start.
    pub timeout: Duration,
    /// Sleep between poll iterations.
    pub poll_interval: Duration,
}

/// Contract-driven call: one resolved operation, two expressions.
///
/// # Invariants
/// - `request` was resolved from an [`OperationSpec`] at configuration time.
/// - `fallback` applies when neither expression matches.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomMode {
    /// Resolved operation request.
    pub request: GateRequest,
    /// Success expression.
    pub success: GateExpression,
    /// Optional failure expression, checked before success.
    pub failure: Option<GateExpression>,
    /// Action when neither expression matches.
    pub fallback: FallbackAction,
}

/// Active mode for one gate invocation.
///
/// # Invariants
/// - Exactly one variant is active per invocation, chosen by configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeConfig {
    /// Synchronous check.
    Basic(BasicMode),
    /// Asynchronous notification.
    AdvancedNotify(NotifyMode),
    /// Asynchronous polling workflow.
    AdvancedWaitFor(WaitForMode),
    /// Contract-driven call.
    Custom(CustomMode),
}

impl ModeConfig {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Basic(_) => "basic",
            Self::AdvancedNotify(_) => "notify",
            Self::AdvancedWaitFor(_) => "waitfor",
            Self::Custom(_) => "custom",
        }
    }
}
