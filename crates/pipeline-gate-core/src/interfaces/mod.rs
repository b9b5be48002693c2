// crates/pipeline-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Gate Interfaces
// Description: Backend-agnostic interfaces for transport, secrets, and time.
// Purpose: Define the contract surfaces used by the gate runtime.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the gate integrates with external systems without
//! embedding backend-specific details. Implementations must be deterministic
//! with respect to their inputs and fail closed on missing or invalid data.
//! The runtime consumes these traits by reference, so every collaborator is
//! injectable in tests.
//!
//! Security posture: transport responses and control-point replies are
//! untrusted inputs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::context::PipelineContext;
use crate::core::decision::EvaluationRecord;
use crate::core::decision::GateDecision;

// ============================================================================
// SECTION: Secrets
// ============================================================================

/// Resolved secret material, redacted from debug output.
///
/// # Invariants
/// - The wrapped value never appears in `Debug` formatting.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    /// Wraps resolved secret material.
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Exposes the secret for use at the transport boundary.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(***)")
    }
}

/// Secret resolution errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SecretError {
    /// No secret exists under the requested name.
    #[error("secret `{name}` not found")]
    NotFound {
        /// Requested secret name.
        name: String,
    },
    /// The backing store reported an error.
    #[error("secret store error: {0}")]
    Store(String),
}

/// Backend-agnostic secret store.
pub trait SecretStore {
    /// Resolves a named secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] when the secret is missing or the store fails.
    fn resolve(&self, name: &str) -> Result<SecretValue, SecretError>;
}

// ============================================================================
// SECTION: HTTP Requests
// ============================================================================

/// HTTP methods the gate can issue.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the method name on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One concrete HTTP request the gate issues.
///
/// # Invariants
/// - `url` is absolute; the runtime performs no URL mutation beyond the
///   documented `runId` query append for polling.
/// - `bearer` is attached as an `Authorization: Bearer` header by transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Additional headers, in configuration order.
    pub headers: Vec<(String, String)>,
    /// Optional bearer credential.
    pub bearer: Option<SecretValue>,
    /// Optional request body (JSON text).
    pub body: Option<String>,
}

impl GateRequest {
    /// Builds a bare GET request.
    #[must_use]
    pub const fn get(url: String, bearer: Option<SecretValue>) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            bearer,
            body: None,
        }
    }
}

/// One received HTTP response.
///
/// # Invariants
/// - `body` is bounded by the transport's configured read limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl GateResponse {
    /// Returns true for 2xx status codes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level fetch errors.
///
/// A response with a non-2xx status is not a fetch error: any received
/// response is returned to the caller, which applies its own status policy.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint could not be reached or the request timed out.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),
    /// The request could not be constructed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Backend-agnostic HTTP fetch capability.
pub trait ResponseFetcher {
    /// Issues one HTTP request and returns any received response.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] only for transport-level failures; non-2xx
    /// responses are returned as values.
    fn fetch(&self, request: &GateRequest) -> Result<GateResponse, FetchError>;
}

// ============================================================================
// SECTION: Control Point
// ============================================================================

/// Request payload posted to the control-point webhook.
///
/// # Invariants
/// - Field names follow the webhook contract exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    /// Decision proposed by the mode executor.
    pub proposed_action: GateDecision,
    /// Raw body of the last fetched response, when one was received.
    pub raw_response_body: Option<String>,
    /// Expression evaluations backing the proposal.
    pub evaluated_expressions: Vec<EvaluationRecord>,
    /// Pipeline run identity.
    pub pipeline_context: PipelineContext,
}

/// Well-formed control-point response.
///
/// # Invariants
/// - `action` is one of `Pass`, `Pause`, `Break`; any other shape is a
///   [`ControlPointError`], not an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideResponse {
    /// Overriding action.
    pub action: GateDecision,
}

/// Control-point call errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ControlPointError {
    /// The webhook could not be reached.
    #[error("control point unreachable: {0}")]
    Unreachable(String),
    /// The webhook responded with an unusable body.
    #[error("control point response malformed: {0}")]
    Malformed(String),
}

/// Backend-agnostic control-point webhook client.
pub trait ControlPoint {
    /// Posts the override request and parses the webhook's verdict.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPointError`] when the webhook is unreachable or its
    /// response does not carry a valid `action` field.
    fn review(&self, url: &str, request: &OverrideRequest)
    -> Result<OverrideResponse, ControlPointError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Monotonic clock with a blocking sleep, injectable for tests.
pub trait Clock {
    /// Returns the monotonic reading since the clock's origin.
    fn now(&self) -> Duration;

    /// Blocks the calling thread for the given duration.
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug)]
pub struct SystemClock {
    /// Origin instant for monotonic readings.
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Cooperative cancellation flag checked at poll-loop boundaries.
///
/// # Invariants
/// - Cancellation is sticky: once set, the token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    /// Shared cancellation flag.
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once the token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
