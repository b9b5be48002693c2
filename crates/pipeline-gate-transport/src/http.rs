// crates/pipeline-gate-transport/src/http.rs
// ============================================================================
// Module: HTTP Gate Client
// Description: Blocking HTTP implementation of the gate transport traits.
// Purpose: Issue bounded requests for fetch, notify, and control-point calls.
// Dependencies: pipeline-gate-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The HTTP client issues bounded, blocking requests: a hard request timeout,
//! redirects disabled, a stable user agent, and a size limit on response
//! reads. It returns any received response (status policy belongs to the
//! runtime) and fails only on transport-level errors, which the runtime maps
//! to each mode's fallback.
//!
//! Security posture: endpoints are operator-configured but responses are
//! untrusted; reads are bounded and credentials never appear in errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use pipeline_gate_core::ControlPoint;
use pipeline_gate_core::ControlPointError;
use pipeline_gate_core::FetchError;
use pipeline_gate_core::GateRequest;
use pipeline_gate_core::GateResponse;
use pipeline_gate_core::HttpMethod;
use pipeline_gate_core::OverrideRequest;
use pipeline_gate_core::OverrideResponse;
use pipeline_gate_core::ResponseFetcher;
use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use thiserror::Error;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP gate client.
///
/// # Invariants
/// - `timeout` applies to the full request lifecycle and must be shorter
///   than the poll interval (validated by the configuration layer).
/// - `max_response_bytes` is enforced as a hard upper bound on bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Request timeout for the full request lifecycle.
    pub timeout: Duration,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5_000),
            max_response_bytes: 4 * 1024 * 1024,
            user_agent: "pipeline-gate/0.1".to_string(),
        }
    }
}

/// Errors raised while constructing the HTTP client.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The underlying client could not be built.
    #[error("http client construction failed: {0}")]
    Build(String),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking HTTP client implementing the gate transport traits.
///
/// # Invariants
/// - Redirects are not followed.
/// - Responses exceeding the configured limit fail closed.
pub struct HttpGateClient {
    /// Client configuration, including limits.
    config: HttpClientConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpGateClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError`] when the HTTP client cannot be created.
    pub fn new(config: HttpClientConfig) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| HttpClientError::Build(err.to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Builds a request from the gate request description.
    fn build_request(&self, request: &GateRequest) -> RequestBuilder {
        let mut builder = self.client.request(method_for(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(bearer) = &request.bearer {
            builder = builder.bearer_auth(bearer.expose());
        }
        if let Some(body) = &request.body {
            builder = builder.header("content-type", "application/json").body(body.clone());
        }
        builder
    }
}

impl ResponseFetcher for HttpGateClient {
    fn fetch(&self, request: &GateRequest) -> Result<GateResponse, FetchError> {
        let response = self
            .build_request(request)
            .send()
            .map_err(|err| FetchError::Unreachable(err.to_string()))?;
        let status = response.status().as_u16();
        let body = read_response_limited(response, self.config.max_response_bytes)
            .map_err(FetchError::Unreachable)?;
        Ok(GateResponse {
            status,
            body,
        })
    }
}

impl ControlPoint for HttpGateClient {
    fn review(
        &self,
        url: &str,
        request: &OverrideRequest,
    ) -> Result<OverrideResponse, ControlPointError> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .map_err(|err| ControlPointError::Unreachable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ControlPointError::Malformed(format!(
                "unexpected status {}",
                response.status().as_u16()
            )));
        }
        let body = read_response_limited(response, self.config.max_response_bytes)
            .map_err(ControlPointError::Unreachable)?;
        serde_json::from_slice(&body)
            .map_err(|err| ControlPointError::Malformed(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps the gate method onto the wire method.
fn method_for(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Reads a response body while enforcing a maximum byte limit.
fn read_response_limited(mut response: Response, max_bytes: usize) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    let limit = max_bytes.saturating_add(1);
    let limit = u64::try_from(limit).map_err(|_| "size limit exceeds u64".to_string())?;
    let mut handle = (&mut response).take(limit);
    handle.read_to_end(&mut buf).map_err(|err| err.to_string())?;
    if buf.len() > max_bytes {
        return Err("response body exceeds size limit".to_string());
    }
    Ok(buf)
}
