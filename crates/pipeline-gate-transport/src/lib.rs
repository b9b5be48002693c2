// crates/pipeline-gate-transport/src/lib.rs
// ============================================================================
// Module: Pipeline Gate Transport
// Description: Blocking HTTP implementations of the core transport traits.
// Purpose: Provide the network boundary for gate fetch and override calls.
// Dependencies: pipeline-gate-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! This crate ships the blocking HTTP client behind the core's
//! [`pipeline_gate_core::ResponseFetcher`] and
//! [`pipeline_gate_core::ControlPoint`] traits. Requests are bounded: hard
//! timeout, no redirects, limited response reads.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::HttpClientConfig;
pub use http::HttpClientError;
pub use http::HttpGateClient;
