// crates/pipeline-gate-core/src/lib.rs
// ============================================================================
// Module: Pipeline Gate Core
// Description: Decision engine for policy-driven pipeline gates.
// Purpose: Parse gate expressions, evaluate remote state, and render one of
//          Pass, Pause, or Break per invocation.
// Dependencies: jsonpath_lib, roxmltree, serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! Pipeline Gate core is a single-invocation decision engine: it inspects a
//! remote system's state (JSON or XML over HTTP), evaluates the configured
//! Eval DSL expressions against the response, and proposes Pass, Pause, or
//! Break. The crate is pure orchestration: HTTP, secrets, and the clock are
//! injected through the [`interfaces`] traits, so every behavior is testable
//! without a network.
//!
//! Invariants:
//! - One invocation produces exactly one decision; every failure mode maps
//!   to a decision except pre-flight configuration errors.
//! - Expression evaluation is pure and deterministic.
//!
//! Security posture: response bodies, control-point replies, and expression
//! text are untrusted inputs; parsing is bounded and comparisons fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod document;
pub mod dsl;
pub mod interfaces;
pub mod runtime;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::context::PipelineContext;
pub use crate::core::context::TemplateError;
pub use crate::core::context::render_template;
pub use crate::core::decision::DecisionReason;
pub use crate::core::decision::EvaluationRecord;
pub use crate::core::decision::ExpressionRole;
pub use crate::core::decision::FallbackAction;
pub use crate::core::decision::FinalDecision;
pub use crate::core::decision::GateDecision;
pub use crate::core::decision::ProposedDecision;
pub use crate::core::mode::BasicMode;
pub use crate::core::mode::CustomMode;
pub use crate::core::mode::GateExpression;
pub use crate::core::mode::ModeConfig;
pub use crate::core::mode::NotifyMode;
pub use crate::core::mode::OperationError;
pub use crate::core::mode::OperationSpec;
pub use crate::core::mode::ParamBinding;
pub use crate::core::mode::ParamLocation;
pub use crate::core::mode::WaitForMode;
pub use document::DocumentError;
pub use document::DocumentFormat;
pub use document::ResolvedNode;
pub use document::ResponseDocument;
pub use dsl::SyntaxError;
pub use interfaces::CancelToken;
pub use interfaces::Clock;
pub use interfaces::ControlPoint;
pub use interfaces::ControlPointError;
pub use interfaces::FetchError;
pub use interfaces::GateRequest;
pub use interfaces::GateResponse;
pub use interfaces::HttpMethod;
pub use interfaces::OverrideRequest;
pub use interfaces::OverrideResponse;
pub use interfaces::ResponseFetcher;
pub use interfaces::SecretError;
pub use interfaces::SecretStore;
pub use interfaces::SecretValue;
pub use interfaces::SystemClock;
pub use runtime::executor::GateRuntime;
pub use runtime::poller::PollOutcome;
pub use runtime::poller::PollSchedule;
pub use runtime::poller::PollStep;
pub use runtime::poller::run_poll;
pub use runtime::resolver::DecisionResolver;
pub use telemetry::EvaluationEvent;
pub use telemetry::FetchEvent;
pub use telemetry::FetchOutcome;
pub use telemetry::GateTelemetry;
pub use telemetry::NoopTelemetry;
pub use telemetry::OverrideEvent;
pub use telemetry::PollEvent;
