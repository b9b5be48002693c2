// crates/pipeline-gate-core/src/telemetry.rs
// ============================================================================
// Module: Gate Telemetry
// Description: Observability hooks for fetches, evaluations, and overrides.
// Purpose: Provide progress and failure events without hard dependencies.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! This module exposes a thin event interface for gate progress: fetch
//! outcomes, expression evaluations, poll attempts, override results, and the
//! final decision. It is intentionally dependency-light so hosts can plug in
//! structured logging or metrics without redesign; the engine itself never
//! writes to stdio.
//!
//! Security posture: events must avoid leaking secrets; request credentials
//! are never part of an event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::core::decision::ExpressionRole;
use crate::core::decision::FinalDecision;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Outcome classification for one fetch.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A response was received with the given status.
    Response(u16),
    /// The endpoint could not be reached.
    Unreachable,
}

/// Fetch event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchEvent {
    /// Request URL.
    pub url: String,
    /// Fetch outcome.
    pub outcome: FetchOutcome,
}

/// Expression evaluation event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationEvent {
    /// Expression source text.
    pub expression: String,
    /// Role the expression played.
    pub role: ExpressionRole,
    /// Boolean outcome.
    pub outcome: bool,
}

/// Poll attempt event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollEvent {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Elapsed time since loop start.
    pub elapsed: Duration,
}

/// Override resolution event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideEvent {
    /// The control point replaced the proposed action.
    Applied {
        /// Label of the overriding action.
        action: &'static str,
    },
    /// The control point could not override; the proposal stands.
    Failed {
        /// Failure detail.
        detail: String,
    },
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Event sink for gate progress and failures.
pub trait GateTelemetry: Send + Sync {
    /// Records a fetch outcome.
    fn record_fetch(&self, event: FetchEvent);
    /// Records an expression evaluation.
    fn record_evaluation(&self, event: EvaluationEvent);
    /// Records a poll attempt.
    fn record_poll(&self, event: PollEvent);
    /// Records an override resolution.
    fn record_override(&self, event: OverrideEvent);
    /// Records the final decision.
    fn record_decision(&self, decision: FinalDecision);
}

/// No-op telemetry sink.
///
/// # Invariants
/// - Events are intentionally discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl GateTelemetry for NoopTelemetry {
    fn record_fetch(&self, _event: FetchEvent) {}

    fn record_evaluation(&self, _event: EvaluationEvent) {}

    fn record_poll(&self, _event: PollEvent) {}

    fn record_override(&self, _event: OverrideEvent) {}

    fn record_decision(&self, _decision: FinalDecision) {}
}
