// crates/pipeline-gate-core/tests/resolver.rs
// ============================================================================
// Module: Decision Resolver Tests
// Description: Control-point override resolution for proposed decisions.
// Purpose: Pin the absolute-override contract and the stand-on-failure policy.
// Dependencies: pipeline-gate-core
// ============================================================================

//! Resolver tests: a well-formed override replaces the proposal
//! unconditionally, any control-point failure leaves it standing, and the
//! webhook payload carries the full audit context.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

mod common;

use pipeline_gate_core::DecisionReason;
use pipeline_gate_core::DecisionResolver;
use pipeline_gate_core::EvaluationRecord;
use pipeline_gate_core::ExpressionRole;
use pipeline_gate_core::GateDecision;
use pipeline_gate_core::ProposedDecision;

use crate::common::ControlPointScript;
use crate::common::RecordingTelemetry;
use crate::common::ScriptedControlPoint;
use crate::common::sample_context;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Returns a Break proposal with one recorded evaluation.
fn break_proposal() -> ProposedDecision {
    ProposedDecision {
        action: GateDecision::Break,
        reason: DecisionReason::FailureMatched,
        evaluations: vec![EvaluationRecord {
            expression: "jsonpath($.blocked) == true".to_string(),
            role: ExpressionRole::Failure,
            outcome: true,
        }],
        raw_body: Some(r#"{"blocked": true}"#.to_string()),
    }
}

// ============================================================================
// SECTION: Override Application
// ============================================================================

#[test]
fn no_configured_control_point_keeps_the_proposal() {
    let control_point = ScriptedControlPoint::new(ControlPointScript::Override(GateDecision::Pass));
    let telemetry = RecordingTelemetry::new();
    let resolver = DecisionResolver::new(None, &control_point, &telemetry);
    let decision = resolver.resolve(&break_proposal(), &sample_context());
    assert_eq!(decision.action, GateDecision::Break);
    assert_eq!(decision.reason, DecisionReason::FailureMatched);
    assert!(!decision.overridden);
    // The webhook is never consulted.
    assert!(control_point.requests().is_empty());
}

#[test]
fn a_well_formed_override_is_absolute() {
    let control_point = ScriptedControlPoint::new(ControlPointScript::Override(GateDecision::Pass));
    let telemetry = RecordingTelemetry::new();
    let resolver =
        DecisionResolver::new(Some("http://control.internal/review"), &control_point, &telemetry);
    let decision = resolver.resolve(&break_proposal(), &sample_context());
    assert_eq!(decision.action, GateDecision::Pass);
    assert_eq!(decision.reason, DecisionReason::Overridden);
    assert!(decision.overridden);
    assert_eq!(telemetry.overrides(), ["applied:Pass"]);
}

#[test]
fn the_webhook_payload_carries_the_audit_context() {
    let control_point =
        ScriptedControlPoint::new(ControlPointScript::Override(GateDecision::Pause));
    let telemetry = RecordingTelemetry::new();
    let resolver =
        DecisionResolver::new(Some("http://control.internal/review"), &control_point, &telemetry);
    let _ = resolver.resolve(&break_proposal(), &sample_context());

    let requests = control_point.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].proposed_action, GateDecision::Break);
    assert_eq!(requests[0].raw_response_body.as_deref(), Some(r#"{"blocked": true}"#));
    assert_eq!(requests[0].evaluated_expressions.len(), 1);
    assert_eq!(requests[0].pipeline_context, sample_context());
}

// ============================================================================
// SECTION: Failure Recovery
// ============================================================================

#[test]
fn an_unreachable_webhook_leaves_the_proposal_standing() {
    let control_point = ScriptedControlPoint::new(ControlPointScript::Unreachable);
    let telemetry = RecordingTelemetry::new();
    let resolver =
        DecisionResolver::new(Some("http://control.internal/review"), &control_point, &telemetry);
    let decision = resolver.resolve(&break_proposal(), &sample_context());
    assert_eq!(decision.action, GateDecision::Break);
    assert_eq!(decision.reason, DecisionReason::FailureMatched);
    assert!(!decision.overridden);
    assert_eq!(telemetry.overrides(), ["failed"]);
}

#[test]
fn a_malformed_response_leaves_the_proposal_standing() {
    let control_point = ScriptedControlPoint::new(ControlPointScript::Malformed);
    let telemetry = RecordingTelemetry::new();
    let resolver =
        DecisionResolver::new(Some("http://control.internal/review"), &control_point, &telemetry);
    let decision = resolver.resolve(&break_proposal(), &sample_context());
    assert_eq!(decision.action, GateDecision::Break);
    assert!(!decision.overridden);
}
