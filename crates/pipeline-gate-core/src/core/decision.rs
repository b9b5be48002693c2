// crates/pipeline-gate-core/src/core/decision.rs
// ============================================================================
// Module: Gate Decision Model
// Description: Decisions, fallback actions, reasons, and evaluation records.
// Purpose: Capture the terminal outcome of one gate invocation for audit.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A gate invocation produces exactly one [`GateDecision`]: Pass, Pause, or
//! Break. Executors propose a decision with a stable reason and the audit
//! trail of expression evaluations; the resolver may replace the action with
//! a control-point override but always yields one of the three decisions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Gate Decision
// ============================================================================

/// Terminal outcome of one gate invocation.
///
/// # Invariants
/// - Variants are stable for serialization and the control-point contract
///   (`Pass`/`Pause`/`Break`, capitalized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    /// Continue the pipeline.
    Pass,
    /// Stall the pipeline.
    Pause,
    /// Abort the pipeline.
    Break,
}

impl GateDecision {
    /// Returns the process exit code for the decision.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Pause => 70,
            Self::Break => 71,
        }
    }

    /// Returns the decision label used in the control-point contract.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Pause => "Pause",
            Self::Break => "Break",
        }
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Fallback Action
// ============================================================================

/// Configured action when no expression decides the outcome.
///
/// # Invariants
/// - A fallback can never be Pass; only an expression or an override passes
///   the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackAction {
    /// Stall the pipeline.
    Pause,
    /// Abort the pipeline.
    Break,
}

impl FallbackAction {
    /// Returns the decision the fallback maps to.
    #[must_use]
    pub const fn decision(self) -> GateDecision {
        match self {
            Self::Pause => GateDecision::Pause,
            Self::Break => GateDecision::Break,
        }
    }
}

// ============================================================================
// SECTION: Decision Reasons
// ============================================================================

/// Stable reason attached to a decision.
///
/// # Invariants
/// - Variants are stable for serialization and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// The success expression evaluated true.
    ExpressionMatched,
    /// No expression evaluated true; the configured fallback applied.
    ExpressionUnmatched,
    /// The failure expression evaluated true.
    FailureMatched,
    /// The endpoint could not be reached.
    EndpointUnreachable,
    /// The notification was delivered.
    NotifyDelivered,
    /// The notification could not be delivered.
    NotifyFailed,
    /// The polling deadline elapsed.
    PollTimeout,
    /// The invocation was cancelled between poll iterations.
    Cancelled,
    /// A control-point override replaced the proposed decision.
    Overridden,
}

impl DecisionReason {
    /// Returns a stable label for the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExpressionMatched => "expression_matched",
            Self::ExpressionUnmatched => "expression_unmatched",
            Self::FailureMatched => "failure_matched",
            Self::EndpointUnreachable => "endpoint_unreachable",
            Self::NotifyDelivered => "notify_delivered",
            Self::NotifyFailed => "notify_failed",
            Self::PollTimeout => "poll_timeout",
            Self::Cancelled => "cancelled",
            Self::Overridden => "overridden",
        }
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Evaluation Records
// ============================================================================

/// Role an expression plays in a mode's protocol.
///
/// # Invariants
/// - Variants are stable for serialization and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionRole {
    /// Success expression.
    Success,
    /// Failure expression.
    Failure,
}

/// One expression evaluation, recorded for the control-point payload.
///
/// # Invariants
/// - `expression` is the source text as configured, not a re-rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Expression source text.
    pub expression: String,
    /// Role the expression played.
    pub role: ExpressionRole,
    /// Boolean outcome of the evaluation.
    pub outcome: bool,
}

// ============================================================================
// SECTION: Proposed and Final Decisions
// ============================================================================

/// Outcome computed by a mode executor before any override.
///
/// # Invariants
/// - `evaluations` lists records in evaluation order (failure before success
///   where both ran).
/// - `raw_body` carries the last fetched body when one was received.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedDecision {
    /// Proposed action.
    pub action: GateDecision,
    /// Stable reason for the proposal.
    pub reason: DecisionReason,
    /// Expression evaluations backing the proposal.
    pub evaluations: Vec<EvaluationRecord>,
    /// Last fetched response body, when one was received.
    pub raw_body: Option<String>,
}

/// Final decision after override resolution.
///
/// # Invariants
/// - `overridden` is true exactly when a control point replaced the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalDecision {
    /// Final action.
    pub action: GateDecision,
    /// Stable reason for the final action.
    pub reason: DecisionReason,
    /// Indicates a control-point override was applied.
    pub overridden: bool,
}
