// crates/pipeline-gate-core/src/runtime/resolver.rs
// ============================================================================
// Module: Decision Resolver
// Description: Control-point override resolution for proposed decisions.
// Purpose: Produce the final gate decision, applying an override when valid.
// Dependencies: crate::core, crate::interfaces, crate::telemetry
// ============================================================================

//! ## Overview
//! The resolver turns a proposed decision into the final one. When a
//! control-point URL is configured it performs one blocking call; a
//! well-formed override replaces the proposal unconditionally: the override
//! is absolute, so operators can implement policy the Eval DSL cannot
//! express. Any failure of the call (unreachable webhook, malformed body,
//! missing `action` field) leaves the proposal standing: the override is an
//! enhancement, not a dependency.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::context::PipelineContext;
use crate::core::decision::DecisionReason;
use crate::core::decision::FinalDecision;
use crate::core::decision::ProposedDecision;
use crate::interfaces::ControlPoint;
use crate::interfaces::OverrideRequest;
use crate::telemetry::GateTelemetry;
use crate::telemetry::OverrideEvent;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves proposed decisions against an optional control point.
pub struct DecisionResolver<'a> {
    /// Configured control-point URL, when overriding is enabled.
    control_point_url: Option<&'a str>,
    /// Control-point webhook client.
    control_point: &'a dyn ControlPoint,
    /// Telemetry sink.
    telemetry: &'a dyn GateTelemetry,
}

impl<'a> DecisionResolver<'a> {
    /// Creates a resolver; `control_point_url` of `None` disables overrides.
    #[must_use]
    pub const fn new(
        control_point_url: Option<&'a str>,
        control_point: &'a dyn ControlPoint,
        telemetry: &'a dyn GateTelemetry,
    ) -> Self {
        Self {
            control_point_url,
            control_point,
            telemetry,
        }
    }

    /// Resolves the proposed decision into the final decision.
    #[must_use]
    pub fn resolve(&self, proposed: &ProposedDecision, context: &PipelineContext) -> FinalDecision {
        let Some(url) = self.control_point_url else {
            return stand(proposed);
        };

        let request = OverrideRequest {
            proposed_action: proposed.action,
            raw_response_body: proposed.raw_body.clone(),
            evaluated_expressions: proposed.evaluations.clone(),
            pipeline_context: context.clone(),
        };
        match self.control_point.review(url, &request) {
            Ok(response) => {
                self.telemetry.record_override(OverrideEvent::Applied {
                    action: response.action.as_str(),
                });
                FinalDecision {
                    action: response.action,
                    reason: DecisionReason::Overridden,
                    overridden: true,
                }
            }
            Err(err) => {
                self.telemetry.record_override(OverrideEvent::Failed {
                    detail: err.to_string(),
                });
                stand(proposed)
            }
        }
    }
}

/// Carries the proposed decision through unchanged.
const fn stand(proposed: &ProposedDecision) -> FinalDecision {
    FinalDecision {
        action: proposed.action,
        reason: proposed.reason,
        overridden: false,
    }
}
