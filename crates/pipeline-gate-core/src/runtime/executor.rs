// crates/pipeline-gate-core/src/runtime/executor.rs
// ============================================================================
// Module: Gate Mode Executors
// Description: Per-mode orchestration from fetch to proposed decision.
// Purpose: Execute the active mode's protocol deterministically.
// Dependencies: crate::core, crate::document, crate::interfaces,
// crate::runtime::poller, crate::telemetry
// ============================================================================

//! ## Overview
//! The runtime dispatches on the [`ModeConfig`] sum type and runs the active
//! mode's protocol: Basic fetches once and evaluates the success expression;
//! Notify posts the payload and reports delivery; WaitFor polls with the
//! failure expression checked before the success expression; Custom invokes
//! the resolved operation once and applies the same two-expression order.
//! Every path ends in a [`ProposedDecision`]; network failures and malformed
//! bodies map to each mode's documented fallback, never to an abort.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use url::Url;

use crate::core::context::PipelineContext;
use crate::core::decision::DecisionReason;
use crate::core::decision::EvaluationRecord;
use crate::core::decision::ExpressionRole;
use crate::core::decision::FallbackAction;
use crate::core::decision::GateDecision;
use crate::core::decision::ProposedDecision;
use crate::core::mode::BasicMode;
use crate::core::mode::CustomMode;
use crate::core::mode::GateExpression;
use crate::core::mode::ModeConfig;
use crate::core::mode::NotifyMode;
use crate::core::mode::WaitForMode;
use crate::document::DocumentFormat;
use crate::document::ResponseDocument;
use crate::interfaces::CancelToken;
use crate::interfaces::Clock;
use crate::interfaces::FetchError;
use crate::interfaces::GateRequest;
use crate::interfaces::GateResponse;
use crate::interfaces::HttpMethod;
use crate::interfaces::ResponseFetcher;
use crate::runtime::poller::PollOutcome;
use crate::runtime::poller::PollSchedule;
use crate::runtime::poller::PollStep;
use crate::runtime::poller::run_poll;
use crate::telemetry::EvaluationEvent;
use crate::telemetry::FetchEvent;
use crate::telemetry::FetchOutcome;
use crate::telemetry::GateTelemetry;

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// Mode executor with injected collaborators.
///
/// # Invariants
/// - Execution is single-threaded and synchronous; collaborators are shared
///   by reference and never mutated.
pub struct GateRuntime<'a> {
    /// HTTP fetch capability.
    fetcher: &'a dyn ResponseFetcher,
    /// Monotonic clock for polling.
    clock: &'a dyn Clock,
    /// Cooperative cancellation flag.
    cancel: &'a CancelToken,
    /// Telemetry sink.
    telemetry: &'a dyn GateTelemetry,
}

impl<'a> GateRuntime<'a> {
    /// Creates a runtime over the given collaborators.
    #[must_use]
    pub const fn new(
        fetcher: &'a dyn ResponseFetcher,
        clock: &'a dyn Clock,
        cancel: &'a CancelToken,
        telemetry: &'a dyn GateTelemetry,
    ) -> Self {
        Self {
            fetcher,
            clock,
            cancel,
            telemetry,
        }
    }

    /// Executes the active mode and returns the proposed decision.
    #[must_use]
    pub fn execute(&self, mode: &ModeConfig, context: &PipelineContext) -> ProposedDecision {
        match mode {
            ModeConfig::Basic(basic) => self.execute_basic(basic),
            ModeConfig::AdvancedNotify(notify) => self.execute_notify(notify, context),
            ModeConfig::AdvancedWaitFor(wait_for) => self.execute_wait_for(wait_for, context),
            ModeConfig::Custom(custom) => self.execute_custom(custom),
        }
    }

    // ------------------------------------------------------------------
    // Basic
    // ------------------------------------------------------------------

    /// One fetch, one success expression.
    fn execute_basic(&self, mode: &BasicMode) -> ProposedDecision {
        let request = GateRequest::get(mode.url.clone(), mode.bearer.clone());
        let response = match self.fetch(&request) {
            Ok(response) => response,
            Err(_) => return unreachable_decision(),
        };
        let document = self.sniff_document(mode.success.primary_format(), &response);
        self.decide_from_document(&document, &mode.success, None, mode.fallback)
    }

    // ------------------------------------------------------------------
    // Advanced / Notify
    // ------------------------------------------------------------------

    /// One POST of the payload template with the injected context object.
    fn execute_notify(&self, mode: &NotifyMode, context: &PipelineContext) -> ProposedDecision {
        let mut payload = mode.payload.clone();
        if let Value::Object(map) = &mut payload {
            map.insert("context".to_string(), context.notify_object());
        }
        let request = GateRequest {
            method: HttpMethod::Post,
            url: mode.url.clone(),
            headers: Vec::new(),
            bearer: mode.bearer.clone(),
            body: Some(payload.to_string()),
        };
        match self.fetch(&request) {
            Ok(response) if response.is_success() => ProposedDecision {
                action: GateDecision::Pass,
                reason: DecisionReason::NotifyDelivered,
                evaluations: Vec::new(),
                raw_body: None,
            },
            Ok(_) | Err(_) => ProposedDecision {
                action: GateDecision::Break,
                reason: DecisionReason::NotifyFailed,
                evaluations: Vec::new(),
                raw_body: None,
            },
        }
    }

    // ------------------------------------------------------------------
    // Advanced / WaitFor
    // ------------------------------------------------------------------

    /// Bounded polling with failure checked before success each iteration.
    fn execute_wait_for(&self, mode: &WaitForMode, context: &PipelineContext) -> ProposedDecision {
        let url = match poll_url(&mode.url, &context.run_id) {
            Ok(url) => url,
            Err(_) => return unreachable_decision(),
        };
        let request = GateRequest::get(url, mode.bearer.clone());
        let preferred = mode.success.primary_format();
        let schedule = PollSchedule {
            timeout: mode.timeout,
            interval: mode.poll_interval,
        };

        let mut last_evaluations: Vec<EvaluationRecord> = Vec::new();
        let mut last_body: Option<String> = None;
        let outcome = run_poll(schedule, self.clock, self.cancel, self.telemetry, |_attempt| {
            let response = match self.fetch(&request) {
                Ok(response) => response,
                Err(_) => return PollStep::Continue,
            };
            let document = self.sniff_document(preferred, &response);
            last_body = Some(document.raw_body().to_string());

            let mut evaluations = Vec::new();
            if let Some(failure) = &mode.failure {
                let (matched, record) =
                    self.evaluate_recorded(failure, ExpressionRole::Failure, &document);
                evaluations.push(record);
                if matched {
                    return PollStep::Complete(ProposedDecision {
                        action: GateDecision::Break,
                        reason: DecisionReason::FailureMatched,
                        evaluations,
                        raw_body: last_body.clone(),
                    });
                }
            }
            let (matched, record) =
                self.evaluate_recorded(&mode.success, ExpressionRole::Success, &document);
            evaluations.push(record);
            if matched {
                return PollStep::Complete(ProposedDecision {
                    action: GateDecision::Pass,
                    reason: DecisionReason::ExpressionMatched,
                    evaluations,
                    raw_body: last_body.clone(),
                });
            }
            last_evaluations = evaluations;
            PollStep::Continue
        });

        match outcome {
            PollOutcome::Decided(decision) => decision,
            PollOutcome::TimedOut => ProposedDecision {
                action: mode.fallback.decision(),
                reason: DecisionReason::PollTimeout,
                evaluations: last_evaluations,
                raw_body: last_body,
            },
            PollOutcome::Cancelled => ProposedDecision {
                action: GateDecision::Break,
                reason: DecisionReason::Cancelled,
                evaluations: last_evaluations,
                raw_body: last_body,
            },
        }
    }

    // ------------------------------------------------------------------
    // Custom
    // ------------------------------------------------------------------

    /// One invocation of the resolved operation, two-expression evaluation.
    fn execute_custom(&self, mode: &CustomMode) -> ProposedDecision {
        let response = match self.fetch(&mode.request) {
            Ok(response) => response,
            Err(_) => return unreachable_decision(),
        };
        let document = self.sniff_document(mode.success.primary_format(), &response);
        self.decide_from_document(&document, &mode.success, mode.failure.as_ref(), mode.fallback)
    }

    // ------------------------------------------------------------------
    // Shared
    // ------------------------------------------------------------------

    /// Issues one fetch and records its outcome.
    fn fetch(&self, request: &GateRequest) -> Result<GateResponse, FetchError> {
        match self.fetcher.fetch(request) {
            Ok(response) => {
                self.telemetry.record_fetch(FetchEvent {
                    url: request.url.clone(),
                    outcome: FetchOutcome::Response(response.status),
                });
                Ok(response)
            }
            Err(err) => {
                self.telemetry.record_fetch(FetchEvent {
                    url: request.url.clone(),
                    outcome: FetchOutcome::Unreachable,
                });
                Err(err)
            }
        }
    }

    /// Parses the response body, preferring the expression's format.
    ///
    /// A body that parses for neither format is carried unparsed, so every
    /// path resolves to zero nodes and the evaluation fails closed.
    fn sniff_document(&self, preferred: DocumentFormat, response: &GateResponse) -> ResponseDocument {
        let fallback = match preferred {
            DocumentFormat::Json => DocumentFormat::Xml,
            DocumentFormat::Xml => DocumentFormat::Json,
        };
        ResponseDocument::parse(preferred, &response.body)
            .or_else(|_| ResponseDocument::parse(fallback, &response.body))
            .unwrap_or_else(|_| ResponseDocument::unparsed(preferred, &response.body))
    }

    /// Evaluates one expression and records the outcome.
    fn evaluate_recorded(
        &self,
        expression: &GateExpression,
        role: ExpressionRole,
        document: &ResponseDocument,
    ) -> (bool, EvaluationRecord) {
        let outcome = expression.evaluate(document);
        self.telemetry.record_evaluation(EvaluationEvent {
            expression: expression.source().to_string(),
            role,
            outcome,
        });
        (
            outcome,
            EvaluationRecord {
                expression: expression.source().to_string(),
                role,
                outcome,
            },
        )
    }

    /// Applies failure-then-success evaluation to one fetched document.
    fn decide_from_document(
        &self,
        document: &ResponseDocument,
        success: &GateExpression,
        failure: Option<&GateExpression>,
        fallback: FallbackAction,
    ) -> ProposedDecision {
        let raw_body = Some(document.raw_body().to_string());
        let mut evaluations = Vec::new();
        if let Some(failure) = failure {
            let (matched, record) =
                self.evaluate_recorded(failure, ExpressionRole::Failure, document);
            evaluations.push(record);
            if matched {
                return ProposedDecision {
                    action: GateDecision::Break,
                    reason: DecisionReason::FailureMatched,
                    evaluations,
                    raw_body,
                };
            }
        }
        let (matched, record) = self.evaluate_recorded(success, ExpressionRole::Success, document);
        evaluations.push(record);
        if matched {
            ProposedDecision {
                action: GateDecision::Pass,
                reason: DecisionReason::ExpressionMatched,
                evaluations,
                raw_body,
            }
        } else {
            ProposedDecision {
                action: fallback.decision(),
                reason: DecisionReason::ExpressionUnmatched,
                evaluations,
                raw_body,
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the proposed decision for an unreachable endpoint.
fn unreachable_decision() -> ProposedDecision {
    ProposedDecision {
        action: GateDecision::Break,
        reason: DecisionReason::EndpointUnreachable,
        evaluations: Vec::new(),
        raw_body: None,
    }
}

/// Appends the `runId` query parameter to the polling base URL.
fn poll_url(base: &str, run_id: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("runId", run_id);
    Ok(url.to_string())
}
