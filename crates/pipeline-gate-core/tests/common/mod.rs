// crates/pipeline-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared stub collaborators for gate runtime tests.
// Purpose: Provide scripted fetchers, a manual clock, and control-point stubs
//          for deterministic testing without a network.
// Dependencies: pipeline-gate-core
// ============================================================================

//! ## Overview
//! This module provides the stub collaborators shared across the runtime test
//! files: a scripted [`pipeline_gate_core::ResponseFetcher`], a manually
//! advanced [`pipeline_gate_core::Clock`], a recording telemetry sink, and a
//! scripted control point.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::time::Duration;

use pipeline_gate_core::Clock;
use pipeline_gate_core::ControlPoint;
use pipeline_gate_core::ControlPointError;
use pipeline_gate_core::EvaluationEvent;
use pipeline_gate_core::FetchError;
use pipeline_gate_core::FetchEvent;
use pipeline_gate_core::FinalDecision;
use pipeline_gate_core::GateDecision;
use pipeline_gate_core::GateRequest;
use pipeline_gate_core::GateResponse;
use pipeline_gate_core::GateTelemetry;
use pipeline_gate_core::OverrideEvent;
use pipeline_gate_core::OverrideRequest;
use pipeline_gate_core::OverrideResponse;
use pipeline_gate_core::PipelineContext;
use pipeline_gate_core::PollEvent;
use pipeline_gate_core::ResponseFetcher;

// ============================================================================
// SECTION: Pipeline Context
// ============================================================================

/// Returns a fixed pipeline context for runtime tests.
pub fn sample_context() -> PipelineContext {
    PipelineContext {
        run_id: "run-42".to_string(),
        repository: "octo/widgets".to_string(),
        branch: "main".to_string(),
        timestamp: "2026-08-04T12:00:00Z".to_string(),
    }
}

// ============================================================================
// SECTION: Scripted Fetcher
// ============================================================================

/// One scripted fetch outcome.
#[derive(Debug, Clone)]
pub enum ScriptedFetch {
    /// Respond with the given status and body.
    Respond(u16, String),
    /// Fail as an unreachable endpoint.
    Unreachable,
}

/// Fetcher that replays a script; the final step repeats indefinitely.
pub struct ScriptedFetcher {
    /// Remaining scripted steps; the last entry is never popped.
    script: Mutex<Vec<ScriptedFetch>>,
    /// Requests observed, in call order.
    requests: Mutex<Vec<GateRequest>>,
}

impl ScriptedFetcher {
    /// Creates a fetcher replaying the given steps in order.
    pub fn new(steps: Vec<ScriptedFetch>) -> Self {
        assert!(!steps.is_empty(), "fetch script must not be empty");
        Self {
            script: Mutex::new(steps),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a fetcher that always responds with the given status and body.
    pub fn responding(status: u16, body: &str) -> Self {
        Self::new(vec![ScriptedFetch::Respond(status, body.to_string())])
    }

    /// Returns the requests observed so far.
    pub fn requests(&self) -> Vec<GateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the number of fetches issued.
    pub fn fetch_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl ResponseFetcher for ScriptedFetcher {
    fn fetch(&self, request: &GateRequest) -> Result<GateResponse, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut script = self.script.lock().unwrap();
        let step = if script.len() > 1 { script.remove(0) } else { script[0].clone() };
        match step {
            ScriptedFetch::Respond(status, body) => Ok(GateResponse {
                status,
                body: body.into_bytes(),
            }),
            ScriptedFetch::Unreachable => {
                Err(FetchError::Unreachable("connection refused".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Manual Clock
// ============================================================================

/// Clock advanced only by its own `sleep` calls.
#[derive(Debug, Default)]
pub struct ManualClock {
    /// Simulated monotonic reading.
    now: Mutex<Duration>,
    /// Sleeps observed, in call order.
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Creates a clock at origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of sleeps observed.
    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        *self.now.lock().unwrap() += duration;
    }
}

// ============================================================================
// SECTION: Recording Telemetry
// ============================================================================

/// Telemetry sink recording poll attempts and override outcomes.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    /// Poll attempt numbers observed.
    polls: Mutex<Vec<u32>>,
    /// Override event labels observed.
    overrides: Mutex<Vec<String>>,
}

impl RecordingTelemetry {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the observed poll attempt numbers.
    pub fn polls(&self) -> Vec<u32> {
        self.polls.lock().unwrap().clone()
    }

    /// Returns the observed override event labels.
    pub fn overrides(&self) -> Vec<String> {
        self.overrides.lock().unwrap().clone()
    }
}

impl GateTelemetry for RecordingTelemetry {
    fn record_fetch(&self, _event: FetchEvent) {}

    fn record_evaluation(&self, _event: EvaluationEvent) {}

    fn record_poll(&self, event: PollEvent) {
        self.polls.lock().unwrap().push(event.attempt);
    }

    fn record_override(&self, event: OverrideEvent) {
        let label = match event {
            OverrideEvent::Applied {
                action,
            } => format!("applied:{action}"),
            OverrideEvent::Failed {
                ..
            } => "failed".to_string(),
        };
        self.overrides.lock().unwrap().push(label);
    }

    fn record_decision(&self, _decision: FinalDecision) {}
}

// ============================================================================
// SECTION: Scripted Control Point
// ============================================================================

/// Behavior of the scripted control point.
#[derive(Debug, Clone, Copy)]
pub enum ControlPointScript {
    /// Return a well-formed override with the given action.
    Override(GateDecision),
    /// Fail as an unreachable webhook.
    Unreachable,
    /// Fail as a malformed response.
    Malformed,
}

/// Control point that replays one scripted behavior.
pub struct ScriptedControlPoint {
    /// Scripted behavior.
    script: ControlPointScript,
    /// Requests observed, in call order.
    requests: Mutex<Vec<OverrideRequest>>,
}

impl ScriptedControlPoint {
    /// Creates a control point with the given behavior.
    pub fn new(script: ControlPointScript) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns the requests observed so far.
    pub fn requests(&self) -> Vec<OverrideRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ControlPoint for ScriptedControlPoint {
    fn review(
        &self,
        _url: &str,
        request: &OverrideRequest,
    ) -> Result<OverrideResponse, ControlPointError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.script {
            ControlPointScript::Override(action) => Ok(OverrideResponse {
                action,
            }),
            ControlPointScript::Unreachable => {
                Err(ControlPointError::Unreachable("connection refused".to_string()))
            }
            ControlPointScript::Malformed => {
                Err(ControlPointError::Malformed("missing `action` field".to_string()))
            }
        }
    }
}
