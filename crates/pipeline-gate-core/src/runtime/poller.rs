// crates/pipeline-gate-core/src/runtime/poller.rs
// ============================================================================
// Module: Gate Poller
// Description: Bounded fetch-evaluate loop with deadline and cancellation.
// Purpose: Drive WaitFor iterations against an injected clock.
// Dependencies: crate::interfaces, crate::telemetry
// ============================================================================

//! ## Overview
//! The poller is a single-threaded, synchronous loop: evaluate, check the
//! deadline, check cancellation, sleep, repeat. The deadline check happens
//! after each evaluation, never before a fetch, so a run always gets to
//! evaluate its most recent fetch before declaring timeout, and the loop
//! always terminates within one interval of the deadline. Cancellation is
//! checked only at loop boundaries; an in-flight request carries its own
//! bounded timeout at the transport layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::interfaces::CancelToken;
use crate::interfaces::Clock;
use crate::telemetry::GateTelemetry;
use crate::telemetry::PollEvent;

// ============================================================================
// SECTION: Schedule
// ============================================================================

/// Timing bounds for one polling loop.
///
/// # Invariants
/// - `interval` is nonzero and no longer than `timeout` (validated by the
///   configuration layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    /// Deadline measured from loop start.
    pub timeout: Duration,
    /// Sleep between iterations.
    pub interval: Duration,
}

/// Progress tracker for one polling loop.
///
/// # Invariants
/// - Mutated only by the poller; scoped to a single loop execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PollState {
    /// Clock reading at loop start.
    start: Duration,
    /// Elapsed time since loop start.
    elapsed: Duration,
    /// 1-based attempt counter.
    attempt: u32,
    /// Clock reading at which the loop times out.
    deadline: Duration,
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Verdict of one poll iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    /// The iteration decided the outcome; stop polling.
    Complete(T),
    /// No outcome yet; keep polling.
    Continue,
}

/// Terminal state of a polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// An iteration decided the outcome.
    Decided(T),
    /// The deadline elapsed without a decision.
    TimedOut,
    /// Cancellation was observed between iterations.
    Cancelled,
}

// ============================================================================
// SECTION: Loop
// ============================================================================

/// Runs a bounded polling loop until decided, timed out, or cancelled.
pub fn run_poll<T, F>(
    schedule: PollSchedule,
    clock: &dyn Clock,
    cancel: &CancelToken,
    telemetry: &dyn GateTelemetry,
    mut iteration: F,
) -> PollOutcome<T>
where
    F: FnMut(u32) -> PollStep<T>,
{
    let start = clock.now();
    let mut state = PollState {
        start,
        elapsed: Duration::ZERO,
        attempt: 0,
        deadline: start + schedule.timeout,
    };

    loop {
        state.attempt += 1;
        let step = iteration(state.attempt);
        state.elapsed = clock.now().saturating_sub(state.start);
        telemetry.record_poll(PollEvent {
            attempt: state.attempt,
            elapsed: state.elapsed,
        });
        if let PollStep::Complete(value) = step {
            return PollOutcome::Decided(value);
        }
        if clock.now() >= state.deadline {
            return PollOutcome::TimedOut;
        }
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }
        clock.sleep(schedule.interval);
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }
    }
}
