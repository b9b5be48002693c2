// crates/pipeline-gate-cli/src/main.rs
// ============================================================================
// Module: Pipeline Gate CLI Entry Point
// Description: Single-invocation gate binary for CI/CD pipelines.
// Purpose: Load configuration, execute the configured mode, and map the
//          final decision to a process exit code.
// Dependencies: clap, pipeline-gate-config, pipeline-gate-core,
// pipeline-gate-transport, tokio
// ============================================================================

//! ## Overview
//! The gate binary runs one decision: configuration is loaded from the
//! environment before any network activity, the configured mode executes on a
//! blocking worker, and the final decision becomes the exit code: Pass is 0,
//! Pause is 70, Break is 71, and any configuration error is 78 without a
//! decision. A SIGINT flips the cancellation token checked at poll-loop
//! boundaries, so an interrupted WaitFor reports Break with reason
//! `cancelled` instead of silently truncating.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use pipeline_gate_config::ConfigError;
use pipeline_gate_config::EnvSecretStore;
use pipeline_gate_config::EnvSource;
use pipeline_gate_config::GateConfig;
use pipeline_gate_core::CancelToken;
use pipeline_gate_core::DecisionReason;
use pipeline_gate_core::DecisionResolver;
use pipeline_gate_core::EvaluationEvent;
use pipeline_gate_core::ExpressionRole;
use pipeline_gate_core::FetchEvent;
use pipeline_gate_core::FetchOutcome;
use pipeline_gate_core::FinalDecision;
use pipeline_gate_core::GateRuntime;
use pipeline_gate_core::GateTelemetry;
use pipeline_gate_core::NoopTelemetry;
use pipeline_gate_core::OverrideEvent;
use pipeline_gate_core::PollEvent;
use pipeline_gate_core::SystemClock;
use pipeline_gate_transport::HttpClientConfig;
use pipeline_gate_transport::HttpClientError;
use pipeline_gate_transport::HttpGateClient;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Exit code for pre-flight configuration failures.
const EXIT_CONFIG_ERROR: u8 = 78;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Policy-driven pipeline gate: evaluates remote state and exits with
/// Pass (0), Pause (70), or Break (71).
#[derive(Debug, Parser)]
#[command(name = "pipeline-gate", version)]
struct Cli {
    /// Validate configuration and exit without contacting any endpoint.
    #[arg(long)]
    check: bool,
    /// Suppress progress output on stderr.
    #[arg(long)]
    quiet: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pre-flight failures that end the invocation without a decision.
#[derive(Debug)]
enum PreflightError {
    /// Configuration loading or validation failed.
    Config(ConfigError),
    /// The HTTP client could not be constructed.
    Transport(HttpClientError),
}

impl std::fmt::Display for PreflightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            let _ = write_stderr_line(&err.to_string());
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

/// Loads configuration, executes the gate, and maps the decision.
async fn run(cli: Cli) -> Result<ExitCode, PreflightError> {
    let config = GateConfig::load(&EnvSource::process(), &EnvSecretStore::process())
        .map_err(PreflightError::Config)?;
    if cli.check {
        return Ok(ExitCode::SUCCESS);
    }

    let cancel = CancelToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let quiet = cli.quiet;
    let decision = tokio::task::spawn_blocking(move || run_gate(&config, &cancel, quiet))
        .await
        .map_err(|err| {
            PreflightError::Transport(HttpClientError::Build(format!("gate worker: {err}")))
        })??;
    Ok(ExitCode::from(decision.action.exit_code()))
}

/// Executes the configured mode and resolves the final decision.
///
/// Runs on a blocking worker: transport is synchronous by design so the
/// decision path stays deterministic and auditable.
fn run_gate(
    config: &GateConfig,
    cancel: &CancelToken,
    quiet: bool,
) -> Result<FinalDecision, PreflightError> {
    let telemetry: Box<dyn GateTelemetry> =
        if quiet { Box::new(NoopTelemetry) } else { Box::new(StderrTelemetry) };
    let transport = HttpGateClient::new(HttpClientConfig {
        timeout: config.request_timeout,
        ..HttpClientConfig::default()
    })
    .map_err(PreflightError::Transport)?;
    let clock = SystemClock::new();

    let runtime = GateRuntime::new(&transport, &clock, cancel, telemetry.as_ref());
    let proposed = runtime.execute(&config.mode, &config.context);

    let resolver = DecisionResolver::new(
        config.control_point_url.as_deref(),
        &transport,
        telemetry.as_ref(),
    );
    let decision = resolver.resolve(&proposed, &config.context);
    telemetry.record_decision(decision);
    Ok(decision)
}

// ============================================================================
// SECTION: Stderr Telemetry
// ============================================================================

/// Telemetry sink writing one line per event to stderr.
struct StderrTelemetry;

impl GateTelemetry for StderrTelemetry {
    fn record_fetch(&self, event: FetchEvent) {
        let line = match event.outcome {
            FetchOutcome::Response(status) => format!("fetch {}: status {status}", event.url),
            FetchOutcome::Unreachable => format!("fetch {}: unreachable", event.url),
        };
        let _ = write_stderr_line(&line);
    }

    fn record_evaluation(&self, event: EvaluationEvent) {
        let _ = write_stderr_line(&format!(
            "evaluate [{}] {} => {}",
            role_label(event.role),
            event.expression,
            event.outcome
        ));
    }

    fn record_poll(&self, event: PollEvent) {
        let _ = write_stderr_line(&format!(
            "poll attempt {} ({}s elapsed)",
            event.attempt,
            event.elapsed.as_secs()
        ));
    }

    fn record_override(&self, event: OverrideEvent) {
        let line = match event {
            OverrideEvent::Applied {
                action,
            } => format!("control point override applied: {action}"),
            OverrideEvent::Failed {
                detail,
            } => format!("control point unavailable, proposed decision stands: {detail}"),
        };
        let _ = write_stderr_line(&line);
    }

    fn record_decision(&self, decision: FinalDecision) {
        let _ = write_stderr_line(&format!(
            "gate decision: {} ({})",
            decision.action,
            reason_label(decision.reason)
        ));
    }
}

/// Returns a stable label for an expression role.
const fn role_label(role: ExpressionRole) -> &'static str {
    match role {
        ExpressionRole::Success => "success",
        ExpressionRole::Failure => "failure",
    }
}

/// Returns a stable label for a decision reason.
const fn reason_label(reason: DecisionReason) -> &'static str {
    reason.as_str()
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}
