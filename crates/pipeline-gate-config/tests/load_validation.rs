// crates/pipeline-gate-config/tests/load_validation.rs
// ============================================================================
// Module: Configuration Loading Tests
// Description: Environment-variable loading and fail-closed validation.
// Purpose: Pin the configuration surface, defaults, and every pre-flight
//          error class against a deterministic environment map.
// Dependencies: pipeline-gate-config, pipeline-gate-core
// ============================================================================

//! Configuration loading tests: mode selection, per-mode requirements and
//! defaults, timing validation, secret resolution, and operation templates,
//! all against the deterministic override map, never the process environment.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::time::Duration;

use pipeline_gate_config::ConfigError;
use pipeline_gate_config::EnvSecretStore;
use pipeline_gate_config::EnvSource;
use pipeline_gate_config::GateConfig;
use pipeline_gate_core::FallbackAction;
use pipeline_gate_core::HttpMethod;
use pipeline_gate_core::ModeConfig;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds an environment map from string pairs.
fn env_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect()
}

/// Loads configuration from the given pairs with an empty secret store.
fn load(pairs: &[(&str, &str)]) -> Result<GateConfig, ConfigError> {
    load_with_secrets(pairs, &[])
}

/// Loads configuration from the given pairs and secret map.
fn load_with_secrets(
    pairs: &[(&str, &str)],
    secrets: &[(&str, &str)],
) -> Result<GateConfig, ConfigError> {
    let env = EnvSource::from_map(env_map(pairs));
    let store = EnvSecretStore::from_map(env_map(secrets));
    GateConfig::load(&env, &store)
}

/// Minimal valid basic-mode environment.
fn basic_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("GATE_MODE", "basic"),
        ("GATE_URL", "http://gate.internal/status"),
        ("GATE_SUCCESS_EVAL", "jsonpath($.status) == 'green'"),
        ("PIPELINE_RUN_ID", "run-42"),
    ]
}

// ============================================================================
// SECTION: Mode Selection
// ============================================================================

#[test]
fn missing_mode_is_a_stable_error() {
    let err = load(&[("PIPELINE_RUN_ID", "run-42")]).unwrap_err();
    assert_eq!(err.to_string(), "missing required configuration `GATE_MODE`");
}

#[test]
fn unknown_mode_is_rejected() {
    let mut env = basic_env();
    env[0] = ("GATE_MODE", "manual");
    let err = load(&env).unwrap_err();
    assert_eq!(err.to_string(), "invalid value for `GATE_MODE`: unknown mode `manual`");
}

#[test]
fn empty_values_count_as_unset() {
    let err = load(&[
        ("GATE_MODE", "  "),
        ("PIPELINE_RUN_ID", "run-42"),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingVar {
            name: "GATE_MODE"
        }
    ));
}

// ============================================================================
// SECTION: Pipeline Context
// ============================================================================

#[test]
fn run_id_is_required() {
    let err = load(&[
        ("GATE_MODE", "basic"),
        ("GATE_URL", "http://gate.internal/status"),
        ("GATE_SUCCESS_EVAL", "jsonpath($.ok) == true"),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingVar {
            name: "PIPELINE_RUN_ID"
        }
    ));
}

#[test]
fn optional_context_fields_default_to_empty() {
    let config = load(&basic_env()).unwrap();
    assert_eq!(config.context.run_id, "run-42");
    assert_eq!(config.context.repository, "");
    assert_eq!(config.context.branch, "");
    // The invocation timestamp is stamped at load.
    assert!(!config.context.timestamp.is_empty());
}

#[test]
fn context_fields_are_carried_verbatim() {
    let mut env = basic_env();
    env.push(("PIPELINE_REPOSITORY", "octo/widgets"));
    env.push(("PIPELINE_BRANCH", "release/1.4"));
    let config = load(&env).unwrap();
    assert_eq!(config.context.repository, "octo/widgets");
    assert_eq!(config.context.branch, "release/1.4");
}

// ============================================================================
// SECTION: Basic Mode
// ============================================================================

#[test]
fn basic_mode_loads_with_defaults() {
    let config = load(&basic_env()).unwrap();
    let ModeConfig::Basic(basic) = &config.mode else {
        panic!("expected basic mode");
    };
    assert_eq!(basic.url, "http://gate.internal/status");
    assert_eq!(basic.fallback, FallbackAction::Break);
    assert!(basic.bearer.is_none());
    assert_eq!(config.request_timeout, Duration::from_millis(5_000));
    assert!(config.control_point_url.is_none());
}

#[test]
fn basic_mode_requires_url_and_success_expression() {
    let err = load(&[
        ("GATE_MODE", "basic"),
        ("GATE_SUCCESS_EVAL", "jsonpath($.ok) == true"),
        ("PIPELINE_RUN_ID", "run-42"),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingVar {
            name: "GATE_URL"
        }
    ));

    let err = load(&[
        ("GATE_MODE", "basic"),
        ("GATE_URL", "http://gate.internal/status"),
        ("PIPELINE_RUN_ID", "run-42"),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingVar {
            name: "GATE_SUCCESS_EVAL"
        }
    ));
}

#[test]
fn malformed_expression_is_a_pre_flight_error() {
    let mut env = basic_env();
    env[2] = ("GATE_SUCCESS_EVAL", "jsonpath($.status) === 'green'");
    let err = load(&env).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Expression {
            name: "GATE_SUCCESS_EVAL",
            ..
        }
    ));
}

#[test]
fn invalid_url_is_rejected() {
    let mut env = basic_env();
    env[1] = ("GATE_URL", "not a url");
    let err = load(&env).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidVar {
            name: "GATE_URL",
            ..
        }
    ));
}

#[test]
fn fallback_action_parses_or_rejects() {
    let mut env = basic_env();
    env.push(("GATE_DEFAULT_ACTION", "pause"));
    let config = load(&env).unwrap();
    let ModeConfig::Basic(basic) = &config.mode else {
        panic!("expected basic mode");
    };
    assert_eq!(basic.fallback, FallbackAction::Pause);

    let mut env = basic_env();
    env.push(("GATE_DEFAULT_ACTION", "abort"));
    assert!(matches!(
        load(&env).unwrap_err(),
        ConfigError::InvalidVar {
            name: "GATE_DEFAULT_ACTION",
            ..
        }
    ));
}

// ============================================================================
// SECTION: Secrets
// ============================================================================

#[test]
fn configured_secret_resolves_to_a_bearer() {
    let mut env = basic_env();
    env.push(("GATE_SECRET_NAME", "GATE_TOKEN"));
    let config = load_with_secrets(&env, &[("GATE_TOKEN", "s3cr3t")]).unwrap();
    let ModeConfig::Basic(basic) = &config.mode else {
        panic!("expected basic mode");
    };
    assert_eq!(basic.bearer.as_ref().unwrap().expose(), "s3cr3t");
}

#[test]
fn missing_secret_is_a_pre_flight_error() {
    let mut env = basic_env();
    env.push(("GATE_SECRET_NAME", "GATE_TOKEN"));
    let err = load(&env).unwrap_err();
    assert_eq!(err.to_string(), "secret `GATE_TOKEN` not found");
}

#[test]
fn secret_values_never_leak_through_debug() {
    let mut env = basic_env();
    env.push(("GATE_SECRET_NAME", "GATE_TOKEN"));
    let config = load_with_secrets(&env, &[("GATE_TOKEN", "s3cr3t")]).unwrap();
    assert!(!format!("{config:?}").contains("s3cr3t"));
}

// ============================================================================
// SECTION: Notify Mode
// ============================================================================

#[test]
fn notify_payload_defaults_to_an_empty_object() {
    let config = load(&[
        ("GATE_MODE", "notify"),
        ("GATE_URL", "http://hooks.internal/gate"),
        ("PIPELINE_RUN_ID", "run-42"),
    ])
    .unwrap();
    let ModeConfig::AdvancedNotify(notify) = &config.mode else {
        panic!("expected notify mode");
    };
    assert_eq!(notify.payload, serde_json::json!({}));
}

#[test]
fn notify_payload_must_be_a_json_object() {
    let err = load(&[
        ("GATE_MODE", "notify"),
        ("GATE_URL", "http://hooks.internal/gate"),
        ("GATE_NOTIFY_PAYLOAD", "[1, 2]"),
        ("PIPELINE_RUN_ID", "run-42"),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidVar {
            name: "GATE_NOTIFY_PAYLOAD",
            ..
        }
    ));
}

// ============================================================================
// SECTION: WaitFor Mode
// ============================================================================

/// Minimal valid waitfor-mode environment.
fn wait_for_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("GATE_MODE", "waitfor"),
        ("GATE_URL", "http://gate.internal/poll"),
        ("GATE_SUCCESS_EVAL", "jsonpath($.state) == 'done'"),
        ("PIPELINE_RUN_ID", "run-42"),
    ]
}

#[test]
fn wait_for_defaults_follow_the_contract() {
    let config = load(&wait_for_env()).unwrap();
    let ModeConfig::AdvancedWaitFor(wait_for) = &config.mode else {
        panic!("expected waitfor mode");
    };
    assert_eq!(wait_for.timeout, Duration::from_secs(1_800));
    assert_eq!(wait_for.poll_interval, Duration::from_secs(30));
    assert_eq!(wait_for.fallback, FallbackAction::Pause);
    assert!(wait_for.failure.is_none());
}

#[test]
fn wait_for_accepts_an_optional_failure_expression() {
    let mut env = wait_for_env();
    env.push(("GATE_FAILURE_EVAL", "jsonpath($.state) == 'failed'"));
    let config = load(&env).unwrap();
    let ModeConfig::AdvancedWaitFor(wait_for) = &config.mode else {
        panic!("expected waitfor mode");
    };
    assert_eq!(
        wait_for.failure.as_ref().unwrap().source(),
        "jsonpath($.state) == 'failed'"
    );
}

#[test]
fn wait_for_rejects_a_zero_poll_interval() {
    let mut env = wait_for_env();
    env.push(("GATE_POLL_INTERVAL_SECONDS", "0"));
    assert!(matches!(
        load(&env).unwrap_err(),
        ConfigError::InvalidVar {
            name: "GATE_POLL_INTERVAL_SECONDS",
            ..
        }
    ));
}

#[test]
fn wait_for_rejects_a_timeout_shorter_than_the_interval() {
    let mut env = wait_for_env();
    env.push(("GATE_TIMEOUT_SECONDS", "10"));
    env.push(("GATE_POLL_INTERVAL_SECONDS", "30"));
    assert!(matches!(
        load(&env).unwrap_err(),
        ConfigError::InvalidVar {
            name: "GATE_TIMEOUT_SECONDS",
            ..
        }
    ));
}

#[test]
fn wait_for_rejects_a_request_timeout_spanning_the_interval() {
    let mut env = wait_for_env();
    env.push(("GATE_POLL_INTERVAL_SECONDS", "5"));
    env.push(("GATE_REQUEST_TIMEOUT_MS", "5000"));
    assert!(matches!(
        load(&env).unwrap_err(),
        ConfigError::InvalidVar {
            name: "GATE_REQUEST_TIMEOUT_MS",
            ..
        }
    ));
}

#[test]
fn non_numeric_durations_are_rejected() {
    let mut env = wait_for_env();
    env.push(("GATE_TIMEOUT_SECONDS", "soon"));
    assert!(matches!(
        load(&env).unwrap_err(),
        ConfigError::InvalidVar {
            name: "GATE_TIMEOUT_SECONDS",
            ..
        }
    ));
}

// ============================================================================
// SECTION: Custom Mode
// ============================================================================

/// Minimal valid custom-mode environment.
fn custom_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("GATE_MODE", "custom"),
        ("GATE_OPERATION_METHOD", "POST"),
        ("GATE_OPERATION_URL", "http://api.internal/scans/{scanId}"),
        ("PARAM_PATH_scanId", "scan-7"),
        ("GATE_SUCCESS_EVAL", "jsonpath($.verdict) == 'clean'"),
        ("PIPELINE_RUN_ID", "run-42"),
    ]
}

#[test]
fn custom_mode_resolves_the_operation_at_load() {
    let mut env = custom_env();
    env.push(("PARAM_QUERY_run", "${runId}"));
    env.push(("PARAM_HEADER_x-caller", "gate"));
    env.push(("GATE_BODY_TEMPLATE", r#"{"branch": "${branch}"}"#));
    env.push(("PIPELINE_BRANCH", "main"));
    let config = load(&env).unwrap();
    let ModeConfig::Custom(custom) = &config.mode else {
        panic!("expected custom mode");
    };
    assert_eq!(custom.request.method, HttpMethod::Post);
    assert_eq!(custom.request.url, "http://api.internal/scans/scan-7?run=run-42");
    assert_eq!(custom.request.headers, vec![("x-caller".to_string(), "gate".to_string())]);
    assert_eq!(custom.request.body.as_deref(), Some(r#"{"branch": "main"}"#));
    assert_eq!(custom.fallback, FallbackAction::Break);
}

#[test]
fn custom_mode_requires_method_and_url() {
    let err = load(&[
        ("GATE_MODE", "custom"),
        ("GATE_OPERATION_URL", "http://api.internal/scan"),
        ("GATE_SUCCESS_EVAL", "jsonpath($.ok) == true"),
        ("PIPELINE_RUN_ID", "run-42"),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingVar {
            name: "GATE_OPERATION_METHOD"
        }
    ));
}

#[test]
fn unknown_operation_method_is_rejected() {
    let mut env = custom_env();
    env[1] = ("GATE_OPERATION_METHOD", "FETCH");
    assert!(matches!(
        load(&env).unwrap_err(),
        ConfigError::InvalidVar {
            name: "GATE_OPERATION_METHOD",
            ..
        }
    ));
}

#[test]
fn unbound_path_parameter_is_a_pre_flight_error() {
    let mut env = custom_env();
    env.remove(3);
    let err = load(&env).unwrap_err();
    assert_eq!(err.to_string(), "unbound path parameter `{scanId}`");
}

#[test]
fn unresolved_template_variable_is_a_pre_flight_error() {
    let mut env = custom_env();
    env.push(("GATE_BODY_TEMPLATE", r#"{"ticket": "${ticketId}"}"#));
    let err = load(&env).unwrap_err();
    assert_eq!(err.to_string(), "unknown template variable `ticketId`");
}

// ============================================================================
// SECTION: Control Point
// ============================================================================

#[test]
fn control_point_url_is_validated_when_present() {
    let mut env = basic_env();
    env.push(("GATE_CONTROL_POINT_URL", "http://control.internal/review"));
    let config = load(&env).unwrap();
    assert_eq!(config.control_point_url.as_deref(), Some("http://control.internal/review"));

    let mut env = basic_env();
    env.push(("GATE_CONTROL_POINT_URL", "::nope::"));
    assert!(matches!(
        load(&env).unwrap_err(),
        ConfigError::InvalidVar {
            name: "GATE_CONTROL_POINT_URL",
            ..
        }
    ));
}
