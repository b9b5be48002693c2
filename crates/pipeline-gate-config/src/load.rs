// crates/pipeline-gate-config/src/load.rs
// ============================================================================
// Module: Gate Configuration Loading
// Description: Environment-variable configuration surface with validation.
// Purpose: Produce an immutable, fully validated GateConfig before any
//          network activity.
// Dependencies: crate::env, pipeline-gate-core, serde_json, time, url
// ============================================================================

//! ## Overview
//! Configuration is loaded once into an immutable [`GateConfig`] and passed
//! explicitly into the runtime, with no ambient global state. Loading is strict
//! and fail-closed: a missing required variable, an unparseable expression,
//! an invalid URL, or an unresolvable secret or template placeholder is a
//! [`ConfigError`] raised before any network activity, mapped by the CLI to
//! the configuration-error exit code.
//!
//! Security posture: configuration values are operator-supplied but
//! untrusted; every value is validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use pipeline_gate_core::BasicMode;
use pipeline_gate_core::CustomMode;
use pipeline_gate_core::FallbackAction;
use pipeline_gate_core::GateExpression;
use pipeline_gate_core::HttpMethod;
use pipeline_gate_core::ModeConfig;
use pipeline_gate_core::NotifyMode;
use pipeline_gate_core::OperationError;
use pipeline_gate_core::OperationSpec;
use pipeline_gate_core::ParamBinding;
use pipeline_gate_core::ParamLocation;
use pipeline_gate_core::PipelineContext;
use pipeline_gate_core::SecretError;
use pipeline_gate_core::SecretStore;
use pipeline_gate_core::SecretValue;
use pipeline_gate_core::SyntaxError;
use pipeline_gate_core::WaitForMode;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

use crate::env::EnvSource;

// ============================================================================
// SECTION: Variable Names
// ============================================================================

/// Mode selector variable.
pub const MODE_ENV: &str = "GATE_MODE";
/// Endpoint URL variable for basic, notify, and waitfor modes.
pub const URL_ENV: &str = "GATE_URL";
/// Success expression variable.
pub const SUCCESS_EVAL_ENV: &str = "GATE_SUCCESS_EVAL";
/// Failure expression variable.
pub const FAILURE_EVAL_ENV: &str = "GATE_FAILURE_EVAL";
/// Fallback action variable.
pub const DEFAULT_ACTION_ENV: &str = "GATE_DEFAULT_ACTION";
/// Polling deadline variable, in seconds.
pub const TIMEOUT_ENV: &str = "GATE_TIMEOUT_SECONDS";
/// Polling interval variable, in seconds.
pub const POLL_INTERVAL_ENV: &str = "GATE_POLL_INTERVAL_SECONDS";
/// Per-request timeout variable, in milliseconds.
pub const REQUEST_TIMEOUT_ENV: &str = "GATE_REQUEST_TIMEOUT_MS";
/// Control-point webhook URL variable.
pub const CONTROL_POINT_URL_ENV: &str = "GATE_CONTROL_POINT_URL";
/// Secret name variable.
pub const SECRET_NAME_ENV: &str = "GATE_SECRET_NAME";
/// Notify payload template variable.
pub const NOTIFY_PAYLOAD_ENV: &str = "GATE_NOTIFY_PAYLOAD";
/// Custom operation method variable.
pub const OPERATION_METHOD_ENV: &str = "GATE_OPERATION_METHOD";
/// Custom operation URL template variable.
pub const OPERATION_URL_ENV: &str = "GATE_OPERATION_URL";
/// Custom operation body template variable.
pub const BODY_TEMPLATE_ENV: &str = "GATE_BODY_TEMPLATE";
/// Path parameter binding prefix.
pub const PARAM_PATH_PREFIX: &str = "PARAM_PATH_";
/// Query parameter binding prefix.
pub const PARAM_QUERY_PREFIX: &str = "PARAM_QUERY_";
/// Header parameter binding prefix.
pub const PARAM_HEADER_PREFIX: &str = "PARAM_HEADER_";
/// Pipeline run identifier variable.
pub const RUN_ID_ENV: &str = "PIPELINE_RUN_ID";
/// Pipeline repository variable.
pub const REPOSITORY_ENV: &str = "PIPELINE_REPOSITORY";
/// Pipeline branch variable.
pub const BRANCH_ENV: &str = "PIPELINE_BRANCH";

/// Default polling deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1_800);
/// Default polling interval.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5_000);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading gate configuration.
///
/// # Invariants
/// - Every variant is a pre-flight failure: no network activity has happened
///   when one is raised.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable was absent or empty.
    #[error("missing required configuration `{name}`")]
    MissingVar {
        /// Variable name.
        name: &'static str,
    },
    /// A variable held an unusable value.
    #[error("invalid value for `{name}`: {detail}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// Validation diagnostic.
        detail: String,
    },
    /// An expression variable failed to parse.
    #[error("invalid expression in `{name}`: {source}")]
    Expression {
        /// Variable name.
        name: &'static str,
        /// Parser diagnostic.
        source: SyntaxError,
    },
    /// A configured secret could not be resolved.
    #[error(transparent)]
    Secret(#[from] SecretError),
    /// The custom operation template could not be resolved.
    #[error(transparent)]
    Operation(#[from] OperationError),
    /// The invocation timestamp could not be formatted.
    #[error("timestamp formatting failed: {0}")]
    Timestamp(String),
}

// ============================================================================
// SECTION: Gate Configuration
// ============================================================================

/// Immutable configuration for one gate invocation.
///
/// # Invariants
/// - Fully validated at load; the runtime never re-validates.
#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    /// Active mode with ready-to-execute state.
    pub mode: ModeConfig,
    /// Pipeline run identity.
    pub context: PipelineContext,
    /// Optional control-point webhook URL.
    pub control_point_url: Option<String>,
    /// Per-request transport timeout.
    pub request_timeout: Duration,
}

impl GateConfig {
    /// Loads and validates configuration from the environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for any missing, malformed, or unresolvable
    /// configuration; no network activity has happened when it is raised.
    pub fn load(env: &EnvSource, secrets: &dyn SecretStore) -> Result<Self, ConfigError> {
        let context = load_context(env)?;
        let request_timeout = load_request_timeout(env)?;
        let control_point_url = match env.get(CONTROL_POINT_URL_ENV) {
            Some(raw) => Some(validated_url(CONTROL_POINT_URL_ENV, &raw)?),
            None => None,
        };

        let mode_name = require(env, MODE_ENV)?;
        let mode = match mode_name.as_str() {
            "basic" => load_basic(env, secrets)?,
            "notify" => load_notify(env, secrets)?,
            "waitfor" => load_wait_for(env, secrets, request_timeout)?,
            "custom" => load_custom(env, secrets, &context)?,
            other => {
                return Err(ConfigError::InvalidVar {
                    name: MODE_ENV,
                    detail: format!("unknown mode `{other}`"),
                });
            }
        };

        Ok(Self {
            mode,
            context,
            control_point_url,
            request_timeout,
        })
    }
}

// ============================================================================
// SECTION: Mode Loaders
// ============================================================================

/// Loads the basic mode configuration.
fn load_basic(env: &EnvSource, secrets: &dyn SecretStore) -> Result<ModeConfig, ConfigError> {
    let url = validated_url(URL_ENV, &require(env, URL_ENV)?)?;
    Ok(ModeConfig::Basic(BasicMode {
        url,
        bearer: load_bearer(env, secrets)?,
        success: expression(env, SUCCESS_EVAL_ENV)?.ok_or(ConfigError::MissingVar {
            name: SUCCESS_EVAL_ENV,
        })?,
        fallback: fallback_action(env, FallbackAction::Break)?,
    }))
}

/// Loads the notify mode configuration.
fn load_notify(env: &EnvSource, secrets: &dyn SecretStore) -> Result<ModeConfig, ConfigError> {
    let url = validated_url(URL_ENV, &require(env, URL_ENV)?)?;
    let payload = match env.get(NOTIFY_PAYLOAD_ENV) {
        Some(raw) => {
            let value: Value =
                serde_json::from_str(&raw).map_err(|err| ConfigError::InvalidVar {
                    name: NOTIFY_PAYLOAD_ENV,
                    detail: err.to_string(),
                })?;
            if !value.is_object() {
                return Err(ConfigError::InvalidVar {
                    name: NOTIFY_PAYLOAD_ENV,
                    detail: "payload template must be a JSON object".to_string(),
                });
            }
            value
        }
        None => Value::Object(serde_json::Map::new()),
    };
    Ok(ModeConfig::AdvancedNotify(NotifyMode {
        url,
        bearer: load_bearer(env, secrets)?,
        payload,
    }))
}

/// Loads the waitfor mode configuration.
fn load_wait_for(
    env: &EnvSource,
    secrets: &dyn SecretStore,
    request_timeout: Duration,
) -> Result<ModeConfig, ConfigError> {
    let url = validated_url(URL_ENV, &require(env, URL_ENV)?)?;
    let timeout = duration_secs(env, TIMEOUT_ENV, DEFAULT_TIMEOUT)?;
    let poll_interval = duration_secs(env, POLL_INTERVAL_ENV, DEFAULT_POLL_INTERVAL)?;
    if poll_interval.is_zero() {
        return Err(ConfigError::InvalidVar {
            name: POLL_INTERVAL_ENV,
            detail: "poll interval must be positive".to_string(),
        });
    }
    if timeout < poll_interval {
        return Err(ConfigError::InvalidVar {
            name: TIMEOUT_ENV,
            detail: "timeout must be at least one poll interval".to_string(),
        });
    }
    if request_timeout >= poll_interval {
        return Err(ConfigError::InvalidVar {
            name: REQUEST_TIMEOUT_ENV,
            detail: "request timeout must be shorter than the poll interval".to_string(),
        });
    }
    Ok(ModeConfig::AdvancedWaitFor(WaitForMode {
        url,
        bearer: load_bearer(env, secrets)?,
        success: expression(env, SUCCESS_EVAL_ENV)?.ok_or(ConfigError::MissingVar {
            name: SUCCESS_EVAL_ENV,
        })?,
        failure: expression(env, FAILURE_EVAL_ENV)?,
        fallback: fallback_action(env, FallbackAction::Pause)?,
        timeout,
        poll_interval,
    }))
}

/// Loads the custom mode configuration and resolves its operation.
fn load_custom(
    env: &EnvSource,
    secrets: &dyn SecretStore,
    context: &PipelineContext,
) -> Result<ModeConfig, ConfigError> {
    let method_raw = require(env, OPERATION_METHOD_ENV)?;
    let method = parse_method(&method_raw).ok_or_else(|| ConfigError::InvalidVar {
        name: OPERATION_METHOD_ENV,
        detail: format!("unknown method `{method_raw}`"),
    })?;
    let operation = OperationSpec {
        method,
        url_template: require(env, OPERATION_URL_ENV)?,
        params: param_bindings(env),
        body_template: env.get(BODY_TEMPLATE_ENV),
    };
    let request = operation.resolve(&context.variables(), load_bearer(env, secrets)?)?;
    Ok(ModeConfig::Custom(CustomMode {
        request,
        success: expression(env, SUCCESS_EVAL_ENV)?.ok_or(ConfigError::MissingVar {
            name: SUCCESS_EVAL_ENV,
        })?,
        failure: expression(env, FAILURE_EVAL_ENV)?,
        fallback: fallback_action(env, FallbackAction::Break)?,
    }))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads the pipeline context and stamps the invocation timestamp.
fn load_context(env: &EnvSource) -> Result<PipelineContext, ConfigError> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| ConfigError::Timestamp(err.to_string()))?;
    Ok(PipelineContext {
        run_id: require(env, RUN_ID_ENV)?,
        repository: env.get(REPOSITORY_ENV).unwrap_or_default(),
        branch: env.get(BRANCH_ENV).unwrap_or_default(),
        timestamp,
    })
}

/// Loads the per-request transport timeout.
fn load_request_timeout(env: &EnvSource) -> Result<Duration, ConfigError> {
    match env.get(REQUEST_TIMEOUT_ENV) {
        None => Ok(DEFAULT_REQUEST_TIMEOUT),
        Some(raw) => {
            let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: REQUEST_TIMEOUT_ENV,
                detail: format!("not a millisecond count: `{raw}`"),
            })?;
            if millis == 0 {
                return Err(ConfigError::InvalidVar {
                    name: REQUEST_TIMEOUT_ENV,
                    detail: "request timeout must be positive".to_string(),
                });
            }
            Ok(Duration::from_millis(millis))
        }
    }
}

/// Requires a variable to be present and nonempty.
fn require(env: &EnvSource, name: &'static str) -> Result<String, ConfigError> {
    env.get(name).ok_or(ConfigError::MissingVar {
        name,
    })
}

/// Validates a URL variable and returns its normalized form.
fn validated_url(name: &'static str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidVar {
        name,
        detail: err.to_string(),
    })?;
    Ok(url.to_string())
}

/// Parses an optional expression variable.
fn expression(env: &EnvSource, name: &'static str) -> Result<Option<GateExpression>, ConfigError> {
    match env.get(name) {
        None => Ok(None),
        Some(raw) => GateExpression::parse(&raw).map(Some).map_err(|source| {
            ConfigError::Expression {
                name,
                source,
            }
        }),
    }
}

/// Parses the fallback action variable with a mode-specific default.
fn fallback_action(env: &EnvSource, default: FallbackAction) -> Result<FallbackAction, ConfigError> {
    match env.get(DEFAULT_ACTION_ENV) {
        None => Ok(default),
        Some(raw) => match raw.as_str() {
            "pause" => Ok(FallbackAction::Pause),
            "break" => Ok(FallbackAction::Break),
            other => Err(ConfigError::InvalidVar {
                name: DEFAULT_ACTION_ENV,
                detail: format!("expected `pause` or `break`, got `{other}`"),
            }),
        },
    }
}

/// Parses a whole-second duration variable with a default.
fn duration_secs(
    env: &EnvSource,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match env.get(name) {
        None => Ok(default),
        Some(raw) => {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name,
                detail: format!("not a second count: `{raw}`"),
            })?;
            Ok(Duration::from_secs(secs))
        }
    }
}

/// Resolves the optional bearer secret.
fn load_bearer(
    env: &EnvSource,
    secrets: &dyn SecretStore,
) -> Result<Option<SecretValue>, ConfigError> {
    match env.get(SECRET_NAME_ENV) {
        None => Ok(None),
        Some(name) => Ok(Some(secrets.resolve(&name)?)),
    }
}

/// Parses an operation method name.
fn parse_method(raw: &str) -> Option<HttpMethod> {
    match raw {
        "GET" => Some(HttpMethod::Get),
        "POST" => Some(HttpMethod::Post),
        "PUT" => Some(HttpMethod::Put),
        "PATCH" => Some(HttpMethod::Patch),
        "DELETE" => Some(HttpMethod::Delete),
        _ => None,
    }
}

/// Collects `PARAM_{LOCATION}_{NAME}` bindings from the environment.
fn param_bindings(env: &EnvSource) -> Vec<ParamBinding> {
    let mut params = Vec::new();
    for (name, value) in env.prefixed(PARAM_PATH_PREFIX) {
        params.push(ParamBinding {
            location: ParamLocation::Path,
            name,
            value,
        });
    }
    for (name, value) in env.prefixed(PARAM_QUERY_PREFIX) {
        params.push(ParamBinding {
            location: ParamLocation::Query,
            name,
            value,
        });
    }
    for (name, value) in env.prefixed(PARAM_HEADER_PREFIX) {
        params.push(ParamBinding {
            location: ParamLocation::Header,
            name,
            value,
        });
    }
    params
}
