// crates/pipeline-gate-config/src/lib.rs
// ============================================================================
// Module: Pipeline Gate Config
// Description: Environment configuration loading and secret resolution.
// Purpose: Build an immutable, validated GateConfig for one invocation.
// Dependencies: pipeline-gate-core, serde_json, time, url
// ============================================================================

//! ## Overview
//! This crate owns the gate's configuration surface: the environment-variable
//! schema, its fail-closed validation, and the environment-backed secret
//! store. Loading happens once, before any network activity; the result is an
//! immutable [`GateConfig`] passed explicitly into the runtime.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod env;
pub mod load;
pub mod secrets;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use env::EnvSource;
pub use load::BODY_TEMPLATE_ENV;
pub use load::BRANCH_ENV;
pub use load::CONTROL_POINT_URL_ENV;
pub use load::ConfigError;
pub use load::DEFAULT_ACTION_ENV;
pub use load::FAILURE_EVAL_ENV;
pub use load::GateConfig;
pub use load::MODE_ENV;
pub use load::NOTIFY_PAYLOAD_ENV;
pub use load::OPERATION_METHOD_ENV;
pub use load::OPERATION_URL_ENV;
pub use load::PARAM_HEADER_PREFIX;
pub use load::PARAM_PATH_PREFIX;
pub use load::PARAM_QUERY_PREFIX;
pub use load::POLL_INTERVAL_ENV;
pub use load::REPOSITORY_ENV;
pub use load::REQUEST_TIMEOUT_ENV;
pub use load::RUN_ID_ENV;
pub use load::SECRET_NAME_ENV;
pub use load::SUCCESS_EVAL_ENV;
pub use load::TIMEOUT_ENV;
pub use load::URL_ENV;
pub use secrets::EnvSecretStore;
