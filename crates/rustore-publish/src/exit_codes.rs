//! Exit codes for the CLI

use rustore_api::PublishError;
use rustore_core::ConfigError;

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Validation error
pub const VALIDATION_ERROR: i32 = 5;

/// The server did not accept the commit
pub const SUBMISSION_REJECTED: i32 = 6;

/// Map a command failure to an exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return CONFIG_ERROR;
    }

    match err.downcast_ref::<PublishError>() {
        Some(PublishError::ConfigurationError(_)) => CONFIG_ERROR,
        Some(PublishError::InvalidArtifact(_)) => VALIDATION_ERROR,
        Some(PublishError::SubmissionRejected { .. }) => SUBMISSION_REJECTED,
        _ => ERROR,
    }
}
