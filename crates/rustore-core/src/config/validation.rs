//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{ApiConfig, Config, PublishConfig};

/// Highest accepted `priority_update`
pub const MAX_PRIORITY_UPDATE: u8 = rustore_api::MAX_PRIORITY_UPDATE;

/// Upper bound for `max_stale_draft_recoveries`
pub const MAX_STALE_DRAFT_RECOVERIES: u32 = 3;

/// Longest accepted "what's new" text, in characters
pub const MAX_RELEASE_NOTES_CHARS: usize = 5000;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_api(&config.api)?;
    validate_publish(&config.publish)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_api(api: &ApiConfig) -> Result<()> {
    if !(api.base_url.starts_with("https://") || api.base_url.starts_with("http://")) {
        return Err(ConfigError::invalid(
            "api.base_url",
            "must start with http:// or https://",
        ));
    }

    if api.timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "api.timeout_secs",
            "must be greater than zero",
        ));
    }

    if api.max_stale_draft_recoveries > MAX_STALE_DRAFT_RECOVERIES {
        return Err(ConfigError::invalid(
            "api.max_stale_draft_recoveries",
            format!("must be at most {}", MAX_STALE_DRAFT_RECOVERIES),
        ));
    }

    Ok(())
}

fn validate_publish(publish: &PublishConfig) -> Result<()> {
    if publish.priority_update > MAX_PRIORITY_UPDATE {
        return Err(ConfigError::invalid(
            "publish.priority_update",
            format!("must be between 0 and {}", MAX_PRIORITY_UPDATE),
        ));
    }

    if publish.release_notes.is_some() && publish.release_notes_file.is_some() {
        return Err(ConfigError::invalid(
            "publish.release_notes",
            "cannot be combined with publish.release_notes_file",
        ));
    }

    if let Some(notes) = &publish.release_notes {
        validate_release_notes(notes)?;
    }

    if let Some(id) = &publish.application_id {
        if id.trim().is_empty() {
            return Err(ConfigError::invalid(
                "publish.application_id",
                "cannot be empty",
            ));
        }
    }

    Ok(())
}

/// Check the length of "what's new" text
pub fn validate_release_notes(notes: &str) -> Result<()> {
    let count = notes.chars().count();
    if count > MAX_RELEASE_NOTES_CHARS {
        return Err(ConfigError::invalid(
            "publish.release_notes",
            format!(
                "is {} characters long, the limit is {}",
                count, MAX_RELEASE_NOTES_CHARS
            ),
        ));
    }
    Ok(())
}
