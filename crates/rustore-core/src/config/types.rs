//! Configuration types

use rustore_api::{MobileServicesType, PublishType, DEFAULT_BASE_URL, DEFAULT_STALE_DRAFT_RECOVERIES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Main configuration for RuStore publishing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// API connection settings
    pub api: ApiConfig,

    /// What and how to publish
    pub publish: PublishConfig,
}

/// API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API host
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Stale drafts deleted before draft creation gives up
    pub max_stale_draft_recoveries: u32,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: rustore_api::transport::DEFAULT_TIMEOUT_SECS,
            max_stale_draft_recoveries: DEFAULT_STALE_DRAFT_RECOVERIES,
        }
    }
}

/// Publishing settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Application package name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    /// instantly, manual or delayed
    pub publish_type: PublishType,

    /// Requested release time for delayed publishing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_time: Option<String>,

    /// Inline "what's new" text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,

    /// File holding the "what's new" text, relative to the config file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_notes_file: Option<PathBuf>,

    /// Unknown or HMS
    pub mobile_services_type: MobileServicesType,

    /// Update priority, 0 to 5
    pub priority_update: u8,

    /// Build files, relative to the config file
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<PathBuf>,
}

impl PublishConfig {
    /// Resolve the release notes, reading `release_notes_file` if set
    pub fn resolve_release_notes(&self, base_dir: &Path) -> Result<Option<String>> {
        if let Some(notes) = &self.release_notes {
            return Ok(Some(notes.clone()));
        }

        match &self.release_notes_file {
            Some(file) => {
                let path = base_dir.join(file);
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    ConfigError::invalid(
                        "publish.release_notes_file",
                        format!("cannot read {}: {}", path.display(), e),
                    )
                })?;
                Ok(Some(content.trim_end().to_string()))
            }
            None => Ok(None),
        }
    }

    /// Artifact paths resolved against `base_dir`
    pub fn artifact_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.artifacts.iter().map(|p| base_dir.join(p)).collect()
    }
}
