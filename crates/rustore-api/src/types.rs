//! Common types for the publishing workflow

use crate::error::{PublishError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Release timing strategy requested for a draft
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishType {
    /// Publish as soon as moderation passes
    #[serde(alias = "immediate")]
    Instantly,
    /// Wait for a manual release from the console
    #[default]
    Manual,
    /// Publish at a scheduled time
    #[serde(alias = "scheduled")]
    Delayed,
}

impl PublishType {
    /// Name used in the `publishType` request field
    pub fn wire_name(&self) -> &'static str {
        match self {
            PublishType::Instantly => "INSTANTLY",
            PublishType::Manual => "MANUAL",
            PublishType::Delayed => "DELAYED",
        }
    }

    /// Accepted config/CLI spellings
    pub fn variants() -> &'static [&'static str] {
        &["instantly", "immediate", "manual", "delayed", "scheduled"]
    }
}

impl std::fmt::Display for PublishType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishType::Instantly => write!(f, "instantly"),
            PublishType::Manual => write!(f, "manual"),
            PublishType::Delayed => write!(f, "delayed"),
        }
    }
}

impl FromStr for PublishType {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "instantly" | "immediate" => Ok(PublishType::Instantly),
            "manual" => Ok(PublishType::Manual),
            "delayed" | "scheduled" => Ok(PublishType::Delayed),
            other => Err(PublishError::ConfigurationError(format!(
                "unknown publish type '{}', expected one of: {}",
                other,
                Self::variants().join(", ")
            ))),
        }
    }
}

/// Mobile services an APK is built against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MobileServicesType {
    #[default]
    Unknown,
    #[serde(rename = "HMS")]
    Hms,
}

impl MobileServicesType {
    /// Value of the `servicesType` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            MobileServicesType::Unknown => "Unknown",
            MobileServicesType::Hms => "HMS",
        }
    }
}

impl std::fmt::Display for MobileServicesType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MobileServicesType {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "unknown" => Ok(MobileServicesType::Unknown),
            "hms" => Ok(MobileServicesType::Hms),
            other => Err(PublishError::ConfigurationError(format!(
                "unknown mobile services type '{}', expected Unknown or HMS",
                other
            ))),
        }
    }
}

/// Build file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Apk,
    Aab,
}

impl ArtifactFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "apk" => Some(ArtifactFormat::Apk),
            "aab" => Some(ArtifactFormat::Aab),
            _ => None,
        }
    }

    /// Trailing path segment of the upload endpoint
    pub fn endpoint(&self) -> &'static str {
        match self {
            ArtifactFormat::Apk => "apk",
            ArtifactFormat::Aab => "aab",
        }
    }
}

impl std::fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactFormat::Apk => write!(f, "APK"),
            ArtifactFormat::Aab => write!(f, "AAB"),
        }
    }
}

/// A build file to upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub format: ArtifactFormat,
}

impl Artifact {
    /// Build an artifact from a path, checking that it exists and has a
    /// supported extension
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = ArtifactFormat::from_path(&path).ok_or_else(|| {
            PublishError::InvalidArtifact(format!(
                "{} must have an .apk or .aab extension",
                path.display()
            ))
        })?;

        if !path.is_file() {
            return Err(PublishError::InvalidArtifact(format!(
                "{} does not exist or is not a file",
                path.display()
            )));
        }

        Ok(Self { path, format })
    }

    /// File name sent in the multipart part
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("build.{}", self.format.endpoint()))
    }
}

/// Precomputed authentication material
///
/// The signature is produced by the caller; this crate only forwards it.
#[derive(Clone)]
pub struct Credentials {
    pub key_id: String,
    pub timestamp: String,
    pub signature: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.key_id)
            .field("timestamp", &self.timestamp)
            .field("signature", &"<redacted>")
            .finish()
    }
}

/// Everything needed for one publishing run
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub credentials: Credentials,

    /// Application package name (e.g., "ru.example.app")
    pub application_id: String,

    pub publish_type: PublishType,

    /// Requested release time for delayed publishing
    pub release_time: Option<String>,

    /// "What's new" text
    pub release_notes: Option<String>,

    pub artifacts: Vec<Artifact>,

    pub mobile_services_type: MobileServicesType,

    /// Update priority, 0 to 5
    pub priority_update: u8,

    /// Validate and resolve, but don't call the API
    pub dry_run: bool,
}

/// Stage of a publishing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStage {
    Unauthenticated,
    Authenticated,
    DraftCreated,
    ArtifactUploaded,
    Submitted,
}

impl std::fmt::Display for PublishStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStage::Unauthenticated => write!(f, "Unauthenticated"),
            PublishStage::Authenticated => write!(f, "Authenticated"),
            PublishStage::DraftCreated => write!(f, "Draft Created"),
            PublishStage::ArtifactUploaded => write!(f, "Artifact Uploaded"),
            PublishStage::Submitted => write!(f, "Submitted"),
        }
    }
}

/// Outcome of a publishing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReport {
    pub application_id: String,

    /// Draft version id; absent on dry runs
    pub version_id: Option<i64>,

    /// File names uploaded, in order
    pub uploaded: Vec<String>,

    /// `publishType` sent with the draft
    pub publish_type: String,

    /// `publishDateTime` sent with the draft
    pub release_time: Option<String>,

    /// Last stage reached
    pub stage: PublishStage,

    pub dry_run: bool,

    pub finished_at: DateTime<Utc>,
}
