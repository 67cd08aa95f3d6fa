//! End-to-end publishing run
//!
//! Drives a single run through `Unauthenticated → Authenticated →
//! DraftCreated → ArtifactUploaded → Submitted`. Each step is one remote
//! call (plus the stale-draft recovery inside draft creation), and a failed
//! step stops the run.

use crate::client::RustoreClient;
use crate::error::{PublishError, Result};
use crate::traits::Transport;
use crate::types::*;
use chrono::Utc;
use tracing::{info, warn};

/// Highest accepted `priorityUpdate`
pub const MAX_PRIORITY_UPDATE: u8 = 5;

/// Runs the publishing workflow against a [`RustoreClient`]
pub struct Publisher<T: Transport> {
    client: RustoreClient<T>,
}

impl<T: Transport> Publisher<T> {
    pub fn new(client: RustoreClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RustoreClient<T> {
        &self.client
    }

    /// Check a request before any network call
    pub fn validate(request: &PublishRequest) -> Result<()> {
        if request.application_id.trim().is_empty() {
            return Err(PublishError::ConfigurationError(
                "application id is required".to_string(),
            ));
        }

        if request.priority_update > MAX_PRIORITY_UPDATE {
            return Err(PublishError::ConfigurationError(format!(
                "priority update must be between 0 and {}, got {}",
                MAX_PRIORITY_UPDATE, request.priority_update
            )));
        }

        if request.artifacts.is_empty() {
            return Err(PublishError::InvalidArtifact(
                "no build file to upload".to_string(),
            ));
        }

        for artifact in &request.artifacts {
            if ArtifactFormat::from_path(&artifact.path) != Some(artifact.format) {
                return Err(PublishError::InvalidArtifact(format!(
                    "{} is not an {} file",
                    artifact.path.display(),
                    artifact.format
                )));
            }
            if !artifact.path.is_file() {
                return Err(PublishError::InvalidArtifact(format!(
                    "{} does not exist or is not a file",
                    artifact.path.display()
                )));
            }
        }

        Ok(())
    }

    /// Publish the request's artifacts as a new version
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishReport> {
        Self::validate(request)?;

        let (draft, resolved) = self.client.draft_request(
            request.publish_type,
            request.release_time.as_deref(),
            request.release_notes.as_deref(),
        );

        let mut report = PublishReport {
            application_id: request.application_id.clone(),
            version_id: None,
            uploaded: Vec::new(),
            publish_type: draft.publish_type.clone(),
            release_time: resolved.value().map(str::to_string),
            stage: PublishStage::Unauthenticated,
            dry_run: request.dry_run,
            finished_at: Utc::now(),
        };

        if request.dry_run {
            info!(
                application_id = %request.application_id,
                artifacts = request.artifacts.len(),
                "Dry run - would publish"
            );
            return Ok(report);
        }

        let token = self.client.get_token(&request.credentials).await?;
        advance(&mut report, PublishStage::Authenticated);

        let version_id = self
            .client
            .create_draft_from(&token, &request.application_id, &draft)
            .await?;
        report.version_id = Some(version_id);
        advance(&mut report, PublishStage::DraftCreated);

        for artifact in &request.artifacts {
            match artifact.format {
                ArtifactFormat::Apk => {
                    self.client
                        .upload_apk(
                            &token,
                            &request.application_id,
                            request.mobile_services_type,
                            version_id,
                            &artifact.path,
                        )
                        .await?
                }
                ArtifactFormat::Aab => {
                    self.client
                        .upload_aab(&token, &request.application_id, version_id, &artifact.path)
                        .await?
                }
            }
            report.uploaded.push(artifact.file_name());
        }
        advance(&mut report, PublishStage::ArtifactUploaded);

        let submitted = self
            .client
            .submit(
                &token,
                &request.application_id,
                version_id,
                request.priority_update,
            )
            .await?;
        if !submitted {
            warn!(version_id, "Commit was not acknowledged");
            return Err(PublishError::SubmissionRejected { version_id });
        }
        advance(&mut report, PublishStage::Submitted);

        report.finished_at = Utc::now();
        Ok(report)
    }
}

fn advance(report: &mut PublishReport, next: PublishStage) {
    info!(from = %report.stage, to = %next, version_id = ?report.version_id, "Publish stage");
    report.stage = next;
}
