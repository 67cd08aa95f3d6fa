//! Publishing error types

use thiserror::Error;

/// RuStore publishing errors
#[derive(Debug, Error)]
pub enum PublishError {
    /// Non-2xx response from the API
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Authentication call did not yield a token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Envelope did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Draft creation was refused and the message carried no stale draft id
    #[error(
        "Can't detect previous app versionId. Server response message must contain 'ID =': {message}"
    )]
    StaleDraftIdNotFound { message: String },

    /// The stale draft could not be removed
    #[error("Can't remove previous app versionId {version_id} on server side")]
    DraftDeletionFailed { version_id: String },

    /// Stale drafts kept blocking creation after every recovery attempt
    #[error("Draft creation still blocked by a previous draft after {attempts} attempts")]
    RetryBudgetExhausted { attempts: u32 },

    /// Draft creation failed for a reason other than a stale draft
    #[error("Draft creation failed: {0}")]
    DraftCreationFailed(String),

    /// Build file upload was answered with a non-OK envelope
    #[error("Build file uploading is failed! Reason code: {code}, message: {message}")]
    UploadRejected { code: String, message: String },

    /// Commit was answered with a non-OK envelope
    #[error("Submission was not accepted for version {version_id}")]
    SubmissionRejected { version_id: i64 },

    /// Invalid artifact
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for publishing operations
pub type Result<T> = std::result::Result<T, PublishError>;
