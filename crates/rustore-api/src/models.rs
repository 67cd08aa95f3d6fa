//! Request and response bodies of the RuStore Public API

use serde::{Deserialize, Serialize};

/// Envelope status of a successful call
pub const CODE_OK: &str = "OK";

/// Envelope status of a refused call
pub const CODE_ERROR: &str = "ERROR";

/// Body of `POST /public/auth/`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenRequest {
    pub key_id: String,
    pub timestamp: String,
    pub signature: String,
}

/// Payload of a successful authentication
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub jwe: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Body of `POST /application/{appId}/version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDraftRequest {
    pub whats_new: Option<String>,
    pub publish_type: String,
    pub publish_date_time: Option<String>,
}

/// Uniform response shape shared by every endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Missing or null when the server sends no status
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub body: Option<T>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        self.code.as_deref() == Some(CODE_OK)
    }

    pub fn is_error(&self) -> bool {
        self.code.as_deref() == Some(CODE_ERROR)
    }

    /// Status or an empty string
    pub fn code_or_empty(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }

    /// Message or an empty string
    pub fn message_or_empty(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// Draft creation response; `body` is the version id
pub type AppDraftResponse = Envelope<i64>;

/// Draft deletion response
pub type DeleteAppDraftResponse = Envelope<serde_json::Value>;

/// Build upload response
pub type UploadAppFileResponse = Envelope<serde_json::Value>;

/// Commit response
pub type SubmitPublicationResponse = Envelope<serde_json::Value>;

/// Authentication response
pub type AccessTokenResponse = Envelope<AccessToken>;
