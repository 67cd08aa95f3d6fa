//! RuStore Public API workflow client
//!
//! Wraps the publishing endpoints: authenticate, create a draft version,
//! upload build files to it, and commit it for review.
//!
//! ## Stale drafts
//!
//! RuStore allows a single unfinished draft per application. When one is
//! left over from an earlier run, draft creation answers with an `ERROR`
//! envelope whose message ends in `ID = <versionId>`. The client deletes
//! that draft and tries again, up to a bounded number of times.

use crate::error::{PublishError, Result};
use crate::models::*;
use crate::schedule::{resolve_release_time, ReleaseTime};
use crate::traits::{Clock, Headers, SystemClock, Transport};
use crate::transport::{HttpTransport, MultipartForm, RequestBody, TOKEN_HEADER};
use crate::types::{Credentials, MobileServicesType, PublishType};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://public-api.rustore.ru";

/// Stale drafts deleted per `create_draft` call before giving up
pub const DEFAULT_STALE_DRAFT_RECOVERIES: u32 = 1;

const STALE_DRAFT_MARKER: &str = "ID =";

/// Extract the blocking draft's version id from an error message
///
/// The id is whatever follows `ID = ` up to the end of the message.
pub fn parse_stale_draft_id(message: &str) -> Result<String> {
    let not_found = || PublishError::StaleDraftIdNotFound {
        message: message.to_string(),
    };

    let index = message.find(STALE_DRAFT_MARKER).ok_or_else(not_found)?;
    let rest = &message[index + STALE_DRAFT_MARKER.len()..];
    let id = rest.strip_prefix(' ').unwrap_or(rest).trim();

    if id.is_empty() {
        return Err(not_found());
    }
    Ok(id.to_string())
}

/// What a draft creation attempt produced
enum DraftAttempt {
    Created(i64),
    Blocked { stale_version_id: String },
}

/// RuStore Public API client
pub struct RustoreClient<T: Transport> {
    transport: T,
    base_url: String,
    clock: Arc<dyn Clock>,
    max_stale_draft_recoveries: u32,
}

impl RustoreClient<HttpTransport> {
    /// Create a client backed by `reqwest` with the given request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(timeout)?))
    }
}

impl<T: Transport> RustoreClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            clock: Arc::new(SystemClock),
            max_stale_draft_recoveries: DEFAULT_STALE_DRAFT_RECOVERIES,
        }
    }

    /// Point the client at another host (e.g. a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_max_stale_draft_recoveries(mut self, recoveries: u32) -> Self {
        self.max_stale_draft_recoveries = recoveries;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn version_url(&self, application_id: &str) -> String {
        format!("{}/public/v1/application/{}/version", self.base_url, application_id)
    }

    fn json_headers(token: &str) -> Headers {
        vec![
            ("Content-Type", "application/json".to_string()),
            (TOKEN_HEADER, token.to_string()),
        ]
    }

    fn decode<R: DeserializeOwned>(value: Value) -> Result<R> {
        Ok(serde_json::from_value(value)?)
    }

    /// Exchange signed credentials for an access token
    pub async fn get_token(&self, credentials: &Credentials) -> Result<String> {
        let url = format!("{}/public/auth/", self.base_url);
        let request = AccessTokenRequest {
            key_id: credentials.key_id.clone(),
            timestamp: credentials.timestamp.clone(),
            signature: credentials.signature.clone(),
        };

        info!(key_id = %credentials.key_id, "Requesting access token");
        let value = self
            .transport
            .post(
                &url,
                RequestBody::Json(serde_json::to_value(&request)?),
                vec![("Content-Type", "application/json".to_string())],
            )
            .await?;
        let response: AccessTokenResponse = Self::decode(value)?;

        match (response.is_ok(), response.body) {
            (true, Some(token)) => {
                debug!(ttl = ?token.ttl, "Access token received");
                Ok(token.jwe)
            }
            _ => Err(PublishError::AuthenticationFailed(format!(
                "code {}, message: {}",
                response.code.as_deref().unwrap_or(""),
                response.message.as_deref().unwrap_or("")
            ))),
        }
    }

    /// Build the draft body, resolving the release time against the clock
    pub fn draft_request(
        &self,
        publish_type: PublishType,
        release_time: Option<&str>,
        release_notes: Option<&str>,
    ) -> (AppDraftRequest, ReleaseTime) {
        let resolved = resolve_release_time(publish_type, release_time, self.clock.now());
        if let ReleaseTime::Defaulted { value, reason } = &resolved {
            warn!(requested = ?release_time, substituted = %value, "Release time replaced: {}", reason);
        }

        let request = AppDraftRequest {
            whats_new: release_notes.map(str::to_string),
            publish_type: resolved.effective_publish_type().wire_name().to_string(),
            publish_date_time: resolved.value().map(str::to_string),
        };
        (request, resolved)
    }

    /// Create a draft version and return its id
    ///
    /// A draft left over from an earlier run is deleted and creation is
    /// retried with the same inputs.
    pub async fn create_draft(
        &self,
        token: &str,
        application_id: &str,
        publish_type: PublishType,
        release_time: Option<&str>,
        release_notes: Option<&str>,
    ) -> Result<i64> {
        let (request, _) = self.draft_request(publish_type, release_time, release_notes);
        self.create_draft_from(token, application_id, &request).await
    }

    /// Create a draft version from a prepared body and return its id
    ///
    /// Every attempt, including the one after a stale draft is deleted,
    /// sends `request` unchanged.
    pub async fn create_draft_from(
        &self,
        token: &str,
        application_id: &str,
        request: &AppDraftRequest,
    ) -> Result<i64> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.try_create_draft(token, application_id, request).await? {
                DraftAttempt::Created(version_id) => {
                    info!(application_id, version_id, attempts, "Draft created");
                    return Ok(version_id);
                }
                DraftAttempt::Blocked { stale_version_id } => {
                    if attempts > self.max_stale_draft_recoveries {
                        return Err(PublishError::RetryBudgetExhausted { attempts });
                    }

                    warn!(application_id, stale_version_id = %stale_version_id, "Previous draft blocks creation, deleting it");
                    if !self.delete_draft(token, application_id, &stale_version_id).await? {
                        return Err(PublishError::DraftDeletionFailed {
                            version_id: stale_version_id,
                        });
                    }
                }
            }
        }
    }

    async fn try_create_draft(
        &self,
        token: &str,
        application_id: &str,
        request: &AppDraftRequest,
    ) -> Result<DraftAttempt> {
        let url = self.version_url(application_id);
        info!(application_id, publish_type = %request.publish_type, "Creating draft");

        let value = self
            .transport
            .post(
                &url,
                RequestBody::Json(serde_json::to_value(request)?),
                Self::json_headers(token),
            )
            .await?;
        let response: AppDraftResponse = Self::decode(value)?;
        debug!(?response, "Draft response");

        if response.is_ok() {
            return response.body.map(DraftAttempt::Created).ok_or_else(|| {
                PublishError::UnexpectedResponse("draft created without a version id".to_string())
            });
        }

        match (response.is_error(), response.message.as_deref()) {
            (true, Some(message)) => Ok(DraftAttempt::Blocked {
                stale_version_id: parse_stale_draft_id(message)?,
            }),
            _ => Err(PublishError::DraftCreationFailed(format!(
                "code {}, message: {}",
                response.code_or_empty(),
                response.message_or_empty()
            ))),
        }
    }

    /// Delete a draft version; `true` when the server answered `OK`
    pub async fn delete_draft(
        &self,
        token: &str,
        application_id: &str,
        version_id: &str,
    ) -> Result<bool> {
        let url = format!("{}/{}", self.version_url(application_id), version_id);
        info!(application_id, version_id, "Deleting draft");

        let value = self
            .transport
            .delete(&url, RequestBody::Empty, Self::json_headers(token))
            .await?;
        let response: DeleteAppDraftResponse = Self::decode(value)?;
        debug!(?response, "Delete response");

        Ok(response.is_ok())
    }

    /// Upload an APK tagged with its mobile services type as the main APK
    pub async fn upload_apk(
        &self,
        token: &str,
        application_id: &str,
        services_type: MobileServicesType,
        version_id: i64,
        path: &Path,
    ) -> Result<()> {
        let form = MultipartForm::new(path, file_name(path))
            .text("servicesType", services_type.as_str())
            .text("isMainApk", "true");
        self.upload(token, application_id, version_id, "apk", form).await
    }

    /// Upload an Android App Bundle
    pub async fn upload_aab(
        &self,
        token: &str,
        application_id: &str,
        version_id: i64,
        path: &Path,
    ) -> Result<()> {
        let form = MultipartForm::new(path, file_name(path));
        self.upload(token, application_id, version_id, "aab", form).await
    }

    async fn upload(
        &self,
        token: &str,
        application_id: &str,
        version_id: i64,
        endpoint: &str,
        form: MultipartForm,
    ) -> Result<()> {
        let url = format!(
            "{}/{}/{}",
            self.version_url(application_id),
            version_id,
            endpoint
        );
        info!(application_id, version_id, file = %form.file_name, "Uploading build file");

        let headers = vec![
            ("accept", "application/json".to_string()),
            (TOKEN_HEADER, token.to_string()),
        ];
        let value = self
            .transport
            .post(&url, RequestBody::Multipart(form), headers)
            .await?;
        let response: UploadAppFileResponse = Self::decode(value)?;
        debug!(?response, "Upload response");

        if !response.is_ok() {
            return Err(PublishError::UploadRejected {
                code: response.code_or_empty().to_string(),
                message: response.message_or_empty().to_string(),
            });
        }
        Ok(())
    }

    /// Commit a draft for review
    ///
    /// Returns `Ok(false)` when the server answers with anything but `OK`;
    /// only transport failures are errors.
    pub async fn submit(
        &self,
        token: &str,
        application_id: &str,
        version_id: i64,
        priority_update: u8,
    ) -> Result<bool> {
        let url = format!(
            "{}/{}/commit?priorityUpdate={}",
            self.version_url(application_id),
            version_id,
            priority_update
        );
        info!(application_id, version_id, priority_update, "Submitting draft");

        let value = self
            .transport
            .post(&url, RequestBody::Empty, Self::json_headers(token))
            .await?;
        let response: SubmitPublicationResponse = Self::decode(value)?;
        debug!(?response, "Submit response");

        Ok(response.is_ok())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use crate::traits::FixedClock;
    use chrono::DateTime;
    use serde_json::json;

    const APP: &str = "ru.example.app";

    fn client(transport: ScriptedTransport) -> RustoreClient<ScriptedTransport> {
        let now = DateTime::parse_from_rfc3339("2026-10-16T12:00:00+03:00").unwrap();
        RustoreClient::new(transport)
            .with_base_url("https://rustore.test/")
            .with_clock(Arc::new(FixedClock(now)))
    }

    fn stale(id: &str) -> Value {
        json!({ "code": "ERROR", "message": format!("You already have draft version with ID = {}", id) })
    }

    #[test]
    fn test_parse_stale_draft_id() {
        assert_eq!(parse_stale_draft_id("Duplicate draft, ID = 4521").unwrap(), "4521");
        assert_eq!(parse_stale_draft_id("ID = 7").unwrap(), "7");
        assert_eq!(parse_stale_draft_id("draft ID =99").unwrap(), "99");
    }

    #[test]
    fn test_parse_stale_draft_id_without_marker() {
        for message in ["Duplicate draft", "id = 4521", "Duplicate draft, ID = "] {
            assert!(matches!(
                parse_stale_draft_id(message),
                Err(PublishError::StaleDraftIdNotFound { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_get_token() {
        let transport = ScriptedTransport::new(vec![Ok(
            json!({ "code": "OK", "body": { "jwe": "token-1", "ttl": 900 } }),
        )]);
        let client = client(transport);
        let creds = Credentials {
            key_id: "42".to_string(),
            timestamp: "2026-10-16T12:00:00+03:00".to_string(),
            signature: "sig".to_string(),
        };

        assert_eq!(client.get_token(&creds).await.unwrap(), "token-1");

        let calls = client.transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://rustore.test/public/auth/");
        assert_eq!(
            calls[0].body,
            RequestBody::Json(json!({
                "keyId": "42",
                "timestamp": "2026-10-16T12:00:00+03:00",
                "signature": "sig"
            }))
        );
        assert!(calls[0].header(TOKEN_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_get_token_without_body_fails() {
        let transport = ScriptedTransport::new(vec![Ok(
            json!({ "code": "ERROR", "message": "bad signature" }),
        )]);
        let creds = Credentials {
            key_id: "42".to_string(),
            timestamp: "t".to_string(),
            signature: "s".to_string(),
        };
        let err = client(transport).get_token(&creds).await.unwrap_err();
        assert!(matches!(err, PublishError::AuthenticationFailed(m) if m.contains("bad signature")));
    }

    #[tokio::test]
    async fn test_create_draft_manual() {
        let transport = ScriptedTransport::new(vec![Ok(json!({ "code": "OK", "body": 1001 }))]);
        let client = client(transport);

        let id = client
            .create_draft("tok", APP, PublishType::Manual, None, Some("Bug fixes"))
            .await
            .unwrap();
        assert_eq!(id, 1001);

        let calls = client.transport.calls();
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].url, "https://rustore.test/public/v1/application/ru.example.app/version");
        assert_eq!(calls[0].header(TOKEN_HEADER), Some("tok"));
        assert_eq!(
            calls[0].body,
            RequestBody::Json(json!({
                "whatsNew": "Bug fixes",
                "publishType": "MANUAL",
                "publishDateTime": null
            }))
        );
    }

    #[tokio::test]
    async fn test_create_draft_instantly_is_sent_as_manual() {
        let transport = ScriptedTransport::new(vec![Ok(json!({ "code": "OK", "body": 1 }))]);
        let client = client(transport);
        client
            .create_draft("tok", APP, PublishType::Instantly, None, None)
            .await
            .unwrap();

        let calls = client.transport.calls();
        assert_eq!(calls[0].json_field("publishType"), Some(json!("MANUAL")));
    }

    #[tokio::test]
    async fn test_create_draft_delayed_without_time() {
        let transport = ScriptedTransport::new(vec![Ok(json!({ "code": "OK", "body": 5 }))]);
        let client = client(transport);
        client
            .create_draft("tok", APP, PublishType::Delayed, None, None)
            .await
            .unwrap();

        let calls = client.transport.calls();
        assert_eq!(calls[0].json_field("publishType"), Some(json!("DELAYED")));
        assert_eq!(
            calls[0].json_field("publishDateTime"),
            Some(json!("2026-10-17T13:00:00+0300"))
        );
    }

    #[tokio::test]
    async fn test_create_draft_recovers_from_stale_draft() {
        let transport = ScriptedTransport::new(vec![
            Ok(stale("4521")),
            Ok(json!({ "code": "OK" })),
            Ok(json!({ "code": "OK", "body": 4522 })),
        ]);
        let client = client(transport);

        let id = client
            .create_draft("tok", APP, PublishType::Delayed, Some("2026-10-20T10:00:00+0300"), Some("notes"))
            .await
            .unwrap();
        assert_eq!(id, 4522);

        let calls = client.transport.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].method, "DELETE");
        assert_eq!(
            calls[1].url,
            "https://rustore.test/public/v1/application/ru.example.app/version/4521"
        );
        // retried with identical inputs
        assert_eq!(calls[0].body, calls[2].body);
    }

    #[tokio::test]
    async fn test_create_draft_gives_up_after_budget() {
        let transport = ScriptedTransport::new(vec![
            Ok(stale("1")),
            Ok(json!({ "code": "OK" })),
            Ok(stale("2")),
        ]);
        let client = client(transport);

        let err = client
            .create_draft("tok", APP, PublishType::Manual, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::RetryBudgetExhausted { attempts: 2 }));
        assert_eq!(client.transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_create_draft_with_larger_budget() {
        let transport = ScriptedTransport::new(vec![
            Ok(stale("1")),
            Ok(json!({ "code": "OK" })),
            Ok(stale("2")),
            Ok(json!({ "code": "OK" })),
            Ok(json!({ "code": "OK", "body": 3 })),
        ]);
        let client = client(transport).with_max_stale_draft_recoveries(2);

        let id = client
            .create_draft("tok", APP, PublishType::Manual, None, None)
            .await
            .unwrap();
        assert_eq!(id, 3);
    }

    #[tokio::test]
    async fn test_create_draft_error_without_marker_is_fatal() {
        let transport = ScriptedTransport::new(vec![Ok(
            json!({ "code": "ERROR", "message": "Application not found" }),
        )]);
        let client = client(transport);

        let err = client
            .create_draft("tok", APP, PublishType::Manual, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::StaleDraftIdNotFound { .. }));
        assert_eq!(client.transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_create_draft_failed_delete_is_fatal() {
        let transport = ScriptedTransport::new(vec![
            Ok(stale("4521")),
            Ok(json!({ "code": "ERROR", "message": "forbidden" })),
        ]);
        let client = client(transport);

        let err = client
            .create_draft("tok", APP, PublishType::Manual, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::DraftDeletionFailed { version_id } if version_id == "4521"));
    }

    #[tokio::test]
    async fn test_create_draft_error_without_message() {
        let transport = ScriptedTransport::new(vec![Ok(json!({ "code": "ERROR" }))]);
        let err = client(transport)
            .create_draft("tok", APP, PublishType::Manual, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::DraftCreationFailed(_)));
    }

    #[tokio::test]
    async fn test_create_draft_transport_error_propagates() {
        let transport = ScriptedTransport::new(vec![Err(PublishError::Api {
            status: 500,
            message: "boom".to_string(),
        })]);
        let err = client(transport)
            .create_draft("tok", APP, PublishType::Manual, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_upload_apk_sends_tagged_form() {
        let transport = ScriptedTransport::new(vec![Ok(json!({ "code": "OK" }))]);
        let client = client(transport);

        client
            .upload_apk("tok", APP, MobileServicesType::Hms, 77, Path::new("/out/app-release.apk"))
            .await
            .unwrap();

        let calls = client.transport.calls();
        assert_eq!(
            calls[0].url,
            "https://rustore.test/public/v1/application/ru.example.app/version/77/apk"
        );
        let RequestBody::Multipart(form) = &calls[0].body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.file_field, "file");
        assert_eq!(form.file_name, "app-release.apk");
        assert_eq!(form.field("servicesType"), Some("HMS"));
        assert_eq!(form.field("isMainApk"), Some("true"));
    }

    #[tokio::test]
    async fn test_upload_aab_sends_plain_form() {
        let transport = ScriptedTransport::new(vec![Ok(json!({ "code": "OK" }))]);
        let client = client(transport);

        client
            .upload_aab("tok", APP, 77, Path::new("/out/app.aab"))
            .await
            .unwrap();

        let calls = client.transport.calls();
        assert!(calls[0].url.ends_with("/version/77/aab"));
        let RequestBody::Multipart(form) = &calls[0].body else {
            panic!("expected multipart body");
        };
        assert!(form.fields.is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejected_carries_server_message() {
        let transport = ScriptedTransport::new(vec![Ok(
            json!({ "code": "ERROR", "message": "Version code already used" }),
        )]);
        let err = client(transport)
            .upload_aab("tok", APP, 77, Path::new("/out/app.aab"))
            .await
            .unwrap_err();
        match err {
            PublishError::UploadRejected { code, message } => {
                assert_eq!(code, "ERROR");
                assert_eq!(message, "Version code already used");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_submit_ok() {
        let transport = ScriptedTransport::new(vec![Ok(json!({ "code": "OK" }))]);
        let client = client(transport);

        assert!(client.submit("tok", APP, 77, 3).await.unwrap());

        let calls = client.transport.calls();
        assert_eq!(
            calls[0].url,
            "https://rustore.test/public/v1/application/ru.example.app/version/77/commit?priorityUpdate=3"
        );
        assert_eq!(calls[0].body, RequestBody::Empty);
    }

    #[tokio::test]
    async fn test_submit_not_ok_is_false() {
        for response in [
            json!({ "code": "ERROR", "message": "moderation queue is full" }),
            json!({ "code": "ok" }),
            json!({ "code": "" }),
        ] {
            let transport = ScriptedTransport::new(vec![Ok(response)]);
            assert!(!client(transport).submit("tok", APP, 77, 0).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_submit_without_status_is_false() {
        for response in [
            json!({}),
            json!({ "code": null }),
            json!({ "message": "oops" }),
            json!({ "status": "OK" }),
        ] {
            let transport = ScriptedTransport::new(vec![Ok(response)]);
            assert!(!client(transport).submit("tok", APP, 1, 0).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_undecodable_envelope_is_an_error() {
        let transport = ScriptedTransport::new(vec![Ok(json!({ "code": "OK", "body": "not-an-id" }))]);
        let err = client(transport)
            .create_draft("tok", APP, PublishType::Manual, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Json(_)));
    }
}
