//! HTTP transport over `reqwest`

use crate::error::{PublishError, Result};
use crate::traits::{Headers, Transport};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, trace};

/// Header carrying the access token
pub const TOKEN_HEADER: &str = "Public-Token";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Request body variants used by the API
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

/// Multipart form with a single file part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    /// Field name of the file part
    pub file_field: String,
    pub file_path: PathBuf,
    pub file_name: String,
    /// Text fields, in order
    pub fields: Vec<(String, String)>,
}

impl MultipartForm {
    pub fn new(file_path: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            file_field: "file".to_string(),
            file_path: file_path.into(),
            file_name: file_name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Look up a text field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    async fn into_form(self) -> Result<Form> {
        let bytes = tokio::fs::read(&self.file_path).await?;
        let part = Part::bytes(bytes)
            .file_name(self.file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| PublishError::InvalidArtifact(format!("Failed to create multipart: {}", e)))?;

        let mut form = Form::new().part(self.file_field, part);
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        Ok(form)
    }
}

/// `reqwest`-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
        headers: Headers,
    ) -> Result<Value> {
        trace!("{}", curl_trace(&method, url, &body, &headers));

        let mut request = self.client.request(method.clone(), url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        request = match body {
            RequestBody::Empty => request.body(""),
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form.into_form().await?),
        };

        debug!("Making {} request to {}", method, url);

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let text = response.text().await?;
        debug!(status = status.as_u16(), "response={}", text);
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, body: RequestBody, headers: Headers) -> Result<Value> {
        self.send(Method::POST, url, body, headers).await
    }

    async fn delete(&self, url: &str, body: RequestBody, headers: Headers) -> Result<Value> {
        self.send(Method::DELETE, url, body, headers).await
    }
}

/// Render a request as a `curl` command with the token redacted
pub fn curl_trace(method: &Method, url: &str, body: &RequestBody, headers: &Headers) -> String {
    let mut lines = vec![format!("curl --location --request {} '{}'", method, url)];

    for (name, value) in headers {
        let value = if name.eq_ignore_ascii_case(TOKEN_HEADER) {
            "<redacted>"
        } else {
            value.as_str()
        };
        lines.push(format!("--header '{}: {}'", name, value));
    }

    match body {
        RequestBody::Empty => {}
        RequestBody::Json(value) => lines.push(format!("--data-raw '{}'", value)),
        RequestBody::Multipart(form) => {
            for (name, value) in &form.fields {
                lines.push(format!("--form {}={}", name, value));
            }
            lines.push(format!(
                "--form {}='@{}'",
                form.file_field,
                form.file_path.display()
            ));
        }
    }

    lines.join(" \\\n  ")
}
