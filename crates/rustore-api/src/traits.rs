//! Seams between the workflow client and the outside world

use crate::error::Result;
use crate::transport::RequestBody;
use chrono::{DateTime, FixedOffset, Local};
use serde_json::Value;

/// Header name/value pairs attached to a request
pub type Headers = Vec<(&'static str, String)>;

/// HTTP transport used by the workflow client
///
/// Each call resolves to the decoded JSON body of a 2xx response, or fails
/// with a transport error (network, non-2xx status, undecodable body).
/// The workflow client interprets the envelope; the transport never does.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Issue a POST request
    async fn post(&self, url: &str, body: RequestBody, headers: Headers) -> Result<Value>;

    /// Issue a DELETE request
    async fn delete(&self, url: &str, body: RequestBody, headers: Headers) -> Result<Value>;
}

/// Source of "now" for release-time resolution
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
