//! In-memory transport replaying scripted responses

use crate::error::{PublishError, Result};
use crate::traits::{Headers, Transport};
use crate::transport::RequestBody;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request seen by [`ScriptedTransport`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: RequestBody,
    pub headers: Headers,
}

impl RecordedCall {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json_field(&self, name: &str) -> Option<Value> {
        match &self.body {
            RequestBody::Json(value) => value.get(name).cloned(),
            _ => None,
        }
    }
}

/// Answers each call with the next scripted response, in order
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, method: &'static str, url: &str, body: RequestBody, headers: Headers) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            body,
            headers,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PublishError::UnexpectedResponse(format!("no scripted response for {} {}", method, url))))
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, url: &str, body: RequestBody, headers: Headers) -> Result<Value> {
        self.respond("POST", url, body, headers)
    }

    async fn delete(&self, url: &str, body: RequestBody, headers: Headers) -> Result<Value> {
        self.respond("DELETE", url, body, headers)
    }
}
