//! Release time resolution for delayed publishing
//!
//! RuStore refuses a delayed release that is less than a day away. A
//! requested time that is missing, unparsable or too close is replaced by
//! "now + 25 hours" so the draft is still accepted.

use crate::types::PublishType;
use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;

/// Format of `publishDateTime`, e.g. `2026-10-17T13:00:00+0300`
pub const RELEASE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Requested times at or under this lead are rejected
pub fn minimum_lead() -> Duration {
    Duration::hours(24)
}

/// Lead used when the requested time is rejected
pub fn fallback_lead() -> Duration {
    Duration::hours(24) + Duration::hours(1)
}

/// Why a requested release time was replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultReason {
    /// No time was requested
    Missing,
    /// The requested time could not be parsed
    Unparsable,
    /// The requested time is within a day of now, or in the past
    TooSoon,
}

impl std::fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultReason::Missing => write!(f, "no release time given"),
            DefaultReason::Unparsable => write!(f, "release time could not be parsed"),
            DefaultReason::TooSoon => write!(f, "release time is less than a day away"),
        }
    }
}

/// Resolved `publishDateTime`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReleaseTime {
    /// Not a delayed release
    NotScheduled,
    /// The caller's value, passed through unchanged
    Supplied(String),
    /// A substituted value
    Defaulted { value: String, reason: DefaultReason },
}

impl ReleaseTime {
    /// Value to send, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            ReleaseTime::NotScheduled => None,
            ReleaseTime::Supplied(value) => Some(value),
            ReleaseTime::Defaulted { value, .. } => Some(value),
        }
    }

    /// `publishType` actually transmitted: delayed only when a time exists
    pub fn effective_publish_type(&self) -> PublishType {
        if self.value().is_some() {
            PublishType::Delayed
        } else {
            PublishType::Manual
        }
    }
}

/// Parse a release time in [`RELEASE_TIME_FORMAT`] or RFC 3339
pub fn parse_release_time(input: &str) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();
    DateTime::parse_from_str(input, RELEASE_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(input))
        .ok()
}

pub fn format_release_time(time: &DateTime<FixedOffset>) -> String {
    time.format(RELEASE_TIME_FORMAT).to_string()
}

/// Resolve the release time to send with a draft
pub fn resolve_release_time(
    publish_type: PublishType,
    requested: Option<&str>,
    now: DateTime<FixedOffset>,
) -> ReleaseTime {
    if publish_type != PublishType::Delayed {
        return ReleaseTime::NotScheduled;
    }

    let defaulted = |reason| ReleaseTime::Defaulted {
        value: format_release_time(&(now + fallback_lead())),
        reason,
    };

    let Some(requested) = requested else {
        return defaulted(DefaultReason::Missing);
    };

    match parse_release_time(requested) {
        None => defaulted(DefaultReason::Unparsable),
        Some(time) if time.signed_duration_since(now) <= minimum_lead() => {
            defaulted(DefaultReason::TooSoon)
        }
        Some(_) => ReleaseTime::Supplied(requested.to_string()),
    }
}
