//! RuStore Public API client for publishing Android builds
//!
//! A publishing run is four sequential calls against the RuStore Public API:
//!
//! 1. exchange signed credentials for an access token
//! 2. create a draft version (deleting a stale draft first if one blocks it)
//! 3. upload APK and/or AAB build files to the draft
//! 4. commit the draft for review
//!
//! [`RustoreClient`] exposes each call; [`Publisher`] runs them in order.
//!
//! ## Usage
//!
//! ```ignore
//! use rustore_api::{Publisher, RustoreClient};
//! use std::time::Duration;
//!
//! let client = RustoreClient::with_timeout(Duration::from_secs(300))?;
//! let report = Publisher::new(client).publish(&request).await?;
//! println!("published version {:?}", report.version_id);
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod publisher;
pub mod schedule;
pub mod traits;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{parse_stale_draft_id, RustoreClient, DEFAULT_BASE_URL, DEFAULT_STALE_DRAFT_RECOVERIES};
pub use error::{PublishError, Result};
pub use publisher::{Publisher, MAX_PRIORITY_UPDATE};
pub use schedule::{resolve_release_time, DefaultReason, ReleaseTime};
pub use traits::{Clock, FixedClock, SystemClock, Transport};
pub use transport::{HttpTransport, MultipartForm, RequestBody};
pub use types::*;
