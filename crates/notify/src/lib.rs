//! Notification transports for approval requests.
//!
//! Both transports are acknowledgment stubs behind the
//! `NotificationChannel` seam: they accept a request, emit a structured log
//! line, and return the acknowledgment the pipeline re-exposes. Real
//! delivery (and its retry semantics) lives on the far side of the
//! connection string they are constructed with.

pub mod email;
pub mod slack;

use thiserror::Error;

pub use email::EmailNotifier;
pub use slack::SlackNotifier;

/// A transport cannot be built without knowing where to deliver.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{transport} connection string is required")]
pub struct MissingConnectionString {
    pub transport: &'static str,
}
