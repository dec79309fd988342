//! Error types used by the hub and its listeners.
//!
//! [`HubError`] covers every failure the crate can report:
//!
//! - terminal conditions: [`HubError::HubClosed`], [`HubError::ListenerClosed`];
//! - per-call conditions: [`HubError::Timeout`], [`HubError::Canceled`].
//!
//! Terminal errors are never retried by the hub itself; the caller decides
//! what to do next (e.g. join again on another hub). Per-call errors leave the
//! hub and the listener untouched, so the same call can simply be repeated.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the hub and its listeners.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The hub has been asked to close (or already closed); no more sends or joins.
    #[error("hub closed")]
    HubClosed,

    /// The listener left (explicitly, by eviction, or because the hub closed).
    #[error("listener closed")]
    ListenerClosed,

    /// A bounded send/receive did not complete in time.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The caller's cancellation token fired before the operation completed.
    #[error("operation canceled")]
    Canceled,
}

impl HubError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sighub::HubError;
    /// use std::time::Duration;
    ///
    /// let err = HubError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "hub_timeout");
    /// assert_eq!(HubError::ListenerClosed.as_label(), "listener_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HubError::HubClosed => "hub_closed",
            HubError::ListenerClosed => "listener_closed",
            HubError::Timeout { .. } => "hub_timeout",
            HubError::Canceled => "hub_canceled",
        }
    }

    /// Indicates whether the error ends the life of the hub or listener.
    ///
    /// Returns `true` for [`HubError::HubClosed`] and [`HubError::ListenerClosed`].
    ///
    /// # Example
    /// ```
    /// use sighub::HubError;
    ///
    /// assert!(HubError::HubClosed.is_terminal());
    /// assert!(!HubError::Canceled.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, HubError::HubClosed | HubError::ListenerClosed)
    }
}
