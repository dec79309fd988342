//! # Lifecycle events emitted by the hub.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Membership events**: listeners joining, leaving, being evicted
//! - **Delivery events**: a signal dropped for one listener
//! - **Shutdown events**: close requested, hub fully closed
//!
//! Observer workers add two more kinds (`ObserverOverflow`, `ObserverPanicked`)
//! to report problems with observers themselves.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use sighub::{HubEvent, EventKind};
//!
//! let ev = HubEvent::new(EventKind::SignalDropped)
//!     .with_key("orders")
//!     .with_reason("timeout")
//!     .with_wait(Duration::from_millis(50));
//!
//! assert_eq!(ev.kind, EventKind::SignalDropped);
//! assert_eq!(ev.key.as_deref(), Some("orders"));
//! assert_eq!(ev.wait_ms, Some(50));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::ListenerId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of hub events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Membership events ===
    /// A listener was registered.
    ///
    /// Sets:
    /// - `listener`: listener id
    ListenerJoined,

    /// A listener left on request (explicit leave, drop, or hub close).
    ///
    /// Sets:
    /// - `listener`: listener id
    /// - `reason`: `"leave"` or `"close"`
    ListenerLeft,

    /// A lagging listener was removed by the hub (`LagPolicy::Disconnect`).
    ///
    /// Sets:
    /// - `listener`: listener id
    /// - `key`: key of the signal that could not be delivered
    /// - `reason`: `"timeout"` or `"full"`
    /// - `wait_ms`: configured delivery timeout (timeout policy only)
    ListenerEvicted,

    // === Delivery events ===
    /// A signal was dropped for one listener (`LagPolicy::Skip`).
    ///
    /// Sets:
    /// - `listener`: listener id
    /// - `key`: signal key
    /// - `reason`: `"timeout"` or `"full"`
    /// - `wait_ms`: configured delivery timeout (timeout policy only)
    SignalDropped,

    // === Shutdown events ===
    /// Close was requested (first caller only).
    CloseRequested,

    /// Dispatch loop exited; registry empty and sealed.
    HubClosed,

    // === Observer events ===
    /// Observer dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: `"observer=<name> reason=<full|closed>"`
    ObserverOverflow,

    /// Observer panicked while processing an event.
    ///
    /// Sets:
    /// - `reason`: `"observer=<name> info=<panic message>"`
    ObserverPanicked,
}

impl EventKind {
    /// Returns a short stable label (kebab-case) used in log lines.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::ListenerJoined => "joined",
            EventKind::ListenerLeft => "left",
            EventKind::ListenerEvicted => "evicted",
            EventKind::SignalDropped => "dropped",
            EventKind::CloseRequested => "close-requested",
            EventKind::HubClosed => "closed",
            EventKind::ObserverOverflow => "observer-overflow",
            EventKind::ObserverPanicked => "observer-panicked",
        }
    }
}

/// Hub event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct HubEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Listener concerned, if any.
    pub listener: Option<ListenerId>,
    /// Signal key concerned, if any.
    pub key: Option<Arc<str>>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
    /// Delivery wait budget in milliseconds (compact).
    pub wait_ms: Option<u32>,
}

impl HubEvent {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            listener: None,
            key: None,
            reason: None,
            wait_ms: None,
        }
    }

    /// Attaches a listener id.
    #[inline]
    pub fn with_listener(mut self, id: ListenerId) -> Self {
        self.listener = Some(id);
        self
    }

    /// Attaches a signal key.
    #[inline]
    pub fn with_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a wait budget (stored as milliseconds).
    #[inline]
    pub fn with_wait(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.wait_ms = Some(ms);
        self
    }

    /// Creates an observer overflow event.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        HubEvent::new(EventKind::ObserverOverflow)
            .with_reason(format!("observer={observer} reason={reason}"))
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        HubEvent::new(EventKind::ObserverPanicked)
            .with_reason(format!("observer={observer} info={info}"))
    }

    /// Returns true for `ObserverOverflow` events (never re-reported on overflow).
    #[inline]
    pub fn is_observer_overflow(&self) -> bool {
        matches!(self.kind, EventKind::ObserverOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = HubEvent::new(EventKind::CloseRequested);
        let b = HubEvent::new(EventKind::HubClosed);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_wait_saturates() {
        let ev = HubEvent::new(EventKind::SignalDropped).with_wait(Duration::from_secs(u64::MAX));
        assert_eq!(ev.wait_ms, Some(u32::MAX));
    }

    #[test]
    fn test_observer_overflow_reason() {
        let ev = HubEvent::observer_overflow("metrics", "full");
        assert!(ev.is_observer_overflow());
        assert_eq!(ev.reason.as_deref(), Some("observer=metrics reason=full"));
    }
}
