//! # What to do with a listener that cannot keep up.
//!
//! [`LagPolicy`] is consulted when a bounded delivery fails (timeout elapsed or
//! queue full).

/// Reaction to a failed bounded delivery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LagPolicy {
    /// Drop the signal for this listener only; it stays joined.
    /// Publishes `EventKind::SignalDropped`.
    Skip,
    /// Evict the listener; its next receive reports `ListenerClosed` (default).
    /// Publishes `EventKind::ListenerEvicted`.
    #[default]
    Disconnect,
}
