//! # Delivery policies for fan-out.
//!
//! [`DeliveryPolicy`] decides how long the dispatch loop may wait for room in
//! one listener's queue before giving up on that listener for the current
//! signal.
//!
//! - [`DeliveryPolicy::Block`] wait as long as it takes.
//! - [`DeliveryPolicy::Timeout`] wait at most the given duration (default, 5s).
//! - [`DeliveryPolicy::DropIfFull`] never wait.
//!
//! ## Choosing the right policy
//!
//! **Every listener must see every signal, consumers are trusted**:
//! ```text
//! DeliveryPolicy::Block            → one stalled consumer stalls the whole hub
//! ```
//!
//! **Consumers may stall, the hub must keep moving** (default):
//! ```text
//! DeliveryPolicy::Timeout(d)       → at most `d` of head-of-line blocking per listener
//! ```
//!
//! **Latency matters more than completeness**:
//! ```text
//! DeliveryPolicy::DropIfFull       → no waiting; LagPolicy decides what happens
//! ```

use std::time::Duration;

/// Policy controlling how long a single delivery may wait for queue space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Wait indefinitely. A full queue stalls delivery to every other listener.
    Block,
    /// Wait at most the given duration, then apply the [`LagPolicy`](crate::LagPolicy).
    ///
    /// `Duration::ZERO` behaves like [`DeliveryPolicy::DropIfFull`].
    Timeout(Duration),
    /// Never wait: a full queue immediately triggers the [`LagPolicy`](crate::LagPolicy).
    DropIfFull,
}

impl DeliveryPolicy {
    /// Returns the wait budget as an `Option`.
    ///
    /// - `None` → unbounded wait
    /// - `Some(Duration::ZERO)` → no wait
    /// - `Some(d)` → bounded wait
    #[inline]
    pub fn wait_budget(&self) -> Option<Duration> {
        match self {
            DeliveryPolicy::Block => None,
            DeliveryPolicy::Timeout(d) => Some(*d),
            DeliveryPolicy::DropIfFull => Some(Duration::ZERO),
        }
    }
}

impl Default for DeliveryPolicy {
    /// Returns `DeliveryPolicy::Timeout(5s)`.
    fn default() -> Self {
        DeliveryPolicy::Timeout(Duration::from_secs(5))
    }
}
