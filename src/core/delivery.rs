//! # Deliver one signal to one listener.
//!
//! Pushes a signal into a single listener queue, bounded by the hub's
//! [`DeliveryPolicy`]. The dispatch loop calls [`deliver`] once per listener per
//! signal and acts on the returned [`Delivery`].
//!
//! ## Flow
//! ```text
//! leave token cancelled? ──► Gone
//! try_send ──┬─ Ok      ──► Delivered
//!            ├─ Closed  ──► Gone
//!            └─ Full ──► hub shutting down? ──► Lagged(Shutdown)
//!                        policy:
//!                  Block       → wait (leave/shutdown-aware)        → Delivered / Gone / Lagged(Shutdown)
//!                  Timeout(d)  → wait ≤ d (leave/shutdown-aware)    → ... / Lagged(Timeout)
//!                  DropIfFull  →                                       Lagged(Full)
//! ```
//!
//! ## Rules
//! - The fast path never arms a timer: a queue with room is filled immediately.
//! - Every wait also watches the listener's leave token, so a listener that
//!   leaves mid-delivery cancels the in-flight attempt.
//! - Every wait also watches the hub's shutdown token. Once close is requested
//!   a delivery only ever tries the queue once, so close finishes in bounded
//!   time whatever the policy.
//! - `Gone` is not an error: the listener left on its own, nothing to report.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::registry::Slot;
use crate::policies::DeliveryPolicy;
use crate::signal::Signal;

/// Why a bounded delivery failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LagReason {
    /// Queue was full and the policy did not allow waiting.
    Full,
    /// Queue stayed full for the whole wait budget.
    Timeout(Duration),
    /// Queue was full while the hub was shutting down.
    Shutdown,
}

impl LagReason {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            LagReason::Full => "full",
            LagReason::Timeout(_) => "timeout",
            LagReason::Shutdown => "close",
        }
    }
}

/// Outcome of one delivery attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// Signal is in the listener's queue.
    Delivered,
    /// Listener left (or its queue was torn down) before or during delivery.
    Gone,
    /// Bounded delivery failed; the lag policy decides what happens next.
    Lagged(LagReason),
}

/// Delivers `sig` to the listener behind `slot` according to `policy`.
///
/// Never waits once `shutdown` is cancelled.
pub(crate) async fn deliver<P>(
    slot: &Slot<P>,
    sig: Arc<Signal<P>>,
    policy: DeliveryPolicy,
    shutdown: &CancellationToken,
) -> Delivery {
    if slot.leave.is_cancelled() {
        return Delivery::Gone;
    }

    let sig = match slot.tx.try_send(sig) {
        Ok(()) => return Delivery::Delivered,
        Err(TrySendError::Closed(_)) => return Delivery::Gone,
        Err(TrySendError::Full(sig)) => sig,
    };
    if shutdown.is_cancelled() {
        return Delivery::Lagged(LagReason::Shutdown);
    }

    match policy.wait_budget() {
        None => send_or_leave(slot, sig, shutdown).await,
        Some(d) if d.is_zero() => Delivery::Lagged(LagReason::Full),
        Some(d) => match time::timeout(d, send_or_leave(slot, sig, shutdown)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Delivery::Lagged(LagReason::Timeout(d)),
        },
    }
}

/// Waits for queue space unless the listener leaves or the hub shuts down first.
async fn send_or_leave<P>(
    slot: &Slot<P>,
    sig: Arc<Signal<P>>,
    shutdown: &CancellationToken,
) -> Delivery {
    tokio::select! {
        biased;
        _ = slot.leave.cancelled() => Delivery::Gone,
        _ = shutdown.cancelled() => Delivery::Lagged(LagReason::Shutdown),
        res = slot.tx.send(sig) => match res {
            Ok(()) => Delivery::Delivered,
            Err(_closed) => Delivery::Gone,
        },
    }
}
