//! # Listener: one subscriber's view of the hub.
//!
//! A [`Listener`] owns the receiving half of one delivery queue. It is driven
//! by exactly one consumer: every receive method takes `&mut self`, so the
//! borrow checker rules out concurrent receivers on the same listener.
//!
//! Leaving is different: a [`LeaveHandle`] is cheap to clone and can be moved
//! to any task or thread, and `leave()` never suspends.
//!
//! ## Lifecycle
//! ```text
//! Hub::join() ──► Active ──┬─ leave() / LeaveHandle::leave() ─┐
//!                          ├─ evicted (LagPolicy::Disconnect) ─┼─► Leaving ──► recv() = ListenerClosed ──► Closed
//!                          └─ Hub::close() (queue drained) ────┘
//! ```
//!
//! ## Rules
//! - `leave()` removes the listener from the registry **synchronously** and
//!   cancels its leave token; any suspended `recv()` wakes up immediately.
//! - `recv()` checks the leave token **before** the queue (biased select), so
//!   once leave was initiated it reports `ListenerClosed`, never a signal.
//! - A closed queue (hub closed) maps to `ListenerClosed` as well; signals the
//!   hub accepted before closing are still received first.
//! - Only the first `leave()` has an effect; dropping a listener leaves it.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::registry::{ListenerId, Registry};
use crate::error::HubError;
use crate::events::{Bus, EventKind, HubEvent};
use crate::signal::Signal;

/// Cloneable, thread-safe handle that makes a listener leave its hub.
pub struct LeaveHandle<P> {
    id: ListenerId,
    token: CancellationToken,
    registry: Weak<Registry<P>>,
    bus: Bus,
}

impl<P> Clone for LeaveHandle<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            token: self.token.clone(),
            registry: self.registry.clone(),
            bus: self.bus.clone(),
        }
    }
}

impl<P> LeaveHandle<P> {
    pub(crate) fn new(
        id: ListenerId,
        token: CancellationToken,
        registry: Weak<Registry<P>>,
        bus: Bus,
    ) -> Self {
        Self {
            id,
            token,
            registry,
            bus,
        }
    }

    /// Returns the id of the listener this handle belongs to.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Makes the listener leave.
    ///
    /// Idempotent and non-blocking; safe from any task, thread, or from the
    /// listener's own consumer.
    pub fn leave(&self) {
        self.token.cancel();

        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if registry.remove(self.id).is_some() {
            self.bus.publish(
                HubEvent::new(EventKind::ListenerLeft)
                    .with_listener(self.id)
                    .with_reason("leave"),
            );
        }
    }

    /// Returns true once leave was initiated on this listener.
    pub fn is_leaving(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Subscriber handle returned by [`Hub::join`](crate::Hub::join).
pub struct Listener<P> {
    rx: mpsc::Receiver<Arc<Signal<P>>>,
    handle: LeaveHandle<P>,
    closed: bool,
}

impl<P> Listener<P> {
    pub(crate) fn new(rx: mpsc::Receiver<Arc<Signal<P>>>, handle: LeaveHandle<P>) -> Self {
        Self {
            rx,
            handle,
            closed: false,
        }
    }

    /// Returns the listener id.
    pub fn id(&self) -> ListenerId {
        self.handle.id
    }

    /// Returns a handle that can make this listener leave from elsewhere.
    pub fn leave_handle(&self) -> LeaveHandle<P> {
        self.handle.clone()
    }

    /// Leaves the hub. See [`LeaveHandle::leave`].
    pub fn leave(&self) {
        self.handle.leave();
    }

    /// Returns true once `recv` has reported [`HubError::ListenerClosed`].
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Receives the next signal.
    ///
    /// Suspends until a signal is delivered or the listener leaves. After the
    /// first [`HubError::ListenerClosed`] every call returns it immediately.
    ///
    /// Cancel safe: dropping the future loses no signal.
    pub async fn recv(&mut self) -> Result<Arc<Signal<P>>, HubError> {
        if self.closed {
            return Err(HubError::ListenerClosed);
        }

        let next = tokio::select! {
            biased;
            _ = self.handle.token.cancelled() => None,
            msg = self.rx.recv() => msg,
        };

        match next {
            Some(sig) => Ok(sig),
            None => Err(self.close_out()),
        }
    }

    /// Receives the next signal, waiting at most `timeout`.
    ///
    /// [`HubError::Timeout`] leaves the listener usable.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<Arc<Signal<P>>, HubError> {
        match time::timeout(timeout, self.recv()).await {
            Ok(res) => res,
            Err(_elapsed) => Err(HubError::Timeout { timeout }),
        }
    }

    /// Receives the next signal unless `cancel` fires first.
    ///
    /// [`HubError::Canceled`] leaves the listener usable.
    pub async fn recv_with_cancel(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Arc<Signal<P>>, HubError> {
        if self.closed {
            return Err(HubError::ListenerClosed);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(HubError::Canceled),
            res = self.recv() => res,
        }
    }

    /// Takes a queued signal without suspending.
    ///
    /// Returns `Ok(None)` when nothing is queued.
    pub fn try_recv(&mut self) -> Result<Option<Arc<Signal<P>>>, HubError> {
        if self.closed {
            return Err(HubError::ListenerClosed);
        }
        if self.handle.token.is_cancelled() {
            return Err(self.close_out());
        }
        match self.rx.try_recv() {
            Ok(sig) => Ok(Some(sig)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(self.close_out()),
        }
    }

    /// Marks the listener closed and retires its queue.
    fn close_out(&mut self) -> HubError {
        self.closed = true;
        self.rx.close();
        HubError::ListenerClosed
    }
}

impl<P> Drop for Listener<P> {
    fn drop(&mut self) {
        self.handle.leave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::Slot;

    fn listener(
        capacity: usize,
    ) -> (
        Listener<&'static str>,
        Slot<&'static str>,
        Arc<Registry<&'static str>>,
        Bus,
    ) {
        let registry = Registry::new();
        let bus = Bus::new(16);
        let (tx, rx) = mpsc::channel(capacity);
        let token = CancellationToken::new();
        let id = ListenerId::next();
        let slot = Slot {
            tx,
            leave: token.clone(),
        };
        registry.insert(id, slot.clone()).expect("insert");
        let handle = LeaveHandle::new(id, token, Arc::downgrade(&registry), bus.clone());
        (Listener::new(rx, handle), slot, registry, bus)
    }

    #[tokio::test]
    async fn test_recv_returns_delivered_signal() {
        let (mut l, slot, _reg, _bus) = listener(4);
        slot.tx
            .send(Arc::new(Signal::new("k", "v")))
            .await
            .expect("send");
        let sig = l.recv().await.expect("signal");
        assert_eq!(sig.key(), "k");
        assert_eq!(*sig.payload(), "v");
    }

    #[tokio::test]
    async fn test_leave_wins_over_queued_signal() {
        let (mut l, slot, reg, _bus) = listener(4);
        slot.tx
            .send(Arc::new(Signal::new("k", "v")))
            .await
            .expect("send");

        l.leave();
        assert_eq!(reg.len(), 0);
        assert_eq!(l.recv().await.unwrap_err(), HubError::ListenerClosed);
        assert!(l.is_closed());
        assert_eq!(l.recv().await.unwrap_err(), HubError::ListenerClosed);
    }

    #[tokio::test]
    async fn test_dropped_sender_drains_then_closes() {
        let (mut l, slot, reg, _bus) = listener(4);
        slot.tx
            .send(Arc::new(Signal::new("k", "last")))
            .await
            .expect("send");
        drop(slot);
        drop(reg.seal_and_drain());

        assert_eq!(*l.recv().await.expect("queued").payload(), "last");
        assert_eq!(l.recv().await.unwrap_err(), HubError::ListenerClosed);
    }

    #[tokio::test]
    async fn test_double_leave_publishes_once() {
        let (l, _slot, _reg, bus) = listener(1);
        let mut events = bus.subscribe();
        let handle = l.leave_handle();

        handle.leave();
        handle.leave();
        l.leave();

        let ev = events.try_recv().expect("left event");
        assert_eq!(ev.kind, EventKind::ListenerLeft);
        assert_eq!(ev.listener, Some(l.id()));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_recv_timeout_keeps_listener_open() {
        let (mut l, _slot, _reg, _bus) = listener(1);
        let err = l.recv_timeout(Duration::from_millis(10)).await.unwrap_err();
        assert_eq!(
            err,
            HubError::Timeout {
                timeout: Duration::from_millis(10)
            }
        );
        assert!(!l.is_closed());
    }

    #[tokio::test]
    async fn test_recv_with_cancel() {
        let (mut l, _slot, _reg, _bus) = listener(1);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(
            l.recv_with_cancel(&cancel).await.unwrap_err(),
            HubError::Canceled
        );
        assert!(!l.is_closed());
    }

    #[tokio::test]
    async fn test_try_recv() {
        let (mut l, slot, _reg, _bus) = listener(2);
        assert_eq!(l.try_recv().expect("open"), None);
        slot.tx
            .try_send(Arc::new(Signal::new("k", "v")))
            .expect("room");
        assert!(l.try_recv().expect("open").is_some());
        l.leave();
        assert_eq!(l.try_recv().unwrap_err(), HubError::ListenerClosed);
    }

    #[tokio::test]
    async fn test_drop_leaves() {
        let (l, _slot, reg, _bus) = listener(1);
        let handle = l.leave_handle();
        drop(l);
        assert!(handle.is_leaving());
        assert_eq!(reg.len(), 0);
    }
}
