//! # Dispatch loop: the hub's single fan-out task.
//!
//! One [`Dispatcher`] runs per hub, spawned by the builder. It is the only
//! task that fans signals out, evicts lagging listeners, and tears the
//! registry down on close.
//!
//! ## Architecture
//! ```text
//! loop {
//!   select (biased) {
//!     shutdown token cancelled     ──► break
//!     inbound.recv() ─┬─ Some(sig) ──► fan_out(sig)
//!                     └─ None      ──► break            (every Hub handle dropped)
//!   }
//! }
//! on exit:
//!   ├─► shutdown token cancelled    → deliveries stop waiting on full queues
//!   ├─► inbound.close(); fan out every signal already accepted by send()
//!   ├─► registry.seal_and_drain()   → drop senders, publish ListenerLeft(close)
//!   ├─► publish HubClosed
//!   └─► state = Closed              → wakes every Hub::close() waiter
//! ```
//!
//! ## Rules
//! - Fan-out is **sequential** over a registry snapshot, in unspecified order.
//! - Per listener, signals are queued in the order the loop received them (FIFO).
//! - A signal whose `send()` returned `Ok` is always fanned out, even when
//!   close was requested right after. During shutdown it reaches every
//!   listener whose queue has room.
//! - On close, senders are dropped rather than leave tokens cancelled, so
//!   listeners drain what they were already given before seeing `ListenerClosed`.
//! - Once shutdown starts, a listener whose queue is full misses the signal
//!   (`SignalDropped`, reason `close`) whatever the policies say; close never
//!   waits on a stalled consumer.
//! - If the task dies without reaching the end of `run` (panic, abort, runtime
//!   teardown), dropping the dispatcher still seals the registry and flips the
//!   state to `Closed`, so `Hub::close()` callers are released.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::core::delivery::{Delivery, LagReason, deliver};
use crate::core::hub::HubState;
use crate::core::registry::{ListenerId, Registry, Slot};
use crate::events::{Bus, EventKind, HubEvent};
use crate::policies::{DeliveryPolicy, LagPolicy};
use crate::signal::Signal;

/// Fan-out task state.
pub(crate) struct Dispatcher<P> {
    pub(crate) inbound: mpsc::Receiver<Arc<Signal<P>>>,
    pub(crate) registry: Arc<Registry<P>>,
    pub(crate) bus: Bus,
    pub(crate) shutdown: CancellationToken,
    pub(crate) state: Arc<watch::Sender<HubState>>,
    pub(crate) delivery: DeliveryPolicy,
    pub(crate) on_lag: LagPolicy,
}

impl<P: Send + Sync + 'static> Dispatcher<P> {
    /// Runs until close is requested or every hub handle is gone.
    pub(crate) async fn run(mut self) {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => None,
                msg = self.inbound.recv() => msg,
            };
            match next {
                Some(sig) => self.fan_out(sig).await,
                None => break,
            }
        }

        self.shutdown.cancel();
        self.drain_inbound().await;
        self.force_leave_all();
        self.finish();
    }

    /// Delivers one signal to every listener in the current snapshot.
    async fn fan_out(&self, sig: Arc<Signal<P>>) {
        for (id, slot) in self.registry.snapshot() {
            match deliver(&slot, Arc::clone(&sig), self.delivery, &self.shutdown).await {
                Delivery::Delivered | Delivery::Gone => {}
                Delivery::Lagged(reason) => self.on_lagged(id, &slot, &sig, reason),
            }
        }
    }

    /// Applies the lag policy to a listener that could not take `sig`.
    fn on_lagged(&self, id: ListenerId, slot: &Slot<P>, sig: &Signal<P>, reason: LagReason) {
        let event = match (reason, self.on_lag) {
            // the listener is retired by force_leave_all and keeps its queue
            (LagReason::Shutdown, _) | (_, LagPolicy::Skip) => {
                HubEvent::new(EventKind::SignalDropped)
            }
            (_, LagPolicy::Disconnect) => {
                if self.registry.remove(id).is_none() {
                    // lost the race against an explicit leave
                    return;
                }
                slot.leave.cancel();
                HubEvent::new(EventKind::ListenerEvicted)
            }
        };

        let mut event = event
            .with_listener(id)
            .with_key(sig.key_arc())
            .with_reason(reason.as_str());
        if let LagReason::Timeout(d) = reason {
            event = event.with_wait(d);
        }
        self.bus.publish(event);
    }

    /// Fans out every signal that `send()` already handed over.
    async fn drain_inbound(&mut self) {
        self.inbound.close();
        while let Some(sig) = self.inbound.recv().await {
            self.fan_out(sig).await;
        }
    }

    /// Seals the registry and retires every remaining listener.
    fn force_leave_all(&self) {
        for (id, slot) in self.registry.seal_and_drain() {
            drop(slot);
            self.bus.publish(
                HubEvent::new(EventKind::ListenerLeft)
                    .with_listener(id)
                    .with_reason("close"),
            );
        }
    }

    /// Flips the hub to `Closed` and wakes every closer.
    fn finish(&self) {
        self.bus.publish(HubEvent::new(EventKind::HubClosed));
        self.state.send_replace(HubState::Closed);
    }
}

impl<P> Drop for Dispatcher<P> {
    fn drop(&mut self) {
        self.shutdown.cancel();
        drop(self.registry.seal_and_drain());
        self.state.send_if_modified(|state| {
            if *state == HubState::Closed {
                false
            } else {
                *state = HubState::Closed;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> (
        Dispatcher<u8>,
        mpsc::Sender<Arc<Signal<u8>>>,
        watch::Receiver<HubState>,
    ) {
        let (tx, rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(HubState::Running);
        let dispatcher = Dispatcher {
            inbound: rx,
            registry: Registry::new(),
            bus: Bus::new(16),
            shutdown: CancellationToken::new(),
            state: Arc::new(state_tx),
            delivery: DeliveryPolicy::Block,
            on_lag: LagPolicy::Disconnect,
        };
        (dispatcher, tx, state_rx)
    }

    #[tokio::test]
    async fn test_dropped_dispatcher_releases_closers() {
        let (d, _tx, mut state) = dispatcher();
        let registry = Arc::clone(&d.registry);
        let shutdown = d.shutdown.clone();

        drop(d);

        assert_eq!(*state.borrow_and_update(), HubState::Closed);
        assert!(shutdown.is_cancelled());
        assert_eq!(
            registry.insert(
                ListenerId::next(),
                Slot {
                    tx: mpsc::channel(1).0,
                    leave: CancellationToken::new(),
                },
            ),
            Err(crate::error::HubError::HubClosed)
        );
    }

    #[tokio::test]
    async fn test_shutdown_lag_keeps_listener_queue() {
        let (d, _tx, _state) = dispatcher();
        let mut events = d.bus.subscribe();
        let (tx, mut rx) = mpsc::channel(1);
        let slot = Slot {
            tx,
            leave: CancellationToken::new(),
        };
        let id = ListenerId::next();
        d.registry.insert(id, slot.clone()).expect("insert");

        d.shutdown.cancel();
        d.fan_out(Arc::new(Signal::new("k", 1))).await;
        d.fan_out(Arc::new(Signal::new("k", 2))).await;

        let ev = events.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::SignalDropped);
        assert_eq!(ev.reason.as_deref(), Some("close"));
        assert!(d.registry.contains(id));
        assert!(!slot.leave.is_cancelled());
        assert_eq!(*rx.recv().await.expect("queued").payload(), 1);
    }
}
