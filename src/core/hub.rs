//! # Hub: the broadcast front door.
//!
//! A [`Hub`] accepts signals from any number of producers and fans each one
//! out to every joined [`Listener`]. Handles are cheap to clone; every clone
//! talks to the same dispatch loop.
//!
//! ## Key responsibilities
//! - hand signals to the dispatch loop (`send`, bounded by `inbound_capacity`)
//! - register listeners (`join`, synchronous)
//! - run the shutdown handshake (`close`, idempotent)
//!
//! ## Shutdown handshake
//! ```text
//! close() ──► state: Running ─► Closing     (first caller only)
//!        ├─► publish CloseRequested
//!        ├─► shutdown token cancelled       (send/join now fail with HubClosed)
//!        └─► wait_for(state == Closed)      (every caller)
//!                       ▲
//! dispatch loop ────────┘ drains, retires listeners, state ─► Closed
//! ```
//!
//! ## Example
//! ```rust
//! use sighub::{Hub, HubError, Signal};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), HubError> {
//!     let hub: Hub<&'static str> = Hub::new();
//!     let mut listener = hub.join()?;
//!
//!     hub.send(Signal::new("hello", "hello world")).await?;
//!     let sig = listener.recv().await?;
//!     assert_eq!(sig.key(), "hello");
//!
//!     hub.close().await;
//!     assert_eq!(listener.recv().await.unwrap_err(), HubError::ListenerClosed);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::builder::HubBuilder;
use crate::core::config::HubConfig;
use crate::core::listener::{LeaveHandle, Listener};
use crate::core::registry::{ListenerId, Registry, Slot};
use crate::error::HubError;
use crate::events::{Bus, EventKind, HubEvent};
use crate::signal::Signal;

/// Lifecycle state of a hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HubState {
    /// Accepting sends and joins.
    Running,
    /// Close requested; the dispatch loop is draining.
    Closing,
    /// Dispatch loop exited; registry empty and sealed.
    Closed,
}

pub(crate) struct Inner<P> {
    pub(crate) cfg: HubConfig,
    pub(crate) inbound: mpsc::Sender<Arc<Signal<P>>>,
    pub(crate) registry: Arc<Registry<P>>,
    pub(crate) bus: Bus,
    pub(crate) shutdown: CancellationToken,
    pub(crate) state: Arc<watch::Sender<HubState>>,
}

/// Broadcast hub handle.
pub struct Hub<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for Hub<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Send + Sync + 'static> Hub<P> {
    /// Creates and starts a hub with [`HubConfig::default`].
    ///
    /// Must be called from within a tokio runtime (spawns the dispatch loop).
    pub fn new() -> Self {
        HubBuilder::new(HubConfig::default()).build()
    }

    /// Creates and starts a hub with the given configuration.
    pub fn with_config(cfg: HubConfig) -> Self {
        HubBuilder::new(cfg).build()
    }

    /// Returns a builder for hubs with observers.
    pub fn builder(cfg: HubConfig) -> HubBuilder<P> {
        HubBuilder::new(cfg)
    }
}

impl<P: Send + Sync + 'static> Default for Hub<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Hub<P> {
    pub(crate) fn from_inner(inner: Arc<Inner<P>>) -> Self {
        Self { inner }
    }

    /// Hands a signal to the dispatch loop.
    ///
    /// Suspends only until the inbound channel has room. Once this returns
    /// `Ok`, the signal will be fanned out even if the hub closes right after
    /// (during shutdown, to every listener whose queue has room).
    ///
    /// Fails with [`HubError::HubClosed`] once close was requested.
    pub async fn send(&self, signal: impl Into<Arc<Signal<P>>>) -> Result<(), HubError> {
        if self.inner.shutdown.is_cancelled() {
            return Err(HubError::HubClosed);
        }
        let sig = signal.into();
        tokio::select! {
            biased;
            _ = self.inner.shutdown.cancelled() => Err(HubError::HubClosed),
            res = self.inner.inbound.send(sig) => res.map_err(|_| HubError::HubClosed),
        }
    }

    /// Like [`send`](Self::send), giving up after `timeout`.
    ///
    /// On [`HubError::Timeout`] the signal was not accepted and is never delivered.
    pub async fn send_timeout(
        &self,
        signal: impl Into<Arc<Signal<P>>>,
        timeout: Duration,
    ) -> Result<(), HubError> {
        match time::timeout(timeout, self.send(signal)).await {
            Ok(res) => res,
            Err(_elapsed) => Err(HubError::Timeout { timeout }),
        }
    }

    /// Like [`send`](Self::send), giving up when `cancel` fires.
    ///
    /// On [`HubError::Canceled`] the signal was not accepted and is never delivered.
    pub async fn send_with_cancel(
        &self,
        signal: impl Into<Arc<Signal<P>>>,
        cancel: &CancellationToken,
    ) -> Result<(), HubError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(HubError::Canceled),
            res = self.send(signal) => res,
        }
    }

    /// Registers a new listener.
    ///
    /// The listener receives every signal the dispatch loop picks up after
    /// this call returns. Fails with [`HubError::HubClosed`] once close was
    /// requested.
    pub fn join(&self) -> Result<Listener<P>, HubError> {
        if self.inner.shutdown.is_cancelled() {
            return Err(HubError::HubClosed);
        }

        let id = ListenerId::next();
        let (tx, rx) = mpsc::channel(self.inner.cfg.listener_capacity_clamped());
        let token = CancellationToken::new();

        self.inner.registry.insert(
            id,
            Slot {
                tx,
                leave: token.clone(),
            },
        )?;
        self.inner
            .bus
            .publish(HubEvent::new(EventKind::ListenerJoined).with_listener(id));

        let handle = LeaveHandle::new(
            id,
            token,
            Arc::downgrade(&self.inner.registry),
            self.inner.bus.clone(),
        );
        Ok(Listener::new(rx, handle))
    }

    /// Closes the hub and waits until it is fully shut down.
    ///
    /// Every remaining listener is made to leave: after draining the signals
    /// already queued for it, its `recv` reports [`HubError::ListenerClosed`].
    /// Completes in bounded time whatever the [`DeliveryPolicy`](crate::DeliveryPolicy):
    /// once close is requested, the dispatch loop stops waiting on full
    /// listener queues and those listeners miss the pending signal.
    ///
    /// If the dispatch task is torn down early (panic, abort, runtime
    /// shutdown), it still flips the state to `Closed` as it is dropped, so
    /// this call returns rather than hanging.
    /// Concurrent callers all wait for the same completion; calling again
    /// after completion returns immediately.
    pub async fn close(&self) {
        let requested = self.inner.state.send_if_modified(|state| {
            if *state == HubState::Running {
                *state = HubState::Closing;
                true
            } else {
                false
            }
        });
        if requested {
            self.inner
                .bus
                .publish(HubEvent::new(EventKind::CloseRequested));
            self.inner.shutdown.cancel();
        }

        let mut rx = self.inner.state.subscribe();
        // never Err: `inner` keeps a state sender alive
        let _ = rx.wait_for(|state| *state == HubState::Closed).await;
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> HubState {
        *self.inner.state.borrow()
    }

    /// Returns true once the dispatch loop has exited.
    pub fn is_closed(&self) -> bool {
        self.state() == HubState::Closed
    }

    /// Returns the number of joined listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Returns true if the listener is still joined.
    pub fn is_joined(&self, id: ListenerId) -> bool {
        self.inner.registry.contains(id)
    }

    /// Returns the hub configuration.
    pub fn config(&self) -> &HubConfig {
        &self.inner.cfg
    }

    /// Subscribes to lifecycle events published after this call.
    pub fn events(&self) -> broadcast::Receiver<HubEvent> {
        self.inner.bus.subscribe()
    }
}
