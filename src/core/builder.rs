use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::{
    config::HubConfig,
    dispatch::Dispatcher,
    hub::{Hub, HubState, Inner},
    registry::Registry,
};
use crate::{
    events::{Bus, EventKind, HubEvent},
    observers::{Observe, ObserverSet},
};

/// Builder for constructing a [`Hub`] with optional observers.
pub struct HubBuilder<P> {
    cfg: HubConfig,
    observers: Vec<Arc<dyn Observe>>,
    _payload: std::marker::PhantomData<fn() -> P>,
}

impl<P: Send + Sync + 'static> HubBuilder<P> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: HubConfig) -> Self {
        Self {
            cfg,
            observers: Vec::new(),
            _payload: std::marker::PhantomData,
        }
    }

    /// Sets lifecycle observers.
    ///
    /// Observers receive hub events (joins, leaves, evictions, drops, close)
    /// through dedicated workers with bounded queues.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Builds the hub and starts its tasks.
    ///
    /// Must be called from within a tokio runtime:
    /// - Event bus for lifecycle events
    /// - Observer forwarder + workers (only if observers were given)
    /// - Dispatch loop
    pub fn build(self) -> Hub<P> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let (state_tx, _state_rx) = watch::channel(HubState::Running);
        let state = Arc::new(state_tx);

        if !self.observers.is_empty() {
            let set = ObserverSet::new(self.observers, bus.clone());
            spawn_forwarder(bus.subscribe(), state.subscribe(), set);
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(self.cfg.inbound_capacity_clamped());
        let registry = Registry::new();
        let shutdown = CancellationToken::new();

        let dispatcher = Dispatcher {
            inbound: inbound_rx,
            registry: Arc::clone(&registry),
            bus: bus.clone(),
            shutdown: shutdown.clone(),
            state: Arc::clone(&state),
            delivery: self.cfg.delivery,
            on_lag: self.cfg.on_lag,
        };
        tokio::spawn(dispatcher.run());

        Hub::from_inner(Arc::new(Inner {
            cfg: self.cfg,
            inbound: inbound_tx,
            registry,
            bus,
            shutdown,
            state,
        }))
    }
}

/// Forwards bus events to the observer set until the hub reports `HubClosed`,
/// then lets every observer worker drain.
///
/// The state watch covers a forwarder that lagged past the `HubClosed` event:
/// once the hub is closed, whatever is still buffered is forwarded and the
/// loop ends.
fn spawn_forwarder(
    mut rx: broadcast::Receiver<HubEvent>,
    mut state: watch::Receiver<HubState>,
    set: ObserverSet,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => {
                        let last = ev.kind == EventKind::HubClosed;
                        set.emit(&ev);
                        if last {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = state.wait_for(|s| *s == HubState::Closed) => {
                    forward_buffered(&mut rx, &set);
                    break;
                }
            }
        }
        set.shutdown().await;
    });
}

fn forward_buffered(rx: &mut broadcast::Receiver<HubEvent>, set: &ObserverSet) {
    loop {
        match rx.try_recv() {
            Ok(ev) => set.emit(&ev),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}
