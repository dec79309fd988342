//! # Listener registry.
//!
//! The registry maps [`ListenerId`]s to the sending half of each listener's
//! delivery queue plus its leave token. It is the only shared mutable state
//! of the hub and is touched exclusively under its own lock.
//!
//! ## Architecture
//! ```text
//! Hub::join ───────► insert(id, Slot)     (write lock, fails once sealed)
//! LeaveHandle ─────► remove(id)           (write lock, at most one winner)
//! dispatch loop ───► snapshot()           (read lock, clones senders)
//!               └──► seal_and_drain()     (write lock, on close)
//! ```
//!
//! ## Rules
//! - The lock is a plain `std::sync::RwLock` and is **never** held across an `.await`:
//!   fan-out works on a snapshot, so joins and leaves never wait on a slow listener.
//! - Iteration order is the `HashMap` order, i.e. intentionally unspecified.
//! - Once sealed, the registry stays empty: inserts fail with `HubClosed`.
//! - A poisoned lock is recovered (the map has no invariant a panic can break
//!   half-way: every mutation is a single insert/remove/drain).

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::HubError;
use crate::signal::Signal;

/// Global counter for listener identities.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(LISTENER_SEQ.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric id.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Hub-side half of a listener.
pub(crate) struct Slot<P> {
    /// Sending half of the listener's delivery queue.
    pub(crate) tx: mpsc::Sender<Arc<Signal<P>>>,
    /// Cancelled when the listener leaves or is evicted.
    pub(crate) leave: CancellationToken,
}

impl<P> Clone for Slot<P> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            leave: self.leave.clone(),
        }
    }
}

struct Slots<P> {
    map: HashMap<ListenerId, Slot<P>>,
    sealed: bool,
}

/// Registry of joined listeners.
pub(crate) struct Registry<P> {
    slots: RwLock<Slots<P>>,
}

impl<P> Registry<P> {
    /// Creates a new, empty, unsealed registry.
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            slots: RwLock::new(Slots {
                map: HashMap::new(),
                sealed: false,
            }),
        })
    }

    /// Registers a slot. Fails with [`HubError::HubClosed`] once sealed.
    pub(crate) fn insert(&self, id: ListenerId, slot: Slot<P>) -> Result<(), HubError> {
        let mut slots = self.write();
        if slots.sealed {
            return Err(HubError::HubClosed);
        }
        slots.map.insert(id, slot);
        Ok(())
    }

    /// Removes a slot. Returns `Some` for exactly one caller per id.
    pub(crate) fn remove(&self, id: ListenerId) -> Option<Slot<P>> {
        self.write().map.remove(&id)
    }

    /// Clones every slot for fan-out outside the lock.
    pub(crate) fn snapshot(&self) -> Vec<(ListenerId, Slot<P>)> {
        self.read()
            .map
            .iter()
            .map(|(id, slot)| (*id, slot.clone()))
            .collect()
    }

    /// Seals the registry and takes every remaining slot.
    pub(crate) fn seal_and_drain(&self) -> Vec<(ListenerId, Slot<P>)> {
        let mut slots = self.write();
        slots.sealed = true;
        slots.map.drain().collect()
    }

    /// Returns the number of joined listeners.
    pub(crate) fn len(&self) -> usize {
        self.read().map.len()
    }

    /// Returns true if the listener is still registered.
    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.read().map.contains_key(&id)
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots<P>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots<P>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}
