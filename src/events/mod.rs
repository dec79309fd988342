//! Hub events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the hub, its listeners
//! and the observer workers.
//!
//! ## Contents
//! - [`EventKind`], [`HubEvent`] event classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Hub::join`, `LeaveHandle::leave`, the dispatch loop
//!   (evictions, drops, close), `ObserverSet` workers (overflow/panic).
//! - **Consumers**: the observer forwarder (fans out to `ObserverSet`) and any
//!   receiver obtained from `Hub::events()`.

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{EventKind, HubEvent};
