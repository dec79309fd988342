//! # sighub
//!
//! **Sighub** is an in-process broadcast hub for async Rust.
//!
//! Producers [`send`](Hub::send) keyed [`Signal`]s into a [`Hub`]; every
//! [`Listener`] joined at the time the hub picks a signal up receives it, in
//! send order. Listeners come and go at any time, and the hub shuts down with
//! a blocking, idempotent [`close`](Hub::close).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  producer #1 │   │  producer #2 │   │  producer #3 │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ send()           ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Hub (cloneable handle)                                           │
//! │  - inbound queue   (capacity: HubConfig::inbound_capacity)        │
//! │  - Registry        (joined listeners, sealed on close)            │
//! │  - Bus             (broadcast lifecycle events)                   │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                  ┌────────────────────────────┐
//!                  │   dispatch loop (1 task)   │
//!                  │ fan-out per DeliveryPolicy │
//!                  └───┬────────────┬───────┬───┘
//!                      ▼            ▼       ▼
//!                  [queue 1]    [queue 2] [queue N]   (HubConfig::listener_capacity)
//!                      ▼            ▼       ▼
//!                  Listener     Listener  Listener ──► recv()
//!
//!  Bus ──► Hub::events() receivers
//!      └─► forwarder ──► ObserverSet ──► observer workers
//! ```
//!
//! ### Slow listeners
//! ```text
//! fan_out(sig) for each listener:
//!   ├─ queue has room          ──► delivered
//!   └─ queue full ─┬─ DeliveryPolicy::Block       ──► wait (until leave)
//!                  ├─ DeliveryPolicy::Timeout(d)  ──► wait up to d, then lagged
//!                  └─ DeliveryPolicy::DropIfFull  ──► lagged
//!   lagged ─┬─ LagPolicy::Disconnect ──► evict listener, ListenerEvicted
//!           └─ LagPolicy::Skip       ──► drop this signal, SignalDropped
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                       |
//! |-------------------|-------------------------------------------------------------|------------------------------------------|
//! | **Hub**           | Send, join, close; cheap to clone across tasks.             | [`Hub`], [`HubState`]                    |
//! | **Listeners**     | Receive with optional timeout/cancel; leave from anywhere.  | [`Listener`], [`LeaveHandle`]            |
//! | **Policies**      | Bound how long one listener may stall fan-out.              | [`DeliveryPolicy`], [`LagPolicy`]        |
//! | **Observer API**  | Hook into lifecycle events (logging, metrics).              | [`Observe`], [`HubEvent`], [`EventKind`] |
//! | **Errors**        | Typed errors for every fallible operation.                  | [`HubError`]                             |
//! | **Configuration** | Centralize capacities and policies.                         | [`HubConfig`], [`HubBuilder`]            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use sighub::{Hub, HubConfig, HubError, Signal};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), HubError> {
//!     // Build observers (optional)
//!     #[cfg(feature = "logging")]
//!     let observers: Vec<Arc<dyn sighub::Observe>> = vec![Arc::new(sighub::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let observers: Vec<Arc<dyn sighub::Observe>> = Vec::new();
//!
//!     let hub: Hub<u32> = Hub::builder(HubConfig::default())
//!         .with_observers(observers)
//!         .build();
//!
//!     let mut a = hub.join()?;
//!     let mut b = hub.join()?;
//!
//!     hub.send(Signal::new("temp", 21)).await?;
//!     assert_eq!(*a.recv().await?.payload(), 21);
//!     assert_eq!(*b.recv().await?.payload(), 21);
//!
//!     hub.close().await;
//!     assert_eq!(a.recv().await.unwrap_err(), HubError::ListenerClosed);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod observers;
mod policies;
mod signal;

// ---- Public re-exports ----

pub use crate::core::{Hub, HubBuilder, HubConfig, HubState, LeaveHandle, Listener, ListenerId};
pub use error::HubError;
pub use events::{EventKind, HubEvent};
pub use observers::Observe;
pub use policies::{DeliveryPolicy, LagPolicy};
pub use signal::Signal;

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
