//! # Hub event observer trait.
//!
//! Provides [`Observe`] an extension point for plugging custom event handlers into a hub.
//!
//! Each observer gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-observer bounded queue** (capacity via [`Observe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `EventKind::ObserverPanicked`)
//!
//! ## Architecture
//! ```text
//! ObserverSet ──► [bounded queue] ──► worker task ──► observer.on_event()
//!                                  └─► panic caught → EventKind::ObserverPanicked
//! ```
//!
//! ## Rules
//! - A slow observer only affects its own queue, never signal delivery.
//! - Queue overflow drops the event **for this observer only** and publishes
//!   `EventKind::ObserverOverflow`.
//! - Events are processed sequentially (FIFO) per observer.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use sighub::{Observe, HubEvent, EventKind};
//!
//! struct Evictions;
//!
//! #[async_trait]
//! impl Observe for Evictions {
//!     async fn on_event(&self, ev: &HubEvent) {
//!         if matches!(ev.kind, EventKind::ListenerEvicted) {
//!             // page someone, bump a counter, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "evictions" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::HubEvent;

/// Hub lifecycle observer.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    async fn on_event(&self, event: &HubEvent);

    /// Returns the observer name used in overflow/panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this observer.
    ///
    /// The runtime clamps capacity to a minimum of 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
