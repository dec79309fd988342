//! Delivery and lag policies.
//!
//! This module groups the knobs that resolve head-of-line blocking: **how
//! long** the dispatch loop may wait on one listener, and **what happens** to
//! a listener that cannot keep up.
//!
//! ## Contents
//! - [`DeliveryPolicy`] how long one delivery may wait (block / timeout / no wait)
//! - [`LagPolicy`] reaction to a failed delivery (skip / disconnect)
//!
//! ## Quick wiring
//! ```text
//! HubConfig { delivery: DeliveryPolicy, on_lag: LagPolicy, listener_capacity }
//!      └─► core::delivery::deliver uses:
//!           - delivery to bound the wait on each listener queue
//!           - on_lag to decide skip vs evict when the wait fails
//! ```
//!
//! ## Defaults
//! - `DeliveryPolicy::Timeout(5s)`.
//! - `LagPolicy::Disconnect`.

mod delivery;
mod lag;

pub use delivery::DeliveryPolicy;
pub use lag::LagPolicy;
