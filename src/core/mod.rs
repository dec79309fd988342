//! Runtime core: hub, listeners, and the dispatch loop.
//!
//! Internal modules:
//! - [`hub`]: the cloneable front door (`send`, `join`, `close`);
//! - [`listener`]: per-subscriber receive side and leave handles;
//! - [`dispatch`]: the single fan-out task and close teardown;
//! - [`delivery`]: one bounded hand-off under a [`DeliveryPolicy`](crate::DeliveryPolicy);
//! - [`registry`]: joined listeners, sealed on close;
//! - [`builder`]: wires the bus, observers, and dispatch loop together.

mod builder;
mod config;
mod delivery;
mod dispatch;
mod hub;
mod listener;
mod registry;

pub use builder::HubBuilder;
pub use config::HubConfig;
pub use hub::{Hub, HubState};
pub use listener::{LeaveHandle, Listener};
pub use registry::ListenerId;
