//! # Hub event observers.
//!
//! Observers consume [`HubEvent`](crate::HubEvent)s off the hub's event bus
//! without ever slowing signal delivery.
//!
//! - [`Observe`] the trait user code implements.
//! - [`ObserverSet`] fan-out with one bounded queue and worker per observer.
//! - [`LogWriter`] stdout printer (feature `logging`).

mod observe;
mod set;

#[cfg(feature = "logging")]
mod log;

pub use observe::Observe;
pub(crate) use set::ObserverSet;

#[cfg(feature = "logging")]
pub use log::LogWriter;
