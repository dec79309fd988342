//! # Hub configuration.
//!
//! Provides [`HubConfig`] centralized settings for a [`Hub`](crate::Hub).
//!
//! ## Sentinel values
//! - capacities are clamped to a minimum of 1 (`0` never builds a channel)
//! - `DeliveryPolicy::Timeout(0s)` → no wait (same as `DropIfFull`)

use crate::policies::{DeliveryPolicy, LagPolicy};

/// Configuration for a hub.
///
/// Defines:
/// - **Producer side**: inbound queue depth
/// - **Listener side**: per-listener queue depth, delivery and lag policies
/// - **Event system**: bus capacity for lifecycle events
///
/// ## Field semantics
/// - `inbound_capacity`: signals accepted by `send` but not yet picked up by the loop (min 1)
/// - `listener_capacity`: signals buffered per listener (min 1)
/// - `delivery`: how long one delivery may wait for queue space
/// - `on_lag`: what happens to a listener when a bounded delivery fails
/// - `bus_capacity`: lifecycle event ring buffer size (min 1)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling clamping checks across the codebase.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Depth of the inbound channel between producers and the dispatch loop.
    ///
    /// With the default of `1`, `send` returns once the loop has room for at
    /// most one signal in flight, so producers are paced by dispatch.
    pub inbound_capacity: usize,

    /// Depth of each listener's delivery queue.
    pub listener_capacity: usize,

    /// How long the dispatch loop may wait on one full listener queue.
    pub delivery: DeliveryPolicy,

    /// Reaction to a failed bounded delivery.
    pub on_lag: LagPolicy,

    /// Capacity of the lifecycle event bus.
    ///
    /// Event receivers that lag behind more than `bus_capacity` events
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl HubConfig {
    /// Returns the inbound capacity clamped to a minimum of 1.
    #[inline]
    pub fn inbound_capacity_clamped(&self) -> usize {
        self.inbound_capacity.max(1)
    }

    /// Returns the per-listener capacity clamped to a minimum of 1.
    #[inline]
    pub fn listener_capacity_clamped(&self) -> usize {
        self.listener_capacity.max(1)
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for HubConfig {
    /// Default configuration:
    ///
    /// - `inbound_capacity = 1` (one signal in flight per send)
    /// - `listener_capacity = 64`
    /// - `delivery = DeliveryPolicy::Timeout(5s)`
    /// - `on_lag = LagPolicy::Disconnect`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            inbound_capacity: 1,
            listener_capacity: 64,
            delivery: DeliveryPolicy::default(),
            on_lag: LagPolicy::default(),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacities_are_clamped() {
        let cfg = HubConfig {
            inbound_capacity: 0,
            listener_capacity: 0,
            bus_capacity: 0,
            ..HubConfig::default()
        };
        assert_eq!(cfg.inbound_capacity_clamped(), 1);
        assert_eq!(cfg.listener_capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn test_defaults() {
        let cfg = HubConfig::default();
        assert_eq!(cfg.inbound_capacity, 1);
        assert_eq!(cfg.listener_capacity, 64);
        assert_eq!(cfg.on_lag, LagPolicy::Disconnect);
        assert_eq!(cfg.bus_capacity, 1024);
    }
}
