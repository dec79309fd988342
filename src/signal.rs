//! # Signal: the immutable message envelope.
//!
//! A [`Signal`] pairs a string key with an arbitrary payload. Once built it
//! cannot be changed: the hub wraps it in an `Arc` and hands the same
//! allocation to every listener, so fan-out never clones the payload.
//!
//! ## Example
//! ```rust
//! use sighub::Signal;
//!
//! let sig = Signal::new("hello", "hello world");
//! assert_eq!(sig.key(), "hello");
//! assert_eq!(*sig.payload(), "hello world");
//! ```

use std::sync::Arc;

/// Key/payload message broadcast by a [`Hub`](crate::Hub).
///
/// Equality is structural: two signals are equal when both key and payload are.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signal<P> {
    key: Arc<str>,
    payload: P,
}

impl<P> Signal<P> {
    /// Creates a new signal.
    pub fn new(key: impl Into<Arc<str>>, payload: P) -> Self {
        Self {
            key: key.into(),
            payload,
        }
    }

    /// Returns the routing key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns a shared handle to the key (cheap clone).
    #[inline]
    pub fn key_arc(&self) -> Arc<str> {
        Arc::clone(&self.key)
    }

    /// Returns the payload.
    #[inline]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Consumes the signal, returning key and payload.
    pub fn into_parts(self) -> (Arc<str>, P) {
        (self.key, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Signal::new("k", 1u32);
        let b = Signal::new(String::from("k"), 1u32);
        assert_eq!(a, b);
        assert_ne!(a, Signal::new("k", 2u32));
        assert_ne!(a, Signal::new("other", 1u32));
    }

    #[test]
    fn test_into_parts() {
        let (key, payload) = Signal::new("orders", vec![1, 2, 3]).into_parts();
        assert_eq!(&*key, "orders");
        assert_eq!(payload, vec![1, 2, 3]);
    }
}
