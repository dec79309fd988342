//! # LogWriter: simple event printer
//!
//! A minimal observer that prints incoming [`HubEvent`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [joined] listener=listener-1
//! [evicted] listener=listener-3 key="temp" reason="timeout" wait_ms=50
//! [dropped] listener=listener-2 key="temp" reason="full"
//! [left] listener=listener-1 reason="leave"
//! [close-requested]
//! [closed]
//! ```

use async_trait::async_trait;

use crate::events::{EventKind, HubEvent};
use crate::observers::Observe;

/// Event writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &HubEvent) {
        println!("{}", render(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

fn render(e: &HubEvent) -> String {
    let label = e.kind.as_label();
    let listener = e
        .listener
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match e.kind {
        EventKind::CloseRequested | EventKind::HubClosed => format!("[{label}]"),
        EventKind::ListenerJoined => format!("[{label}] listener={listener}"),
        EventKind::ListenerLeft => format!("[{label}] listener={listener} reason={:?}", e.reason),
        EventKind::ListenerEvicted | EventKind::SignalDropped => match e.wait_ms {
            Some(ms) => format!(
                "[{label}] listener={listener} key={:?} reason={:?} wait_ms={ms}",
                e.key, e.reason
            ),
            None => format!(
                "[{label}] listener={listener} key={:?} reason={:?}",
                e.key, e.reason
            ),
        },
        EventKind::ObserverOverflow | EventKind::ObserverPanicked => format!(
            "[{label}] {}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ListenerId;
    use std::time::Duration;

    #[test]
    fn test_render_close_events_are_bare() {
        assert_eq!(render(&HubEvent::new(EventKind::HubClosed)), "[closed]");
        assert_eq!(
            render(&HubEvent::new(EventKind::CloseRequested)),
            "[close-requested]"
        );
    }

    #[test]
    fn test_render_eviction_carries_wait() {
        let id = ListenerId::next();
        let ev = HubEvent::new(EventKind::ListenerEvicted)
            .with_listener(id)
            .with_key("temp")
            .with_reason("timeout")
            .with_wait(Duration::from_millis(50));

        let line = render(&ev);
        assert!(line.starts_with("[evicted] listener=listener-"));
        assert!(line.ends_with("wait_ms=50"));
    }

    #[test]
    fn test_render_overflow_uses_reason() {
        let ev = HubEvent::observer_overflow("metrics", "full");
        assert_eq!(render(&ev), "[observer-overflow] observer=metrics reason=full");
    }
}
