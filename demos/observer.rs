//! # Example: observer
//!
//! Attaches the built-in [`LogWriter`] and a custom observer that counts
//! joins, then runs a short join/send/leave/close cycle.
//!
//! ## Flow
//! ```text
//! Hub::builder(cfg).with_observers([LogWriter, JoinCounter]).build()
//!     └─► Bus ──► forwarder ──► ObserverSet ──► worker per observer
//! ```
//!
//! ## Run
//! Requires the `logging` feature to export [`LogWriter`].
//! ```bash
//! cargo run --example observer --features logging
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use sighub::{EventKind, Hub, HubConfig, HubEvent, LogWriter, Observe, Signal};

/// Counts listener joins.
struct JoinCounter(AtomicUsize);

#[async_trait::async_trait]
impl Observe for JoinCounter {
    async fn on_event(&self, ev: &HubEvent) {
        if ev.kind == EventKind::ListenerJoined {
            let n = self.0.fetch_add(1, Ordering::Relaxed) + 1;
            println!("[join-counter] {n} joined so far");
        }
    }

    fn name(&self) -> &'static str {
        "join-counter"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let counter = Arc::new(JoinCounter(AtomicUsize::new(0)));
    let observers: Vec<Arc<dyn Observe>> = vec![Arc::new(LogWriter::new()), counter.clone()];

    let hub: Hub<&'static str> = Hub::builder(HubConfig::default())
        .with_observers(observers)
        .build();

    let mut a = hub.join()?;
    let b = hub.join()?;

    hub.send(Signal::new("greeting", "hi")).await?;
    println!("[a] got {}", a.recv().await?.payload());

    b.leave();
    hub.close().await;

    // observers run on their own workers; give them a moment to print
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("joins seen: {}", counter.0.load(Ordering::Relaxed));
    Ok(())
}
