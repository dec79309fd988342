//! # Example: slow_listener
//!
//! Shows how the delivery policy keeps one stalled consumer from holding up
//! everyone else.
//!
//! The hub uses one-slot listener queues and `DeliveryPolicy::Timeout(100ms)`
//! with `LagPolicy::Disconnect`. The "stuck" listener never reads, so the
//! second signal times out on it and it gets evicted; the "live" listener
//! keeps receiving.
//!
//! ## Run
//! ```bash
//! cargo run --example slow_listener
//! ```

use std::time::Duration;

use sighub::{DeliveryPolicy, EventKind, Hub, HubConfig, LagPolicy, Signal};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = HubConfig {
        listener_capacity: 1,
        delivery: DeliveryPolicy::Timeout(Duration::from_millis(100)),
        on_lag: LagPolicy::Disconnect,
        ..HubConfig::default()
    };
    let hub: Hub<u64> = Hub::with_config(cfg);
    let mut events = hub.events();

    let mut stuck = hub.join()?;
    let mut live = hub.join()?;

    let reader = tokio::spawn(async move {
        while let Ok(sig) = live.recv().await {
            println!("[live] {} = {}", sig.key(), sig.payload());
        }
        println!("[live] closed");
    });

    for n in 0..5 {
        hub.send(Signal::new("tick", n)).await?;
    }

    while let Ok(ev) = events.recv().await {
        if ev.kind == EventKind::ListenerEvicted {
            println!(
                "[hub] evicted {:?} reason={:?} wait_ms={:?}",
                ev.listener, ev.reason, ev.wait_ms
            );
            break;
        }
    }

    match stuck.recv().await {
        Ok(sig) => println!("[stuck] unexpected {}", sig.key()),
        Err(e) => println!("[stuck] {e}"),
    }

    hub.close().await;
    reader.await?;
    Ok(())
}
