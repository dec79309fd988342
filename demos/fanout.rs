//! # Example: fanout
//!
//! Ten listeners join concurrently, one signal reaches all of them, then the
//! hub closes and every listener sees `ListenerClosed`.
//!
//! ## Flow
//! ```text
//! 10 × spawn ──► hub.join() ──► barrier
//! main ──► barrier ──► hub.send(hello) ──► hub.close()
//! listener ──► recv() = hello ──► recv() = ListenerClosed
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example fanout
//! ```

use std::sync::Arc;

use sighub::{Hub, HubError, Signal};
use tokio::sync::Barrier;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let hub: Hub<String> = Hub::new();
    let ready = Arc::new(Barrier::new(11));

    let mut workers = Vec::new();
    for n in 0..10 {
        let hub = hub.clone();
        let ready = Arc::clone(&ready);
        workers.push(tokio::spawn(async move {
            let mut listener = hub.join()?;
            ready.wait().await;
            loop {
                match listener.recv().await {
                    Ok(sig) => println!("[worker {n}] {} => {}", sig.key(), sig.payload()),
                    Err(HubError::ListenerClosed) => {
                        println!("[worker {n}] closed");
                        return Ok::<_, HubError>(());
                    }
                    Err(e) => return Err(e),
                }
            }
        }));
    }

    ready.wait().await;
    hub.send(Signal::new("hello", "hello world".to_string()))
        .await?;
    hub.close().await;

    for w in workers {
        w.await??;
    }
    println!("hub state: {:?}", hub.state());
    Ok(())
}
