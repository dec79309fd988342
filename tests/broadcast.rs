use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sighub::{
    DeliveryPolicy, EventKind, Hub, HubConfig, HubError, HubEvent, HubState, LagPolicy, ListenerId,
    Observe, Signal,
};
use tokio::sync::{Barrier, Notify, broadcast};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn small_queues(delivery: DeliveryPolicy, on_lag: LagPolicy) -> HubConfig {
    HubConfig {
        listener_capacity: 1,
        delivery,
        on_lag,
        ..HubConfig::default()
    }
}

async fn next_event(
    events: &mut broadcast::Receiver<HubEvent>,
    kind: EventKind,
    listener: ListenerId,
) -> HubEvent {
    timeout(WAIT, async {
        loop {
            let ev = events.recv().await.expect("event bus open");
            if ev.kind == kind && ev.listener == Some(listener) {
                return ev;
            }
        }
    })
    .await
    .expect("event in time")
}

#[tokio::test]
async fn ten_listeners_join_concurrently_and_all_see_hello() {
    let hub: Hub<&'static str> = Hub::new();
    let ready = Arc::new(Barrier::new(11));

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let hub = hub.clone();
        let ready = Arc::clone(&ready);
        tasks.push(tokio::spawn(async move {
            let mut listener = hub.join().expect("join");
            ready.wait().await;
            let first = listener.recv().await;
            let second = listener.recv().await;
            (first, second)
        }));
    }

    ready.wait().await;
    assert_eq!(hub.listener_count(), 10);
    hub.send(Signal::new("hello", "hello world"))
        .await
        .expect("send");
    timeout(WAIT, hub.close()).await.expect("close in time");

    for task in tasks {
        let (first, second) = timeout(WAIT, task).await.expect("listener done").expect("join");
        let sig = first.expect("hello delivered");
        assert_eq!(sig.key(), "hello");
        assert_eq!(*sig.payload(), "hello world");
        assert_eq!(second.unwrap_err(), HubError::ListenerClosed);
    }
    assert_eq!(hub.listener_count(), 0);
    assert_eq!(hub.state(), HubState::Closed);
}

#[tokio::test]
async fn every_listener_gets_exactly_one_copy() {
    let hub: Hub<u32> = Hub::new();
    let mut listeners: Vec<_> = (0..4).map(|_| hub.join().expect("join")).collect();

    hub.send(Signal::new("once", 1)).await.expect("send");
    timeout(WAIT, hub.close()).await.expect("close");

    for l in &mut listeners {
        assert_eq!(*l.recv().await.expect("copy").payload(), 1);
        assert_eq!(l.recv().await.unwrap_err(), HubError::ListenerClosed);
    }
}

#[tokio::test]
async fn signals_arrive_in_send_order() {
    let hub: Hub<u32> = Hub::new();
    let mut a = hub.join().expect("join");
    let mut b = hub.join().expect("join");

    for n in 0..50 {
        hub.send(Signal::new("seq", n)).await.expect("send");
    }
    for l in [&mut a, &mut b] {
        for n in 0..50 {
            let sig = timeout(WAIT, l.recv()).await.expect("in time").expect("recv");
            assert_eq!(*sig.payload(), n);
        }
    }
    hub.close().await;
}

#[tokio::test]
async fn close_without_listeners_completes() {
    let hub: Hub<()> = Hub::new();
    hub.send(Signal::new("void", ())).await.expect("send");
    timeout(WAIT, hub.close()).await.expect("close");
    assert!(hub.is_closed());
}

#[tokio::test]
async fn leave_unblocks_pending_receive() {
    let hub: Hub<u32> = Hub::new();
    let mut listener = hub.join().expect("join");
    let handle = listener.leave_handle();

    let task = tokio::spawn(async move {
        let first = listener.recv().await;
        let second = listener.recv().await;
        (first, second)
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.leave();

    let (first, second) = timeout(WAIT, task).await.expect("unblocked").expect("join");
    assert_eq!(first.unwrap_err(), HubError::ListenerClosed);
    assert_eq!(second.unwrap_err(), HubError::ListenerClosed);
    assert!(!hub.is_joined(handle.id()));
    hub.close().await;
}

#[tokio::test]
async fn close_drains_queued_signals_then_closes_every_listener() {
    let hub: Hub<u32> = Hub::new();
    let mut listeners: Vec<_> = (0..5).map(|_| hub.join().expect("join")).collect();

    for n in 0..3 {
        hub.send(Signal::new("drain", n)).await.expect("send");
    }
    timeout(WAIT, hub.close()).await.expect("close");
    assert_eq!(hub.listener_count(), 0);

    for l in &mut listeners {
        for n in 0..3 {
            assert_eq!(*l.recv().await.expect("queued").payload(), n);
        }
        assert_eq!(l.recv().await.unwrap_err(), HubError::ListenerClosed);
        assert!(l.is_closed());
    }
}

#[tokio::test]
async fn concurrent_leave_and_close_are_harmless() {
    let hub: Hub<u32> = Hub::new();
    let listener = hub.join().expect("join");
    let mut events = hub.events();

    let leavers: Vec<_> = (0..8)
        .map(|_| {
            let handle = listener.leave_handle();
            tokio::spawn(async move { handle.leave() })
        })
        .collect();
    for l in leavers {
        l.await.expect("leave task");
    }
    listener.leave();

    let left = next_event(&mut events, EventKind::ListenerLeft, listener.id()).await;
    assert_eq!(left.reason.as_deref(), Some("leave"));

    let closers: Vec<_> = (0..8)
        .map(|_| {
            let hub = hub.clone();
            tokio::spawn(async move { hub.close().await })
        })
        .collect();
    for c in closers {
        timeout(WAIT, c).await.expect("close in time").expect("close task");
    }
    hub.close().await;

    let mut left_again = 0;
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::ListenerLeft {
            left_again += 1;
        }
    }
    assert_eq!(left_again, 0);
}

#[tokio::test]
async fn stalled_listener_is_evicted_without_stalling_others() {
    let cfg = small_queues(
        DeliveryPolicy::Timeout(Duration::from_millis(50)),
        LagPolicy::Disconnect,
    );
    let hub: Hub<u32> = Hub::with_config(cfg);
    let mut events = hub.events();
    let mut slow = hub.join().expect("join");
    let mut fast = hub.join().expect("join");

    hub.send(Signal::new("tick", 1)).await.expect("send");
    hub.send(Signal::new("tick", 2)).await.expect("send");

    for n in 1..=2 {
        let sig = timeout(WAIT, fast.recv()).await.expect("not stalled").expect("recv");
        assert_eq!(*sig.payload(), n);
    }

    let ev = next_event(&mut events, EventKind::ListenerEvicted, slow.id()).await;
    assert_eq!(ev.reason.as_deref(), Some("timeout"));
    assert_eq!(ev.key.as_deref(), Some("tick"));
    assert_eq!(ev.wait_ms, Some(50));

    assert!(!hub.is_joined(slow.id()));
    assert_eq!(slow.recv().await.unwrap_err(), HubError::ListenerClosed);
    hub.close().await;
}

#[tokio::test]
async fn skipped_listener_stays_joined_and_misses_one_signal() {
    let cfg = small_queues(DeliveryPolicy::DropIfFull, LagPolicy::Skip);
    let hub: Hub<u32> = Hub::with_config(cfg);
    let mut events = hub.events();
    let mut slow = hub.join().expect("join");
    let mut fast = hub.join().expect("join");

    hub.send(Signal::new("tick", 1)).await.expect("send");
    assert_eq!(*fast.recv().await.expect("recv").payload(), 1);
    hub.send(Signal::new("tick", 2)).await.expect("send");
    assert_eq!(*fast.recv().await.expect("recv").payload(), 2);

    let ev = next_event(&mut events, EventKind::SignalDropped, slow.id()).await;
    assert_eq!(ev.reason.as_deref(), Some("full"));
    assert!(hub.is_joined(slow.id()));

    assert_eq!(*slow.recv().await.expect("recv").payload(), 1);
    assert_eq!(slow.try_recv().expect("open"), None);

    hub.send(Signal::new("tick", 3)).await.expect("send");
    assert_eq!(*slow.recv().await.expect("recv").payload(), 3);
    assert_eq!(*fast.recv().await.expect("recv").payload(), 3);
    hub.close().await;
}

async fn close_with_stalled_listener(delivery: DeliveryPolicy, on_lag: LagPolicy) {
    let hub: Hub<u32> = Hub::with_config(small_queues(delivery, on_lag));
    let mut events = hub.events();
    let mut stalled = hub.join().expect("join");

    hub.send(Signal::new("tick", 1)).await.expect("send");
    hub.send(Signal::new("tick", 2)).await.expect("send");

    timeout(Duration::from_secs(2), hub.close())
        .await
        .expect("close does not wait on a stalled listener");
    assert_eq!(hub.listener_count(), 0);

    let dropped = next_event(&mut events, EventKind::SignalDropped, stalled.id()).await;
    assert_eq!(dropped.key.as_deref(), Some("tick"));

    assert_eq!(*stalled.recv().await.expect("queued").payload(), 1);
    assert_eq!(stalled.recv().await.unwrap_err(), HubError::ListenerClosed);
}

#[tokio::test]
async fn close_does_not_wait_on_stalled_listener_under_block() {
    close_with_stalled_listener(DeliveryPolicy::Block, LagPolicy::Disconnect).await;
}

#[tokio::test]
async fn close_does_not_wait_on_stalled_listener_under_long_timeout() {
    close_with_stalled_listener(
        DeliveryPolicy::Timeout(Duration::from_secs(60)),
        LagPolicy::Disconnect,
    )
    .await;
}

#[tokio::test]
async fn close_does_not_wait_on_stalled_listener_under_drop_if_full() {
    close_with_stalled_listener(DeliveryPolicy::DropIfFull, LagPolicy::Skip).await;
}

#[tokio::test]
async fn listener_owner_can_close_while_stalled() {
    let cfg = small_queues(DeliveryPolicy::Block, LagPolicy::Disconnect);
    let hub: Hub<u32> = Hub::with_config(cfg);
    let owner = tokio::spawn({
        let hub = hub.clone();
        async move {
            let mut mine = hub.join().expect("join");
            for n in 0..3 {
                hub.send(Signal::new("tick", n)).await.expect("send");
            }
            hub.close().await;
            let mut got = Vec::new();
            while let Ok(sig) = mine.recv().await {
                got.push(*sig.payload());
            }
            got
        }
    });

    let got = timeout(WAIT, owner).await.expect("no self-deadlock").expect("join");
    assert_eq!(got, vec![0]);
    assert!(hub.is_closed());
}

#[tokio::test]
async fn join_and_send_fail_after_close() {
    let hub: Hub<u32> = Hub::new();
    hub.close().await;

    assert_eq!(hub.join().err(), Some(HubError::HubClosed));
    assert_eq!(
        hub.send(Signal::new("late", 0)).await,
        Err(HubError::HubClosed)
    );
}

#[tokio::test]
async fn receive_variants_leave_listener_usable() {
    let hub: Hub<u32> = Hub::new();
    let mut listener = hub.join().expect("join");

    assert_eq!(
        listener.recv_timeout(Duration::from_millis(10)).await,
        Err(HubError::Timeout {
            timeout: Duration::from_millis(10)
        })
    );

    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();
    assert_eq!(
        listener.recv_with_cancel(&cancel).await,
        Err(HubError::Canceled)
    );

    hub.send(Signal::new("after", 7)).await.expect("send");
    let sig = listener.recv_timeout(WAIT).await.expect("still usable");
    assert_eq!(*sig.payload(), 7);
    hub.close().await;
}

struct Recorder {
    kinds: Mutex<Vec<EventKind>>,
    closed: Notify,
}

#[async_trait]
impl Observe for Recorder {
    async fn on_event(&self, ev: &HubEvent) {
        self.kinds
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ev.kind);
        if ev.kind == EventKind::HubClosed {
            self.closed.notify_one();
        }
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test]
async fn observers_see_the_lifecycle() {
    let recorder = Arc::new(Recorder {
        kinds: Mutex::new(Vec::new()),
        closed: Notify::new(),
    });
    let hub: Hub<u32> = Hub::builder(HubConfig::default())
        .with_observers(vec![recorder.clone() as Arc<dyn Observe>])
        .build();

    let listener = hub.join().expect("join");
    listener.leave();
    hub.close().await;
    timeout(WAIT, recorder.closed.notified())
        .await
        .expect("observer saw close");

    let kinds = recorder.kinds.lock().expect("lock").clone();
    assert_eq!(
        kinds,
        vec![
            EventKind::ListenerJoined,
            EventKind::ListenerLeft,
            EventKind::CloseRequested,
            EventKind::HubClosed,
        ]
    );
}
