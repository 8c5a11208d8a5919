use super::*;
use mg_core::ModelId;

fn preload_event() -> Event {
    Event::ModelPreloaded { model_id: ModelId::new("m"), ok: true }
}

#[tokio::test]
async fn subscriber_receives_emitted_event() {
    let bus = EventBus::new();
    let mut sub = bus.subscribe(CancellationToken::new());
    bus.emit(preload_event());
    let evt = sub.recv().await.unwrap();
    assert_eq!(evt.kind(), "model_preloaded");
}

#[tokio::test]
async fn multiple_subscribers_each_receive() {
    let bus = EventBus::new();
    let mut a = bus.subscribe(CancellationToken::new());
    let mut b = bus.subscribe(CancellationToken::new());
    bus.emit(preload_event());
    assert!(a.recv().await.is_some());
    assert!(b.recv().await.is_some());
}

#[tokio::test]
async fn cancelled_context_stops_delivery() {
    let bus = EventBus::new();
    let ctx = CancellationToken::new();
    let mut sub = bus.subscribe(ctx.clone());
    ctx.cancel();
    assert!(sub.recv().await.is_none());
}

#[tokio::test]
async fn full_queue_drops_without_blocking() {
    let bus = EventBus::new();
    let sub = bus.subscribe_with_capacity(CancellationToken::new(), 2);
    for _ in 0..5 {
        bus.emit(preload_event());
    }
    assert!(sub.dropped_count() > 0);
}

#[tokio::test]
async fn prune_closed_removes_dropped_subscriptions() {
    let bus = EventBus::new();
    {
        let _sub = bus.subscribe(CancellationToken::new());
        assert_eq!(bus.subscriber_count(), 1);
    }
    bus.prune_closed();
    assert_eq!(bus.subscriber_count(), 0);
}
