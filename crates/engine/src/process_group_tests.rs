use super::*;
use mg_core::{FakeClock, GroupConfig, ModelConfig};
use std::net::TcpListener;

/// Binds a loopback listener on an OS-chosen port; returns it (kept
/// alive so the port stays bound) and its port number. A `Process`
/// configured with `checkEndpoint: "none"` declares readiness the
/// moment it can open a TCP connection here, regardless of whether its
/// own child process is the one actually listening.
fn bind_loopback() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn model(id: &str) -> ModelConfig {
    ModelConfig::builder()
        .id(id)
        .cmd("sleep 30")
        .proxy_url("http://127.0.0.1:${PORT}")
        .check_endpoint("none")
        .build()
}

fn model_map(ids: &[&str]) -> IndexMap<ModelId, ModelConfig> {
    ids.iter().map(|&id| (ModelId::new(id), model(id))).collect()
}

#[tokio::test]
async fn swap_group_stops_previous_member_on_switch() {
    let (_listener, port) = bind_loopback();
    let configs = model_map(&["a", "b"]);
    let group_config = GroupConfig::builder().members(["a", "b"].map(ModelId::new).into_iter().collect()).swap(true).build();

    let group = ProcessGroup::new_with_noop_notifier(
        group_config,
        &configs,
        FakeClock::new(),
        Arc::new(PortAllocator::new(port)),
        Arc::new(EventBus::new()),
        Duration::from_secs(2),
    );

    let a = group.ensure_ready(&ModelId::new("a")).await.unwrap();
    assert_eq!(a.state(), ProcessState::Ready);

    let b = group.ensure_ready(&ModelId::new("b")).await.unwrap();
    assert_eq!(b.state(), ProcessState::Ready);
    assert_eq!(a.state(), ProcessState::Stopped, "swap must stop the previously active member");
}

#[tokio::test]
async fn ensure_ready_rejects_unknown_member() {
    let configs = model_map(&["a"]);
    let group_config = GroupConfig::builder().members(["a"].map(ModelId::new).into_iter().collect()).build();
    let group = ProcessGroup::new_with_noop_notifier(
        group_config,
        &configs,
        FakeClock::new(),
        Arc::new(PortAllocator::new(30000)),
        Arc::new(EventBus::new()),
        Duration::from_secs(2),
    );

    let err = group.ensure_ready(&ModelId::new("ghost")).await.unwrap_err();
    assert!(matches!(err, GroupError::UnknownMember(_)));
}

#[tokio::test]
async fn gateway_macros_expand_into_spawned_command() {
    let (_listener, port) = bind_loopback();
    let config = ModelConfig::builder()
        .id("a")
        .cmd("${shell} -c 'sleep 30'")
        .proxy_url("http://127.0.0.1:${PORT}")
        .check_endpoint("none")
        .build();
    let configs: IndexMap<ModelId, ModelConfig> = [(ModelId::new("a"), config)].into_iter().collect();
    let macros: IndexMap<String, String> = [("shell".to_string(), "/bin/sh".to_string())].into_iter().collect();
    let group_config = GroupConfig::builder().members(["a"].map(ModelId::new).into_iter().collect()).build();

    let group = ProcessGroup::new(
        group_config,
        &configs,
        &macros,
        FakeClock::new(),
        Arc::new(PortAllocator::new(port)),
        Arc::new(EventBus::new()),
        Duration::from_secs(2),
        Arc::new(NoopExclusivityNotifier),
    );

    let process = group.ensure_ready(&ModelId::new("a")).await.unwrap();
    assert_eq!(process.state(), ProcessState::Ready);
}

#[tokio::test]
async fn idle_timer_stops_a_ready_process_with_no_inflight_requests() {
    let (_listener, port) = bind_loopback();
    let config = ModelConfig::builder()
        .id("a")
        .cmd("sleep 30")
        .proxy_url("http://127.0.0.1:${PORT}")
        .check_endpoint("none")
        .ttl(Some(Duration::from_millis(50)))
        .build();
    let configs: IndexMap<ModelId, ModelConfig> = [(ModelId::new("a"), config)].into_iter().collect();
    let group_config = GroupConfig::builder().members(["a"].map(ModelId::new).into_iter().collect()).build();
    let clock = FakeClock::new();

    let group = ProcessGroup::new_with_noop_notifier(
        group_config,
        &configs,
        clock.clone(),
        Arc::new(PortAllocator::new(port)),
        Arc::new(EventBus::new()),
        Duration::from_secs(2),
    );

    let process = group.ensure_ready(&ModelId::new("a")).await.unwrap();
    assert_eq!(process.state(), ProcessState::Ready);

    // The idle timer measures elapsed time off the injected clock, not
    // wall time, so it never fires until the clock is advanced past ttl.
    clock.advance(Duration::from_millis(100));

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while process.state() != ProcessState::Stopped && std::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(process.state(), ProcessState::Stopped, "idle timer must stop an unused Ready process after ttl elapses");
}

#[tokio::test]
async fn has_reflects_configured_membership() {
    let configs = model_map(&["a"]);
    let group_config = GroupConfig::builder().members(["a"].map(ModelId::new).into_iter().collect()).build();
    let group = ProcessGroup::new_with_noop_notifier(
        group_config,
        &configs,
        FakeClock::new(),
        Arc::new(PortAllocator::new(30010)),
        Arc::new(EventBus::new()),
        Duration::from_secs(2),
    );

    assert!(group.has(&ModelId::new("a")));
    assert!(!group.has(&ModelId::new("b")));
}
