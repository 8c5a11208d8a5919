use super::*;
use mg_core::{GroupId, ModelConfig};
use std::time::Duration;

fn test_process(cmd: &str, check_endpoint: &str) -> Arc<Process<mg_core::FakeClock>> {
    let config = ModelConfig::builder()
        .cmd(cmd)
        .check_endpoint(check_endpoint)
        .concurrency_limit(1u32)
        .build();
    Arc::new(Process::new(
        GroupId::new("g1"),
        config,
        mg_core::FakeClock::new(),
        Arc::new(PortAllocator::new(20000)),
        Arc::new(crate::event_bus::EventBus::new()),
    ))
}

#[test]
fn new_process_starts_stopped() {
    let process = test_process("sleep 5", "none");
    assert_eq!(process.state(), ProcessState::Stopped);
    assert_eq!(process.inflight(), 0);
}

#[tokio::test]
async fn start_fails_for_nonexistent_binary() {
    let process = test_process("this-binary-does-not-exist-xyz --port ${PORT}", "none");
    let result = process.start(Duration::from_secs(1)).await;
    assert!(result.is_err());
    assert_eq!(process.state(), ProcessState::Failed);
    assert!(process.last_error().is_some());
}

#[tokio::test]
async fn start_times_out_when_nothing_listens() {
    let process = test_process("sleep 5", "none");
    let result = process.start(Duration::from_millis(300)).await;
    assert!(matches!(result, Err(ProcessError::ReadinessTimeout)));
    assert_eq!(process.state(), ProcessState::Failed);
}

#[tokio::test]
async fn stop_on_already_stopped_process_is_a_no_op() {
    let process = test_process("sleep 5", "none");
    process.stop(StopStrategy::Immediately).await;
    assert_eq!(process.state(), ProcessState::Stopped);
}

#[tokio::test]
async fn acquire_permit_blocks_at_concurrency_limit() {
    let process = test_process("sleep 5", "none");
    let first = process.acquire_permit().await.unwrap();
    assert_eq!(process.inflight(), 1);

    let second = tokio::time::timeout(Duration::from_millis(50), process.acquire_permit()).await;
    assert!(second.is_err(), "second permit should block while the first is held");

    drop(first);
    let second = process.acquire_permit().await.unwrap();
    assert_eq!(process.inflight(), 1);
    drop(second);
    assert_eq!(process.inflight(), 0);
}
