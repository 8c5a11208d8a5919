// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single supervised model server: spawn, readiness probing, the
//! concurrency guard, and the stop strategies.

use crate::error::ProcessError;
use crate::group_view::{GroupView, NoopGroupView};
use crate::log_monitor::LogMonitor;
use crate::port_allocator::PortAllocator;
use mg_core::{Clock, Event, GroupId, ModelConfig, ModelId, ProcessState, StopStrategy, SystemClock};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

const PROBE_INTERVAL: Duration = Duration::from_millis(250);
const PROBE_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);
const STOP_GRACE: Duration = Duration::from_secs(5);
const DEFAULT_DRAIN_DEADLINE: Duration = Duration::from_secs(60);

/// Supervises one `ModelConfig`'s child process through its full
/// lifecycle. Cheap to hold behind an `Arc`; all interior state is
/// lock-guarded so callers share one instance per model id.
pub struct Process<C: Clock = SystemClock> {
    pub id: ModelId,
    pub group_id: GroupId,
    config: ModelConfig,
    macros: indexmap::IndexMap<String, String>,
    clock: C,
    port_allocator: Arc<PortAllocator>,
    events: Arc<crate::event_bus::EventBus>,
    log_monitor: Arc<LogMonitor>,
    http: reqwest::Client,
    group_view: Arc<dyn GroupView>,

    state: Mutex<ProcessState>,
    child: Mutex<Option<Child>>,
    port: Mutex<Option<u16>>,
    last_error: Mutex<Option<String>>,
    last_used_epoch_ms: AtomicU64,
    semaphore: Arc<Semaphore>,
    state_changed: Notify,
}

impl<C: Clock> Process<C> {
    pub fn new(
        group_id: GroupId,
        config: ModelConfig,
        clock: C,
        port_allocator: Arc<PortAllocator>,
        events: Arc<crate::event_bus::EventBus>,
    ) -> Self {
        Self::with_group_view(group_id, config, indexmap::IndexMap::new(), clock, port_allocator, events, Arc::new(NoopGroupView))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_group_view(
        group_id: GroupId,
        config: ModelConfig,
        macros: indexmap::IndexMap<String, String>,
        clock: C,
        port_allocator: Arc<PortAllocator>,
        events: Arc<crate::event_bus::EventBus>,
        group_view: Arc<dyn GroupView>,
    ) -> Self {
        let concurrency_limit = config.concurrency_limit.max(1) as usize;
        Self {
            id: config.id.clone(),
            group_id,
            config,
            macros,
            last_used_epoch_ms: AtomicU64::new(clock.epoch_ms()),
            clock,
            port_allocator,
            events,
            log_monitor: Arc::new(LogMonitor::new()),
            http: reqwest::Client::new(),
            group_view,
            state: Mutex::new(ProcessState::Stopped),
            child: Mutex::new(None),
            port: Mutex::new(None),
            last_error: Mutex::new(None),
            semaphore: Arc::new(Semaphore::new(concurrency_limit)),
            state_changed: Notify::new(),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The model's `proxyUrl` template with `${PORT}` substituted for
    /// the port currently allocated to it. `None` while stopped.
    pub fn resolved_proxy_url(&self) -> Option<String> {
        self.port().map(|port| self.config.proxy_url.replace("${PORT}", &port.to_string()))
    }

    /// Issues a single throwaway `GET /` against the resolved proxy
    /// URL. Best-effort: a failed or non-2xx response is not an error,
    /// since readiness is already established by `ensure_ready` before
    /// anyone calls this.
    pub async fn warm_up(&self) {
        let Some(base) = self.resolved_proxy_url() else { return };
        let _ = self.http.get(base).send().await;
    }

    pub fn state(&self) -> ProcessState {
        *self.state.lock()
    }

    pub fn inflight(&self) -> usize {
        let limit = self.config.concurrency_limit.max(1) as usize;
        limit.saturating_sub(self.semaphore.available_permits())
    }

    pub fn port(&self) -> Option<u16> {
        *self.port.lock()
    }

    pub fn log_monitor(&self) -> &Arc<LogMonitor> {
        &self.log_monitor
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn last_used_epoch_ms(&self) -> u64 {
        self.last_used_epoch_ms.load(Ordering::Relaxed)
    }

    fn set_state(&self, to: ProcessState) {
        let from = {
            let mut state = self.state.lock();
            let from = *state;
            *state = to;
            from
        };
        if from != to {
            self.events.emit(Event::ProcessStateChanged {
                model_id: self.id.clone(),
                group_id: self.group_id.clone(),
                from,
                to,
            });
            self.state_changed.notify_waiters();
        }
    }

    /// Starts the process if idle, or waits for an already in-flight
    /// `start()` (from another caller racing for the same target) to
    /// resolve. Used by swap coordination so concurrent swaps onto the
    /// same member coalesce instead of double-spawning.
    pub async fn start_or_join(self: &Arc<Self>, health_check_timeout: Duration) -> Result<(), ProcessError>
    where
        C: 'static,
    {
        loop {
            let notified = self.state_changed.notified();
            match self.state() {
                ProcessState::Ready => return Ok(()),
                ProcessState::Failed => return Err(ProcessError::ReadinessTimeout),
                ProcessState::Starting => notified.await,
                ProcessState::Stopped => return self.start(health_check_timeout).await,
                ProcessState::Stopping | ProcessState::Shutdown => return Err(ProcessError::AlreadyShutdown),
            }
        }
    }

    /// Spawns the child process and blocks until it is `Ready` or the
    /// health check timeout elapses. Arms the idle timer on success if
    /// `ttl > 0`.
    pub async fn start(self: &Arc<Self>, health_check_timeout: Duration) -> Result<(), ProcessError>
    where
        C: 'static,
    {
        {
            let state = self.state.lock();
            if *state == ProcessState::Shutdown {
                return Err(ProcessError::AlreadyShutdown);
            }
            if *state == ProcessState::Ready || *state == ProcessState::Starting {
                return Ok(());
            }
        }

        let port = self.port_allocator.allocate();
        *self.port.lock() = Some(port);
        self.last_error.lock().take();
        self.set_state(ProcessState::Starting);

        let proxy_url = self.config.proxy_url.replace("${PORT}", &port.to_string());
        let argv = match mg_cmdline::build_argv(&self.config.cmd, &self.macros, port) {
            Ok(argv) => argv,
            Err(e) => {
                self.port_allocator.release(port);
                *self.port.lock() = None;
                self.fail(format!("bad command template: {e}"));
                return Err(ProcessError::BadCommand(e));
            }
        };
        let Some((program, args)) = argv.split_first() else {
            self.port_allocator.release(port);
            *self.port.lock() = None;
            self.fail("empty command template".to_string());
            return Err(ProcessError::SpawnFailed(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty argv",
            )));
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());
        for pair in &self.config.env {
            if let Some((key, value)) = pair.split_once('=') {
                cmd.env(key, value);
            }
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.port_allocator.release(port);
                *self.port.lock() = None;
                self.fail(format!("spawn failed: {e}"));
                return Err(ProcessError::SpawnFailed(e));
            }
        };

        if let Some(stdout) = child.stdout.take() {
            self.spawn_log_reader(stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            self.spawn_log_reader(stderr);
        }

        *self.child.lock() = Some(child);

        // Exclusivity fan-out (if this process's group is exclusive) must
        // fully resolve before the readiness probe is armed, so a sibling
        // group's processes are stopping while this one is still `Starting`.
        self.group_view.on_member_starting(&self.id).await;

        let ready = self.wait_for_ready(&proxy_url, health_check_timeout).await;
        match ready {
            true => {
                self.set_state(ProcessState::Ready);
                self.touch_last_used();
                if let Some(ttl) = self.config.ttl {
                    tokio::spawn(self.clone().run_idle_timer(ttl));
                }
                Ok(())
            }
            false => {
                let exited = self.child.lock().as_mut().map(|c| c.try_wait().ok().flatten()).flatten().is_some();
                let reason = if exited {
                    "child process exited before becoming ready".to_string()
                } else {
                    "readiness probe timed out".to_string()
                };
                self.reap(port).await;
                self.fail(reason);
                Err(ProcessError::ReadinessTimeout)
            }
        }
    }

    fn spawn_log_reader<R>(&self, reader: R)
    where
        R: tokio::io::AsyncRead + Unpin + Send + 'static,
    {
        let monitor = self.log_monitor.clone();
        let id = self.id.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        monitor.write(line.as_bytes());
                        monitor.write(b"\n");
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(model_id = %id, error = %e, "log reader failed");
                        break;
                    }
                }
            }
        });
    }

    /// Sleep-polls while `Ready`, stopping the process once it has been
    /// idle (`inflight == 0`, no request since `lastUsed`) for `ttl`.
    /// Exits without acting the moment the process leaves `Ready` for
    /// any other reason; a subsequent `start()` arms its own timer.
    async fn run_idle_timer(self: Arc<Self>, ttl: Duration)
    where
        C: 'static,
    {
        let poll = PROBE_INTERVAL.min(ttl);
        loop {
            tokio::time::sleep(poll).await;
            if self.state() != ProcessState::Ready {
                return;
            }
            if self.inflight() == 0 {
                let idle_for_ms = self.clock.epoch_ms().saturating_sub(self.last_used_epoch_ms());
                if idle_for_ms >= ttl.as_millis() as u64 {
                    self.stop(StopStrategy::IdleTimeout).await;
                    return;
                }
            }
        }
    }

    async fn wait_for_ready(&self, proxy_url: &str, health_check_timeout: Duration) -> bool {
        if !self.config.probes_readiness() {
            return tokio::time::timeout(health_check_timeout, self.wait_for_tcp_connect(proxy_url))
                .await
                .unwrap_or(false);
        }

        let url = format!("{}{}", proxy_url, self.config.check_endpoint);
        let deadline = tokio::time::Instant::now() + health_check_timeout;
        loop {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            if self.child_exited() {
                return false;
            }
            let attempt = self.http.get(&url).timeout(PROBE_ATTEMPT_TIMEOUT).send().await;
            if let Ok(resp) = attempt {
                if resp.status().is_success() {
                    return true;
                }
            }
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }

    async fn wait_for_tcp_connect(&self, proxy_url: &str) -> bool {
        let Some(host) = proxy_url.strip_prefix("http://").or_else(|| proxy_url.strip_prefix("https://")) else {
            return false;
        };
        let authority = host.split('/').next().unwrap_or(host);
        loop {
            if self.child_exited() {
                return false;
            }
            if tokio::net::TcpStream::connect(authority).await.is_ok() {
                return true;
            }
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }

    fn child_exited(&self) -> bool {
        self.child.lock().as_mut().map(|c| matches!(c.try_wait(), Ok(Some(_)))).unwrap_or(true)
    }

    fn fail(&self, reason: String) {
        tracing::error!(model_id = %self.id, reason = %reason, "process failed");
        *self.last_error.lock() = Some(reason);
        self.set_state(ProcessState::Failed);
    }

    /// Acquires a concurrency permit, gating entry at `concurrencyLimit`.
    /// Cancellation-safe: if the caller's future is dropped while
    /// waiting, no permit is held. Takes `self` by `Arc` so the guard
    /// can outlive the caller's local borrow (e.g. returned across a
    /// group coordinator boundary).
    pub async fn acquire_permit(self: &Arc<Self>) -> Result<InflightGuard<C>, ProcessError> {
        let permit = self.semaphore.clone().acquire_owned().await.map_err(|_| ProcessError::PermitCancelled)?;
        Ok(InflightGuard { process: self.clone(), _permit: permit })
    }

    fn touch_last_used(&self) {
        self.last_used_epoch_ms.store(self.clock.epoch_ms(), Ordering::Relaxed);
    }

    /// Stops the process per `strategy`, returning once it is `Stopped`.
    pub async fn stop(&self, strategy: StopStrategy) {
        {
            let state = *self.state.lock();
            if matches!(state, ProcessState::Stopped | ProcessState::Shutdown) {
                return;
            }
        }

        match strategy {
            StopStrategy::Immediately => self.stop_immediately().await,
            StopStrategy::WaitForInflightRequest | StopStrategy::IdleTimeout => {
                self.set_state(ProcessState::Stopping);
                let deadline = tokio::time::Instant::now() + DEFAULT_DRAIN_DEADLINE;
                while self.inflight() > 0 && tokio::time::Instant::now() < deadline {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                self.stop_immediately().await;
            }
        }
    }

    async fn stop_immediately(&self) {
        self.set_state(ProcessState::Stopping);
        let pid = self.child.lock().as_ref().and_then(|c| c.id());
        if let Some(pid) = pid {
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }

        let grace = tokio::time::sleep(STOP_GRACE);
        tokio::pin!(grace);
        let exited = loop {
            let still_running = self.child.lock().as_mut().map(|c| c.try_wait().ok().flatten().is_none()).unwrap_or(false);
            if !still_running {
                break true;
            }
            tokio::select! {
                _ = &mut grace => break false,
                _ = tokio::time::sleep(Duration::from_millis(50)) => {}
            }
        };

        if !exited {
            if let Some(child) = self.child.lock().as_mut() {
                let _ = child.start_kill();
            }
        }
        let child = self.child.lock().take();
        if let Some(mut child) = child {
            let _ = child.wait().await;
        }
        if let Some(port) = self.port.lock().take() {
            self.port_allocator.release(port);
        }
        self.set_state(ProcessState::Stopped);
    }

    async fn reap(&self, port: u16) {
        let child = self.child.lock().take();
        if let Some(mut child) = child {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
        self.port_allocator.release(port);
        *self.port.lock() = None;
    }

    /// Irreversibly stops the process and refuses future `start()` calls.
    pub async fn shutdown(&self) {
        self.stop_immediately().await;
        self.set_state(ProcessState::Shutdown);
    }
}

/// RAII guard for a held concurrency permit; updates `lastUsed` when
/// the in-flight request completes.
pub struct InflightGuard<C: Clock = SystemClock> {
    process: Arc<Process<C>>,
    _permit: OwnedSemaphorePermit,
}

impl<C: Clock> Drop for InflightGuard<C> {
    fn drop(&mut self) {
        self.process.touch_last_used();
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
