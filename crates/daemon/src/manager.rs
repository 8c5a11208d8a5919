// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Manager`: owns every process group, the event bus, the port
//! allocator, and the external collaborators, and exposes the narrow
//! surface `mg-daemon::http` dispatches onto.

use crate::error::ManagerError;
use axum::body::Bytes;
use axum::extract::Request;
use axum::response::Response;
use indexmap::IndexMap;
use mg_adapters::{ConfigLoader, Detector, Downloader};
use mg_core::{Clock, DownloadStatus, GatewayConfig, GroupConfig, GroupId, ModelConfig, ModelId, ProcessState, SystemClock};
use mg_engine::{EventBus, ExclusivityNotifier, PortAllocator, ProcessGroup};
use mg_proxy::ProxyCore;
use mg_storage::{Sidecar, Settings, TrackedFolders};
use mg_wire::RunningModel;
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

const RECONFIGURE_DEBOUNCE: Duration = Duration::from_secs(3);

/// Group-id prefix for the implicit, single-member group synthesized
/// for any model not named in the config's `groups:` table. Chosen to
/// be unrepresentable by a YAML group key (leading double-underscore
/// is not produced by any real config this crate writes).
const SOLO_GROUP_PREFIX: &str = "__solo__";

struct GroupEntry<C: Clock + 'static> {
    group: Arc<ProcessGroup<C>>,
    persistent: bool,
}

/// Collaborators injected from outside the runtime state `Manager`
/// itself owns — first-party defaults live in `mg-adapters`.
pub struct ManagerDeps {
    pub config_loader: Arc<dyn ConfigLoader>,
    pub detector: Arc<dyn Detector>,
    pub downloader: Arc<dyn Downloader>,
    pub settings: Settings,
    pub settings_sidecar: Sidecar<Settings>,
    pub tracked_folders: TrackedFolders,
    pub folders_sidecar: Sidecar<TrackedFolders>,
}

pub struct Manager<C: Clock + 'static = SystemClock> {
    clock: C,
    config: RwLock<GatewayConfig>,
    groups: RwLock<IndexMap<GroupId, GroupEntry<C>>>,
    model_index: RwLock<IndexMap<ModelId, GroupId>>,
    events: Arc<EventBus>,
    port_allocator: Arc<PortAllocator>,
    proxy: ProxyCore,
    config_loader: Arc<dyn ConfigLoader>,
    detector: Arc<dyn Detector>,
    downloader: Arc<dyn Downloader>,
    settings: RwLock<Settings>,
    settings_sidecar: Sidecar<Settings>,
    tracked_folders: Mutex<TrackedFolders>,
    folders_sidecar: Sidecar<TrackedFolders>,
    shutdown: CancellationToken,
    reconfigure_debounce: AsyncMutex<Option<tokio::task::JoinHandle<()>>>,
}

impl<C: Clock + 'static> Manager<C> {
    pub fn new(config: GatewayConfig, clock: C, deps: ManagerDeps) -> Arc<Self> {
        let events = Arc::new(EventBus::new());
        let port_allocator = Arc::new(PortAllocator::new(config.start_port));
        let proxy = ProxyCore::new(events.clone());

        let manager = Arc::new(Self {
            clock,
            config: RwLock::new(config),
            groups: RwLock::new(IndexMap::new()),
            model_index: RwLock::new(IndexMap::new()),
            events,
            port_allocator,
            proxy,
            config_loader: deps.config_loader,
            detector: deps.detector,
            downloader: deps.downloader,
            settings: RwLock::new(deps.settings),
            settings_sidecar: deps.settings_sidecar,
            tracked_folders: Mutex::new(deps.tracked_folders),
            folders_sidecar: deps.folders_sidecar,
            shutdown: CancellationToken::new(),
            reconfigure_debounce: AsyncMutex::new(None),
        });
        manager.rebuild_groups();
        manager
    }

    /// (Re)builds every `ProcessGroup` from the currently held config,
    /// synthesizing a `Plain`-policy single-member group for any model
    /// that no configured group names. Called once at construction and
    /// again after a reconfigure swaps in a regenerated config.
    fn rebuild_groups(self: &Arc<Self>) {
        let config = self.config.read().clone();
        let mut groups = IndexMap::new();
        let mut model_index = IndexMap::new();
        let notifier: Arc<dyn ExclusivityNotifier> = self.clone();

        for (group_id, group_config) in &config.groups {
            let group = ProcessGroup::new(
                group_config.clone(),
                &config.models,
                &config.macros,
                self.clock.clone(),
                self.port_allocator.clone(),
                self.events.clone(),
                config.health_check_timeout,
                notifier.clone(),
            );
            for member in &group_config.members {
                model_index.insert(member.clone(), group_id.clone());
            }
            groups.insert(group_id.clone(), GroupEntry { group, persistent: group_config.persistent });
        }

        for model_id in config.models.keys() {
            if model_index.contains_key(model_id) {
                continue;
            }
            let solo_id = GroupId::new(format!("{SOLO_GROUP_PREFIX}{model_id}"));
            let solo_config = GroupConfig {
                id: solo_id.clone(),
                members: [model_id.clone()].into_iter().collect(),
                swap: false,
                parallel: false,
                exclusive: false,
                persistent: true,
            };
            let group = ProcessGroup::new(
                solo_config,
                &config.models,
                &config.macros,
                self.clock.clone(),
                self.port_allocator.clone(),
                self.events.clone(),
                config.health_check_timeout,
                notifier.clone(),
            );
            model_index.insert(model_id.clone(), solo_id.clone());
            groups.insert(solo_id, GroupEntry { group, persistent: true });
        }

        *self.groups.write() = groups;
        *self.model_index.write() = model_index;
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    fn resolve(&self, name: &str) -> Result<ModelId, ManagerError> {
        self.config.read().aliases.resolve(name).cloned().ok_or_else(|| ManagerError::UnknownModel(name.to_string()))
    }

    fn group_for(&self, model_id: &ModelId) -> Result<Arc<ProcessGroup<C>>, ManagerError> {
        let groups = self.groups.read();
        let model_index = self.model_index.read();
        let group_id = model_index.get(model_id).ok_or_else(|| ManagerError::UnknownModel(model_id.to_string()))?;
        Ok(groups.get(group_id).expect("model index and group map stay in sync").group.clone())
    }

    /// Entry point for every JSON compat-surface route: reads the
    /// `model` field to resolve the real model id and owning group,
    /// then hands the (untouched) body back to `ProxyCore::forward`.
    pub async fn proxy_chat_completion(&self, upstream_path: &str, request: Request) -> Result<Response, ManagerError> {
        let (parts, body) = request.into_parts();
        let body_bytes = axum::body::to_bytes(body, usize::MAX).await.map_err(|e| ManagerError::BodyRead(e.to_string()))?;

        let content_type = parts.headers.get(axum::http::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or("");
        let model_name = extract_model_name(content_type, &body_bytes).await?;
        let model_id = self.resolve(&model_name)?;
        let group = self.group_for(&model_id)?;

        let request = Request::from_parts(parts, axum::body::Body::from(body_bytes));
        self.proxy.forward(&group, &model_id, upstream_path, request).await.map_err(Into::into)
    }

    /// Entry point for `/upstream/{alias}/{rest}`: `alias` has already
    /// been resolved to `model_id` and `rest` is the path to forward.
    pub async fn proxy_by_upstream_path(&self, model_id: &ModelId, upstream_path: &str, request: Request) -> Result<Response, ManagerError> {
        let group = self.group_for(model_id)?;
        self.proxy.forward(&group, model_id, upstream_path, request).await.map_err(Into::into)
    }

    pub fn resolve_alias(&self, name: &str) -> Result<ModelId, ManagerError> {
        self.resolve(name)
    }

    /// Longest-alias-prefix match for `/upstream/{alias}/{rest}`.
    pub fn match_upstream_path(&self, path: &str) -> Option<(ModelId, String)> {
        self.config.read().aliases.longest_prefix_match(path).map(|(id, rest)| (id.clone(), rest))
    }

    pub fn epoch_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    /// Listed models, excluding `unlisted`, sorted by id.
    pub fn list_models(&self) -> Vec<(ModelId, Vec<String>)> {
        let config = self.config.read();
        let mut entries: Vec<_> = config
            .models
            .values()
            .filter(|m| !m.unlisted)
            .map(|m| (m.id.clone(), m.aliases.iter().cloned().collect()))
            .collect();
        entries.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        entries
    }

    pub fn models_total(&self) -> usize {
        self.config.read().models.len()
    }

    pub fn models_loaded(&self) -> usize {
        self.groups.read().values().flat_map(|e| e.group.members()).filter(|p| p.state() == ProcessState::Ready).count()
    }

    /// Snapshot of every process across every group, for `GET /running`
    /// and the SSE subscribe snapshot.
    pub fn running(&self) -> Vec<RunningModel> {
        self.groups
            .read()
            .values()
            .flat_map(|entry| {
                let group_id = entry.group.id.clone();
                entry.group.members().map(move |p| RunningModel {
                    id: p.id.clone(),
                    group_id: Some(group_id.clone()),
                    state: p.state(),
                    port: p.port().unwrap_or(0),
                    inflight: p.inflight() as u32,
                })
            })
            .collect()
    }

    /// Per-process log ring buffer contents, for the SSE subscribe
    /// snapshot. Lossy UTF-8 rendering; binary-safe capture lives in
    /// each process's own `LogMonitor`.
    pub fn log_history(&self) -> Vec<mg_wire::LogHistoryEntry> {
        self.groups
            .read()
            .values()
            .flat_map(|entry| {
                entry.group.members().map(|p| mg_wire::LogHistoryEntry {
                    model_id: p.id.clone(),
                    lines: String::from_utf8_lossy(&p.log_monitor().history()).into_owned(),
                })
            })
            .collect()
    }

    pub async fn unload_all(&self) {
        let groups: Vec<Arc<ProcessGroup<C>>> = self.groups.read().values().map(|e| e.group.clone()).collect();
        let futures = groups.iter().map(|g| g.stop_all(mg_core::StopStrategy::Immediately));
        futures::future::join_all(futures).await;
    }

    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let groups: Vec<Arc<ProcessGroup<C>>> = self.groups.read().values().map(|e| e.group.clone()).collect();
        let futures = groups.iter().map(|g| g.shutdown());
        futures::future::join_all(futures).await;
    }

    /// Spawns the startup preload sequence as a background task; does
    /// not block construction or `serve`.
    pub fn spawn_preload(self: &Arc<Self>) {
        let preload = self.config.read().preload.clone();
        if preload.is_empty() {
            return;
        }
        let manager = self.clone();
        tokio::spawn(async move {
            for model_id in preload {
                let ok = match manager.group_for(&model_id) {
                    Ok(group) => match group.ensure_ready(&model_id).await {
                        Ok(process) => {
                            process.warm_up().await;
                            true
                        }
                        Err(_) => false,
                    },
                    Err(_) => false,
                };
                if !ok {
                    tracing::warn!(model_id = %model_id, "preload failed");
                }
                manager.events.emit(mg_core::Event::ModelPreloaded { model_id, ok });
            }
        });
    }

    /// Enqueues a download through the configured `Downloader` and, if
    /// it resolves already `Completed` (the only outcome a first-party
    /// `Downloader` ever reports inline), drives the debounced
    /// reconfigure path. Emits `DownloadProgress` unconditionally so
    /// SSE subscribers observe the attempt either way.
    pub async fn enqueue_download(self: &Arc<Self>, id: String, file_path: String) {
        let record = self.downloader.enqueue(id, file_path).await;
        self.events.emit(mg_core::Event::DownloadProgress {
            download_id: record.id.clone(),
            bytes_total: record.bytes_total,
            bytes_done: record.bytes_done,
        });
        if record.status == DownloadStatus::Completed {
            self.on_download_completed(PathBuf::from(record.file_path)).await;
        }
    }

    /// Tracks the downloaded file's parent directory and arms (or
    /// replaces) the debounce timer that eventually triggers a config
    /// regeneration.
    async fn on_download_completed(self: &Arc<Self>, file_path: PathBuf) {
        let Some(dir) = file_path.parent().map(|p| p.to_path_buf()) else { return };
        let added = {
            let mut folders = self.tracked_folders.lock();
            let added = folders.add(dir);
            if added {
                if let Err(e) = self.folders_sidecar.save(&folders) {
                    tracing::warn!(error = %e, "failed to persist tracked folders");
                }
            }
            added
        };
        if !added {
            return;
        }

        let manager = self.clone();
        let mut debounce = self.reconfigure_debounce.lock().await;
        if let Some(handle) = debounce.take() {
            handle.abort();
        }
        *debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(RECONFIGURE_DEBOUNCE).await;
            manager.reconfigure().await;
        }));
    }

    /// Runs `Detector::scan` over every tracked folder, persists the
    /// regenerated config through `ConfigLoader::save`, reloads it, and
    /// rebuilds every group from the result.
    async fn reconfigure(self: &Arc<Self>) {
        self.events.emit(mg_core::Event::ConfigChanged { reloading: true });
        let folders: Vec<PathBuf> = self.tracked_folders.lock().folders().to_vec();
        let folder_refs: Vec<&std::path::Path> = folders.iter().map(|p| p.as_path()).collect();
        let discovered = self.detector.scan(&folder_refs);

        if !discovered.is_empty() {
            let mut config = self.config.read().clone();
            for model in discovered {
                config.models.entry(model.id.clone()).or_insert(model);
            }
            match serde_yaml::to_string(&RawGatewayConfigView::from(&config)) {
                Ok(yaml) => {
                    if let Err(e) = self.config_loader.save(&yaml) {
                        tracing::warn!(error = %e, "failed to save regenerated config");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to serialize regenerated config"),
            }
        }

        match self.config_loader.load() {
            Ok(reloaded) => {
                *self.config.write() = reloaded;
                self.rebuild_groups();
            }
            Err(e) => tracing::warn!(error = %e, "failed to reload config after reconfigure"),
        }
        self.events.emit(mg_core::Event::ConfigChanged { reloading: false });
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    pub fn set_settings(&self, settings: Settings) {
        if let Err(e) = self.settings_sidecar.save(&settings) {
            tracing::warn!(error = %e, "failed to persist settings");
        }
        *self.settings.write() = settings;
    }
}

#[async_trait::async_trait]
impl<C: Clock + 'static> ExclusivityNotifier for Manager<C> {
    /// Stops every non-persistent sibling group to completion before
    /// the triggering group's member is allowed to report `Ready`.
    async fn notify_starting(&self, group_id: &GroupId) {
        let siblings: Vec<Arc<ProcessGroup<C>>> =
            self.groups.read().iter().filter(|(id, entry)| *id != group_id && !entry.persistent).map(|(_, entry)| entry.group.clone()).collect();
        let futures = siblings.iter().map(|g| g.stop_all(mg_core::StopStrategy::WaitForInflightRequest));
        futures::future::join_all(futures).await;
    }
}

/// A thin, serialization-only view of [`GatewayConfig`] matching the
/// on-disk YAML schema, used only to write back a regenerated config.
/// Kept separate from `GatewayConfig::from_raw`'s validation path since
/// this direction never needs to re-validate what the detector found.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RawGatewayConfigView<'a> {
    start_port: u16,
    health_check_timeout: String,
    log_level: &'a str,
    macros: &'a IndexMap<String, String>,
    models: IndexMap<&'a str, &'a ModelConfig>,
    groups: IndexMap<&'a str, &'a GroupConfig>,
    hooks: HooksView<'a>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct HooksView<'a> {
    on_startup: OnStartupView<'a>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct OnStartupView<'a> {
    preload: Vec<&'a str>,
}

impl<'a> From<&'a GatewayConfig> for RawGatewayConfigView<'a> {
    fn from(config: &'a GatewayConfig) -> Self {
        Self {
            start_port: config.start_port,
            health_check_timeout: format!("{}s", config.health_check_timeout.as_secs()),
            log_level: &config.log_level,
            macros: &config.macros,
            models: config.models.iter().map(|(id, m)| (id.as_str(), m)).collect(),
            groups: config.groups.iter().map(|(id, g)| (id.as_str(), g)).collect(),
            hooks: HooksView { on_startup: OnStartupView { preload: config.preload.iter().map(|id| id.as_str()).collect() } },
        }
    }
}

/// Peeks the `model` field of a chat-compat request body without
/// mutating it; the actual substitution (when `useModelName` is
/// configured) happens later, inside `ProxyCore::forward`.
async fn extract_model_name(content_type: &str, body: &Bytes) -> Result<String, ManagerError> {
    if content_type.starts_with("multipart/form-data") {
        if let Some(boundary) = multipart_boundary(content_type) {
            return extract_model_name_multipart(body.clone(), &boundary).await;
        }
    }

    let value: serde_json::Value = serde_json::from_slice(body).map_err(ManagerError::MalformedJson)?;
    value.get("model").and_then(|v| v.as_str()).map(str::to_string).ok_or(ManagerError::MissingModelField)
}

fn multipart_boundary(content_type: &str) -> Option<String> {
    content_type.split(';').map(str::trim).find_map(|part| part.strip_prefix("boundary=")).map(|b| b.trim_matches('"').to_string())
}

async fn extract_model_name_multipart(body: Bytes, boundary: &str) -> Result<String, ManagerError> {
    let source = futures::stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut parts = multer::Multipart::new(source, boundary);
    while let Some(mut field) = parts.next_field().await.map_err(|e| ManagerError::MalformedMultipart(e.to_string()))? {
        if field.name() != Some("model") {
            continue;
        }
        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| ManagerError::MalformedMultipart(e.to_string()))? {
            data.extend_from_slice(&chunk);
        }
        return String::from_utf8(data).map_err(|e| ManagerError::MalformedMultipart(e.to_string()));
    }
    Err(ManagerError::MissingModelField)
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
