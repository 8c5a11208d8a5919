// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The axum router: compat-surface routes, the upstream passthrough,
//! admin endpoints, and the SSE event stream. Auth and CORS are
//! applied as router-wide middleware rather than per-route.

pub mod auth;

use crate::error::ManagerError;
use crate::manager::Manager;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use futures::StreamExt;
use mg_adapters::StaticUI;
use mg_core::{Clock, GatewayFault, ProcessState};
use mg_storage::Settings;
use mg_wire::{ErrorBody, EventsSnapshot, HealthResponse, ModelListEntry, ModelListResponse, RunningResponse};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// Every compat-surface path that forwards an OpenAI-shaped JSON body
/// unchanged apart from `model`/`stripParams` substitution.
const COMPAT_PATHS: &[&str] = &[
    "/v1/chat/completions",
    "/v1/completions",
    "/v1/embeddings",
    "/v1/rerank",
    "/v1/reranking",
    "/rerank",
    "/reranking",
    "/infill",
    "/completion",
    "/v1/audio/speech",
    "/v1/audio/transcriptions",
];

pub fn router<C: Clock + 'static>(manager: Arc<Manager<C>>, static_ui: Arc<dyn StaticUI>) -> Router {
    let mut router = Router::new();
    for path in COMPAT_PATHS {
        router = router.route(path, post(compat_forward::<C>));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(86400));

    router
        .route("/v1/models", get(list_models::<C>))
        .route("/upstream/*rest", any(upstream_forward::<C>))
        .route("/api/events", get(events_handler::<C>))
        .route("/health", get(health::<C>))
        .route("/running", get(running::<C>))
        .route("/unload", get(unload::<C>))
        .route("/api/settings/system", get(get_settings::<C>).post(set_settings::<C>))
        .merge(static_ui.router())
        .layer(middleware::from_fn_with_state(manager.clone(), auth::require_api_key::<C>))
        .layer(cors)
        .with_state(manager)
}

async fn compat_forward<C: Clock + 'static>(State(manager): State<Arc<Manager<C>>>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    match manager.proxy_chat_completion(&path, request).await {
        Ok(response) => response,
        Err(err) => error_response(&err),
    }
}

async fn upstream_forward<C: Clock + 'static>(State(manager): State<Arc<Manager<C>>>, Path(rest): Path<String>, request: Request) -> Response {
    match manager.match_upstream_path(&rest) {
        Some((model_id, remainder)) => {
            let upstream_path = format!("/{remainder}");
            match manager.proxy_by_upstream_path(&model_id, &upstream_path, request).await {
                Ok(response) => response,
                Err(err) => error_response(&err),
            }
        }
        None => error_response(&ManagerError::UnknownModel(rest)),
    }
}

async fn list_models<C: Clock + 'static>(State(manager): State<Arc<Manager<C>>>) -> Json<ModelListResponse> {
    let entries = manager.list_models().into_iter().map(|(id, aliases)| ModelListEntry::new(id, aliases)).collect();
    Json(ModelListResponse::new(entries))
}

async fn health<C: Clock + 'static>(State(manager): State<Arc<Manager<C>>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        models_total: manager.models_total(),
        models_loaded: manager.models_loaded(),
        timestamp: manager.epoch_ms(),
    })
}

/// Only `Ready` members are reported here; the SSE snapshot
/// (`manager.running()` itself) carries every state so subscribers can
/// show starting/stopping transitions too.
async fn running<C: Clock + 'static>(State(manager): State<Arc<Manager<C>>>) -> Json<RunningResponse> {
    let models = manager.running().into_iter().filter(|m| m.state == ProcessState::Ready).collect();
    Json(RunningResponse { models })
}

async fn unload<C: Clock + 'static>(State(manager): State<Arc<Manager<C>>>) -> Json<serde_json::Value> {
    manager.unload_all().await;
    Json(serde_json::json!({ "status": "ok" }))
}

async fn get_settings<C: Clock + 'static>(State(manager): State<Arc<Manager<C>>>) -> Json<Settings> {
    Json(manager.settings())
}

async fn set_settings<C: Clock + 'static>(State(manager): State<Arc<Manager<C>>>, Json(settings): Json<Settings>) -> Json<Settings> {
    manager.set_settings(settings.clone());
    Json(settings)
}

/// First SSE frame is an [`EventsSnapshot`]; every frame after follows
/// live events off the bus until the client disconnects or the
/// manager shuts down.
async fn events_handler<C: Clock + 'static>(State(manager): State<Arc<Manager<C>>>) -> Response {
    let snapshot = EventsSnapshot {
        running: manager.running(),
        log_history: manager.log_history(),
        downloads: Vec::new(),
    };
    let snapshot_frame = format!("data: {}\n\n", serde_json::to_string(&snapshot).unwrap_or_default());

    let subscription = manager.events().subscribe(manager.shutdown_token());
    let live = futures::stream::unfold(subscription, move |mut sub| async move {
        let event = sub.recv().await?;
        let frame = mg_wire::sse_frame(&event).unwrap_or_default();
        Some((Ok::<_, std::convert::Infallible>(axum::body::Bytes::from(frame)), sub))
    });
    let stream = futures::stream::once(async move { Ok::<_, std::convert::Infallible>(axum::body::Bytes::from(snapshot_frame)) }).chain(live);

    let mut response = Response::new(axum::body::Body::from_stream(stream));
    response.headers_mut().insert(axum::http::header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    response.headers_mut().insert(axum::http::header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

fn error_response(err: &ManagerError) -> Response {
    let fault = GatewayFault::from(err);
    let status = StatusCode::from_u16(fault.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorBody::new(err.to_string()))).into_response()
}
