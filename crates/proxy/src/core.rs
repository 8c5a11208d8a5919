// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ProxyCore`: the one-shot-forward + SSE fan-out at the center of
//! every proxied request. `mg-daemon`'s route handlers call
//! [`ProxyCore::forward`] once the owning group and real model id are
//! known; everything downstream of that (body rewrite, readiness,
//! streaming) lives here.

use crate::body_rewrite::{rewrite_json, rewrite_multipart};
use crate::error::ProxyError;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use futures::StreamExt;
use mg_core::{Clock, Event, ModelId};
use mg_engine::{EventBus, MetricsSniffer, ProcessGroup};
use std::sync::Arc;

/// Request/response headers never copied across the proxy boundary:
/// connection-management headers whose values are only valid for one
/// specific hop, plus `content-length`, which is recomputed from the
/// (possibly rewritten) body.
const HOP_BY_HOP: &[&str] = &[
    "host",
    "connection",
    "transfer-encoding",
    "content-length",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "upgrade",
];

pub struct ProxyCore {
    http: reqwest::Client,
    events: Arc<EventBus>,
}

impl ProxyCore {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self { http: reqwest::Client::new(), events }
    }

    /// Forwards one request to `model_id`'s process, rewriting the
    /// body, waiting for readiness, and streaming the response back.
    ///
    /// `upstream_path` is the original request path (plus query
    /// string) as seen by the model server, e.g. `/v1/chat/completions`.
    ///
    /// Errors returned before the upstream response's status line has
    /// been read map to a `502` JSON body at the `mg-daemon` boundary;
    /// `mg-daemon` must not attempt to translate an error occurring
    /// after streaming has begun into a response body.
    pub async fn forward<C: Clock + 'static>(
        &self,
        group: &ProcessGroup<C>,
        model_id: &ModelId,
        upstream_path: &str,
        request: Request,
    ) -> Result<Response, ProxyError> {
        let config = group.model_config(model_id)?;
        let (parts, body) = request.into_parts();

        let body_bytes = axum::body::to_bytes(body, usize::MAX).await.map_err(|e| ProxyError::BodyRead(e.to_string()))?;

        let content_type = parts.headers.get(axum::http::header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or("");

        let rewritten = if content_type.starts_with("application/json") {
            rewrite_json(&body_bytes, &config)?
        } else if let Some(boundary) = multipart_boundary(content_type) {
            rewrite_multipart(body_bytes, &boundary, &config).await?
        } else {
            body_bytes
        };

        let (process, permit) = group.ensure_ready_and_acquire(model_id).await?;
        let proxy_url = process.resolved_proxy_url().unwrap_or_default();
        let url = match parts.uri.query() {
            Some(query) => format!("{proxy_url}{upstream_path}?{query}"),
            None => format!("{proxy_url}{upstream_path}"),
        };

        let mut upstream_req = self.http.request(parts.method.clone(), url.as_str()).body(rewritten);
        for (name, value) in parts.headers.iter() {
            if HOP_BY_HOP.contains(&name.as_str()) {
                continue;
            }
            upstream_req = upstream_req.header(name.as_str(), value.as_bytes());
        }

        let upstream_resp = upstream_req.send().await.map_err(|e| {
            tracing::warn!(model_id = %model_id, url = %url, error = %e, "upstream request failed before headers");
            ProxyError::Upstream(e)
        })?;

        let status = upstream_resp.status();
        let is_sse = upstream_resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/event-stream"))
            .unwrap_or(false);

        let mut response_headers = HeaderMap::new();
        for (name, value) in upstream_resp.headers().iter() {
            if HOP_BY_HOP.contains(&name.as_str()) {
                continue;
            }
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_str().as_bytes()), HeaderValue::from_bytes(value.as_bytes())) {
                response_headers.append(name, value);
            }
        }

        // `permit` and, for SSE, the sniffer are moved into the stream's
        // mapping closure so the concurrency slot is held for the full
        // duration of the response, not just until headers are built.
        let body = if is_sse {
            let mut sniffer = MetricsSniffer::new(model_id.clone());
            let events = self.events.clone();
            let stream = upstream_resp.bytes_stream().map(move |chunk| {
                let _keep_permit = &permit;
                if let Ok(bytes) = &chunk {
                    for metrics in sniffer.feed(bytes) {
                        events.emit(Event::TokenMetrics(metrics));
                    }
                }
                chunk
            });
            Body::from_stream(stream)
        } else {
            let stream = upstream_resp.bytes_stream().map(move |chunk| {
                let _keep_permit = &permit;
                chunk
            });
            Body::from_stream(stream)
        };

        let mut builder = Response::builder().status(status.as_u16());
        *builder.headers_mut().ok_or_else(|| ProxyError::ResponseBuild("response builder has no header map".to_string()))? = response_headers;
        builder.body(body).map_err(|e| ProxyError::ResponseBuild(e.to_string()))
    }
}

/// Extracts the `boundary=...` parameter from a `multipart/form-data`
/// content type, returning `None` for any other content type.
fn multipart_boundary(content_type: &str) -> Option<String> {
    if !content_type.starts_with("multipart/form-data") {
        return None;
    }
    content_type.split(';').map(str::trim).find_map(|part| part.strip_prefix("boundary=")).map(|b| b.trim_matches('"').to_string())
}

#[cfg(test)]
#[path = "core_tests.rs"]
mod tests;
