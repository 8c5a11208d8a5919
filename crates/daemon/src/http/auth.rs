// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API key middleware. Checked in order: `Authorization: Bearer`,
//! `X-API-Key`, `?api_key=`. The settings endpoint and CORS preflights
//! are exempt so the UI can always read the auth requirement itself.

use crate::manager::Manager;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use mg_core::Clock;
use mg_wire::ErrorBody;
use std::sync::Arc;

const EXEMPT_PATHS: &[&str] = &["/api/settings/system"];

pub async fn require_api_key<C: Clock + 'static>(State(manager): State<Arc<Manager<C>>>, request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS || EXEMPT_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let candidate = bearer_token(&request).or_else(|| api_key_header(&request)).or_else(|| api_key_query(&request));
    if !manager.settings().authorize(candidate.as_deref()) {
        return (StatusCode::UNAUTHORIZED, Json(ErrorBody::new("missing or invalid API key"))).into_response();
    }
    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<String> {
    let header = request.headers().get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(str::to_string)
}

fn api_key_header(request: &Request) -> Option<String> {
    request.headers().get("x-api-key")?.to_str().ok().map(str::to_string)
}

fn api_key_query(request: &Request) -> Option<String> {
    let query = request.uri().query()?;
    url_search_param(query, "api_key")
}

fn url_search_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}
