// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client over the daemon's admin surface. Unlike the
//! teacher's in-process daemon linkage, this CLI only ever talks to
//! `mgd` over the network, so it can reach a remote daemon just as
//! well as a local one.

use anyhow::{bail, Context, Result};
use mg_wire::{HealthResponse, ModelListResponse, RunningResponse};

pub struct DaemonClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self { base_url: base_url.into(), api_key, http: reqwest::Client::new() }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let mut builder = self.http.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.request(reqwest::Method::GET, "/health").send().await.context("connecting to daemon")?;
        Self::ok_json(response).await
    }

    pub async fn list_models(&self) -> Result<ModelListResponse> {
        let response = self.request(reqwest::Method::GET, "/v1/models").send().await.context("connecting to daemon")?;
        Self::ok_json(response).await
    }

    pub async fn running(&self) -> Result<RunningResponse> {
        let response = self.request(reqwest::Method::GET, "/running").send().await.context("connecting to daemon")?;
        Self::ok_json(response).await
    }

    pub async fn unload_all(&self) -> Result<()> {
        let response = self.request(reqwest::Method::GET, "/unload").send().await.context("connecting to daemon")?;
        if !response.status().is_success() {
            bail!("daemon returned {}", response.status());
        }
        Ok(())
    }

    async fn ok_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("daemon returned {status}: {body}");
        }
        response.json::<T>().await.context("decoding daemon response")
    }
}
