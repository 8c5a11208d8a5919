// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Model identity and per-model configuration.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::time::Duration;

/// A model's logical id, as written in the config file.
///
/// Unlike [`crate::id::IdBuf`]-backed ids, a `ModelId` is not randomly
/// generated: it is the stable, user-chosen key under which a model
/// appears in `models:` and is referenced from `groups:` and aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for ModelId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ModelId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for ModelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A path segment naming a key to delete from a request body (e.g.
/// `/options/seed`), applied via JSON-pointer-style deletion.
pub type StripParam = String;

/// Static, validated configuration for one model entry.
///
/// Immutable after the owning [`crate::config::GatewayConfig`] has loaded;
/// cloned freely since all fields are cheaply clonable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub id: ModelId,

    /// Multi-line argument template. Expanded via macros and `${PORT}`,
    /// then POSIX-split into argv by `mg-cmdline`.
    pub cmd: String,

    /// Base URL template for the spawned server, e.g. `http://127.0.0.1:${PORT}`.
    pub proxy_url: String,

    /// `KEY=VALUE` pairs passed to the child process, in declared order.
    #[serde(default)]
    pub env: Vec<String>,

    /// Alternate public names resolving to this model. Order is
    /// preserved for deterministic listing but carries no priority.
    #[serde(default)]
    pub aliases: IndexSet<String>,

    /// Overrides the `model` field sent upstream; empty means pass
    /// through the resolved real id unchanged.
    #[serde(default)]
    pub use_model_name: String,

    /// Idle duration after which a `Ready` process with no in-flight
    /// requests stops itself. `None`/zero means never.
    #[serde(default, with = "humantime_duration")]
    pub ttl: Option<Duration>,

    /// Excluded from `GET /v1/models` listings; still addressable.
    #[serde(default)]
    pub unlisted: bool,

    /// Simultaneous in-flight requests allowed through this process.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: u32,

    /// JSON pointers deleted from inbound bodies before forwarding.
    #[serde(default)]
    pub strip_params: Vec<StripParam>,

    /// Relative path probed for readiness. `"none"` disables probing
    /// (readiness is declared on first successful TCP connect).
    #[serde(default = "default_check_endpoint")]
    pub check_endpoint: String,
}

fn default_concurrency_limit() -> u32 {
    1
}

fn default_check_endpoint() -> String {
    "/health".to_string()
}

impl ModelConfig {
    pub fn probes_readiness(&self) -> bool {
        self.check_endpoint != "none"
    }
}

/// (de)serialize `Option<Duration>` as a duration string ("30s", "5m", "0"),
/// matching the textual form used throughout the config file.
mod humantime_duration {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(d) => format!("{}s", d.as_secs()).serialize(s),
            None => "0".serialize(s),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let raw = String::deserialize(d)?;
        let dur = crate::duration::parse_duration(&raw).map_err(serde::de::Error::custom)?;
        Ok(if dur.is_zero() { None } else { Some(dur) })
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct ModelConfigBuilder => ModelConfig {
        into {
            id: ModelId = "test-model",
            cmd: String = "echo ${PORT}",
            proxy_url: String = "http://127.0.0.1:${PORT}",
            use_model_name: String = "",
            check_endpoint: String = "/health"
        }
        set {
            env: Vec<String> = Vec::new(),
            aliases: indexmap::IndexSet<String> = indexmap::IndexSet::new(),
            ttl: Option<std::time::Duration> = None,
            unlisted: bool = false,
            concurrency_limit: u32 = 1,
            strip_params: Vec<String> = Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
