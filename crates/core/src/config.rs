// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The gateway's YAML configuration document and its validation.

use crate::alias::AliasIndex;
use crate::group::{GroupConfig, GroupId};
use crate::model::{ModelConfig, ModelId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("failed to write config file {path}: {source}")]
    Write { path: String, #[source] source: std::io::Error },

    /// Collects every offending field rather than stopping at the first.
    #[error("invalid configuration:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

/// Raw on-disk shape of a model entry: identical to [`ModelConfig`] minus
/// `id`, which is supplied by the enclosing map key instead of being
/// repeated in the value.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawModelConfig {
    cmd: String,
    proxy_url: String,
    #[serde(default)]
    env: Vec<String>,
    #[serde(default)]
    aliases: indexmap::IndexSet<String>,
    #[serde(default)]
    use_model_name: String,
    #[serde(default)]
    ttl: Option<String>,
    #[serde(default)]
    unlisted: bool,
    #[serde(default = "default_concurrency_limit")]
    concurrency_limit: u32,
    #[serde(default)]
    strip_params: Vec<String>,
    #[serde(default = "default_check_endpoint")]
    check_endpoint: String,
}

fn default_concurrency_limit() -> u32 {
    1
}

fn default_check_endpoint() -> String {
    "/health".to_string()
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawGroupConfig {
    #[serde(default)]
    members: indexmap::IndexSet<String>,
    #[serde(default)]
    swap: bool,
    #[serde(default)]
    parallel: bool,
    #[serde(default)]
    exclusive: bool,
    #[serde(default)]
    persistent: bool,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct Hooks {
    #[serde(default)]
    on_startup: OnStartup,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct OnStartup {
    #[serde(default)]
    preload: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawGatewayConfig {
    #[serde(default = "default_start_port")]
    start_port: u16,
    #[serde(default = "default_health_check_timeout")]
    health_check_timeout: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    macros: IndexMap<String, String>,
    #[serde(default)]
    models: IndexMap<String, RawModelConfig>,
    #[serde(default)]
    groups: IndexMap<String, RawGroupConfig>,
    #[serde(default)]
    hooks: Hooks,
}

fn default_start_port() -> u16 {
    10000
}

fn default_health_check_timeout() -> String {
    "120s".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Fully validated, in-memory configuration. Constructed only through
/// [`GatewayConfig::load`] / [`GatewayConfig::from_str`], which enforce
/// every global invariant at load time — nothing downstream re-checks
/// alias uniqueness or group membership.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub start_port: u16,
    pub health_check_timeout: std::time::Duration,
    pub log_level: String,
    pub macros: IndexMap<String, String>,
    pub models: IndexMap<ModelId, ModelConfig>,
    pub groups: IndexMap<GroupId, GroupConfig>,
    pub preload: Vec<ModelId>,
    pub aliases: AliasIndex,
}

impl GatewayConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Self::from_str(&text)
    }

    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawGatewayConfig = serde_yaml::from_str(text)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawGatewayConfig) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();

        let health_check_timeout = crate::duration::parse_duration(&raw.health_check_timeout)
            .unwrap_or_else(|e| {
                errors.push(format!("healthCheckTimeout: {}", e));
                std::time::Duration::from_secs(120)
            });

        let mut models = IndexMap::new();
        for (key, raw_model) in raw.models {
            let id = ModelId::new(key.clone());
            let ttl = match raw_model.ttl.as_deref().map(crate::duration::parse_duration) {
                Some(Ok(d)) if d.is_zero() => None,
                Some(Ok(d)) => Some(d),
                Some(Err(e)) => {
                    errors.push(format!("models.{}.ttl: {}", key, e));
                    None
                }
                None => None,
            };
            models.insert(
                id.clone(),
                ModelConfig {
                    id,
                    cmd: raw_model.cmd,
                    proxy_url: raw_model.proxy_url,
                    env: raw_model.env,
                    aliases: raw_model.aliases,
                    use_model_name: raw_model.use_model_name,
                    ttl,
                    unlisted: raw_model.unlisted,
                    concurrency_limit: raw_model.concurrency_limit,
                    strip_params: raw_model.strip_params,
                    check_endpoint: raw_model.check_endpoint,
                },
            );
        }

        let mut groups = IndexMap::new();
        for (key, raw_group) in raw.groups {
            if raw_group.swap && raw_group.parallel {
                errors.push(format!("groups.{}: swap and parallel are mutually exclusive", key));
            }
            let members: indexmap::IndexSet<ModelId> =
                raw_group.members.iter().map(|m| ModelId::new(m.clone())).collect();
            for m in &members {
                if !models.contains_key(m) {
                    errors.push(format!("groups.{}: unknown member {}", key, m));
                }
            }
            let id = GroupId::new(key.clone());
            groups.insert(
                id.clone(),
                GroupConfig {
                    id,
                    members,
                    swap: raw_group.swap,
                    parallel: raw_group.parallel,
                    exclusive: raw_group.exclusive,
                    persistent: raw_group.persistent,
                },
            );
        }

        let alias_pairs: Vec<_> = models.iter().map(|(id, m)| (id, &m.aliases)).collect();
        let aliases = match AliasIndex::build(alias_pairs) {
            Ok(idx) => idx,
            Err(conflicts) => {
                errors.extend(conflicts);
                AliasIndex::default()
            }
        };

        let preload: Vec<ModelId> = raw
            .hooks
            .on_startup
            .preload
            .into_iter()
            .map(|id| {
                let id = ModelId::new(id);
                if !models.contains_key(&id) {
                    errors.push(format!("hooks.onStartup.preload: unknown model {}", id));
                }
                id
            })
            .collect();

        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }

        Ok(Self {
            start_port: raw.start_port,
            health_check_timeout,
            log_level: raw.log_level,
            macros: raw.macros,
            models,
            groups,
            preload,
            aliases,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
