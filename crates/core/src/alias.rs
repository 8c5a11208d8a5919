// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alias → real id resolution, built once at config load.

use crate::model::ModelId;
use indexmap::IndexMap;

/// Maps any alias or real id back to the owning real [`ModelId`].
///
/// Built once by [`crate::config::GatewayConfig::load`] and checked on
/// every inbound request. Construction enforces the global invariant
/// that aliases never collide with a real id and are never reused.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    resolve: IndexMap<String, ModelId>,
}

impl AliasIndex {
    /// Builds the index from `(real_id, aliases)` pairs, returning every
    /// colliding name rather than stopping at the first.
    pub fn build<'a>(
        models: impl IntoIterator<Item = (&'a ModelId, &'a indexmap::IndexSet<String>)>,
    ) -> Result<Self, Vec<String>> {
        let mut resolve = IndexMap::new();
        let mut conflicts = Vec::new();

        let models: Vec<_> = models.into_iter().collect();
        for (id, _) in &models {
            if resolve.insert(id.as_str().to_string(), (*id).clone()).is_some() {
                conflicts.push(format!("duplicate model id: {}", id));
            }
        }
        for (id, aliases) in &models {
            for alias in aliases.iter() {
                if let Some(existing) = resolve.get(alias.as_str()) {
                    if existing != *id {
                        conflicts.push(format!(
                            "alias {:?} collides with existing id/alias for {}",
                            alias, existing
                        ));
                    }
                    continue;
                }
                resolve.insert(alias.clone(), (*id).clone());
            }
        }

        if conflicts.is_empty() {
            Ok(Self { resolve })
        } else {
            Err(conflicts)
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&ModelId> {
        self.resolve.get(name)
    }

    /// Finds the longest registered alias/id that is a path-segment
    /// prefix of `path`, returning `(real_id, remainder)`.
    ///
    /// `path` is split on `/`; candidates are matched against leading
    /// segment runs from longest to shortest so `"foo/bar"` beats
    /// `"foo"` when both are registered.
    pub fn longest_prefix_match(&self, path: &str) -> Option<(&ModelId, String)> {
        let trimmed = path.trim_start_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        for take in (1..=segments.len()).rev() {
            let candidate = segments[..take].join("/");
            if let Some(id) = self.resolve(&candidate) {
                return Some((id, segments[take..].join("/")));
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "alias_tests.rs"]
mod tests;
