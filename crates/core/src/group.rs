// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Group identity, configuration, and the swap/parallel/plain policy tag.

use crate::model::ModelId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for GroupId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Borrow<str> for GroupId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Which `ensureReady` algorithm a group runs, derived from `GroupConfig`'s
/// `swap`/`parallel` flags at load time rather than checked on every call.
///
/// Expressed as a tagged variant (not inheritance/trait objects) per the
/// design notes: the three policies share no behavior worth abstracting
/// behind a trait, only a dispatch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupPolicy {
    /// At most one member `Starting|Ready|Stopping` at a time; starting
    /// another stops the current first.
    Swap,
    /// All members may run concurrently; `ensureReady` only ever touches
    /// the named member.
    Parallel,
    /// Neither swap nor parallel semantics: members are started/stopped
    /// independently with no group-level coordination.
    Plain,
}

crate::simple_display! {
    GroupPolicy {
        Swap => "swap",
        Parallel => "parallel",
        Plain => "plain",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    pub id: GroupId,

    /// Model ids belonging to this group, in declared order.
    pub members: IndexSet<ModelId>,

    #[serde(default)]
    pub swap: bool,

    #[serde(default)]
    pub parallel: bool,

    /// When a member of this group starts, non-persistent sibling groups
    /// are stopped.
    #[serde(default)]
    pub exclusive: bool,

    /// This group is never stopped as a side effect of another group's
    /// exclusivity.
    #[serde(default)]
    pub persistent: bool,
}

impl GroupConfig {
    /// Derives the dispatch tag. `swap` wins ties; config validation
    /// already rejects `swap && parallel` before this is ever called.
    pub fn policy(&self) -> GroupPolicy {
        if self.swap {
            GroupPolicy::Swap
        } else if self.parallel {
            GroupPolicy::Parallel
        } else {
            GroupPolicy::Plain
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct GroupConfigBuilder => GroupConfig {
        into {
            id: GroupId = "test-group"
        }
        set {
            members: indexmap::IndexSet<ModelId> = indexmap::IndexSet::new(),
            swap: bool = false,
            parallel: bool = false,
            exclusive: bool = false,
            persistent: bool = false
        }
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
