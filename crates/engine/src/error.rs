// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the process supervisor and group scheduler.

use mg_core::GatewayFault;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to expand command template: {0}")]
    BadCommand(#[from] mg_cmdline::SplitError),

    #[error("failed to spawn child process: {0}")]
    SpawnFailed(std::io::Error),

    #[error("process did not become ready within the health check timeout")]
    ReadinessTimeout,

    #[error("process is shut down and cannot be restarted")]
    AlreadyShutdown,

    #[error("permit acquisition was cancelled")]
    PermitCancelled,
}

impl From<&ProcessError> for GatewayFault {
    fn from(e: &ProcessError) -> Self {
        match e {
            ProcessError::SpawnFailed(_) | ProcessError::BadCommand(_) => GatewayFault::SpawnFailed,
            ProcessError::ReadinessTimeout => GatewayFault::ReadinessTimeout,
            ProcessError::AlreadyShutdown => GatewayFault::Internal,
            ProcessError::PermitCancelled => GatewayFault::PermitCancelled,
        }
    }
}

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("model {0} is not a member of this group")]
    UnknownMember(String),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl From<&GroupError> for GatewayFault {
    fn from(e: &GroupError) -> Self {
        match e {
            GroupError::UnknownMember(_) => GatewayFault::ModelUnknown,
            GroupError::Process(p) => p.into(),
        }
    }
}
