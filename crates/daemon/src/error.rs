// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the [`crate::manager::Manager`], translated to the
//! abstract [`GatewayFault`] taxonomy at the HTTP boundary.

use mg_core::GatewayFault;
use mg_engine::GroupError;
use mg_proxy::ProxyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("unknown model or alias: {0}")]
    UnknownModel(String),

    #[error("request body is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("request body is not valid multipart: {0}")]
    MalformedMultipart(String),

    #[error("request body missing required \"model\" field")]
    MissingModelField,

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

impl From<&ManagerError> for GatewayFault {
    fn from(e: &ManagerError) -> Self {
        match e {
            ManagerError::UnknownModel(_) => GatewayFault::ModelUnknown,
            ManagerError::MalformedJson(_) | ManagerError::MalformedMultipart(_) | ManagerError::MissingModelField | ManagerError::BodyRead(_) => {
                GatewayFault::BadRequest
            }
            ManagerError::Group(g) => g.into(),
            ManagerError::Proxy(p) => p.into(),
        }
    }
}
