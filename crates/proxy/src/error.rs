// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use mg_core::GatewayFault;
use mg_engine::{GroupError, ProcessError};
use thiserror::Error;

/// Failures that can occur while forwarding a single request.
///
/// `ProxyError::Upstream` is reachable both before and after response
/// headers have flown; the caller is responsible for only translating
/// it into a JSON body in the pre-header case (see `forward`'s doc
/// comment) since a body written mid-stream would corrupt the
/// connection.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("request body is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("request body is not valid multipart: {0}")]
    MalformedMultipart(String),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("failed to build upstream response: {0}")]
    ResponseBuild(String),
}

impl From<&ProxyError> for GatewayFault {
    fn from(e: &ProxyError) -> Self {
        match e {
            ProxyError::BodyRead(_) | ProxyError::MalformedJson(_) | ProxyError::MalformedMultipart(_) => GatewayFault::BadRequest,
            ProxyError::Group(g) => g.into(),
            ProxyError::Process(p) => p.into(),
            ProxyError::Upstream(_) => GatewayFault::UpstreamUnavailable,
            ProxyError::ResponseBuild(_) => GatewayFault::Internal,
        }
    }
}
