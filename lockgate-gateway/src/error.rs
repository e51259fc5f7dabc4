//! Error types for the gateway crate.

use std::net::SocketAddr;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use lockgate_core::CoreError;
use lockgate_executor::ExecutorError;
use lockgate_overlay::OverlayError;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The lock tool failed; its captured output is the response body.
    #[error("executor error: {0}")]
    Executor(#[from] ExecutorError),

    /// The request body could not be decoded.
    #[error("invalid input: {0}")]
    InvalidRequest(String),

    /// The request decoded but a field failed validation.
    #[error(transparent)]
    Validation(#[from] CoreError),
}

impl GatewayError {
    /// Status code for this error.
    ///
    /// Executor failures are always 500 or 502, a timeout included.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Executor(ExecutorError::LaunchFailed { .. }) => StatusCode::BAD_GATEWAY,
            Self::Executor(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Executor(e) => {
                tracing::warn!(error = %e, %status, "lock tool invocation failed");
                e.into_diagnostic()
            }
            other => other.to_string().into_bytes(),
        };
        (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
    }
}

/// Errors that stop the server from starting or keep it from serving.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StartupError {
    /// The overlay network never came up.
    #[error("overlay network bootstrap failed: {0}")]
    Overlay(#[from] OverlayError),

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
