use crate::transport::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Unified error type for the batch engine.
///
/// Construction-time errors (`InvalidRequest`, `Io`) surface immediately to
/// the caller. Execution errors (`Transport`, `Timeout`, `TlsVerification`)
/// are absorbed per request inside [`BatchExecutor::run`] and routed to the
/// `on_error` callback; they never propagate out of a batch. `Decode` is
/// raised lazily, only when a response accessor is invoked.
///
/// [`BatchExecutor::run`]: crate::batch::BatchExecutor::run
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("TLS certificate verification failed: {0}")]
    TlsVerification(String),

    #[error("response decode error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Error::InvalidRequest(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// Whether this error was produced by the per-request deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}
