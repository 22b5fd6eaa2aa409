//! Transport boundary: "send one request, get back a response or an error".
//!
//! The batch layer only ever talks to the [`Transport`] trait; the reqwest
//! implementation lives in [`http`]. Tests inject fake transports through the
//! same seam.

mod http;

pub use http::HttpTransport;

use crate::{RequestSpec, Response, Result};

/// One-shot HTTP send capability consumed by the batch executor.
///
/// Implementations perform exactly one request and must not retry. The
/// per-request deadline is enforced by the executor around `send`, so
/// implementations need no timeout handling of their own.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Perform `spec` once. Body bytes are fetched and retained only when
    /// `include_content` is set.
    async fn send(&self, spec: &RequestSpec, include_content: bool) -> Result<Response>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Other(String),
}
