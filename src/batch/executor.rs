//! Bounded-concurrency batch execution.

use crate::transport::{HttpTransport, Transport};
use crate::{Error, RequestSpec, Response, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Invoked synchronously with each successful response, before its slot is
/// recorded.
pub type SuccessHandler = Arc<dyn Fn(&Response) + Send + Sync>;
/// Invoked synchronously with each absorbed failure and its originating spec.
pub type ErrorHandler = Arc<dyn Fn(&Error, &RequestSpec) + Send + Sync>;

/// Configuration for one batch run.
pub struct BatchConfig {
    /// Maximum requests in flight at any instant. Clamped to at least 1.
    pub size: usize,
    /// Per-request deadline. Exceeding it fails that request only.
    pub timeout: Option<Duration>,
    /// Retain response body bytes on each [`Response`].
    pub include_content: bool,
    /// Certificate validation for every request in the batch. Disabling it
    /// is security-relevant; keep it on outside of controlled environments.
    pub verify_ssl: bool,
    pub(crate) on_success: Option<SuccessHandler>,
    pub(crate) on_error: Option<ErrorHandler>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: 10,
            timeout: None,
            include_content: true,
            verify_ssl: true,
            on_success: None,
            on_error: None,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn with_include_content(mut self, include: bool) -> Self {
        self.include_content = include;
        self
    }
    pub fn with_verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }
    /// Callbacks run on whichever execution context completes the request;
    /// keep them fast, they directly delay result aggregation.
    pub fn on_success(mut self, handler: impl Fn(&Response) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(handler));
        self
    }
    pub fn on_error(
        mut self,
        handler: impl Fn(&Error, &RequestSpec) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(handler));
        self
    }
}

impl std::fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchConfig")
            .field("size", &self.size)
            .field("timeout", &self.timeout)
            .field("include_content", &self.include_content)
            .field("verify_ssl", &self.verify_ssl)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Dispatches one batch of requests through a [`Transport`] with bounded
/// parallelism and per-request failure isolation.
pub struct BatchExecutor {
    transport: Arc<dyn Transport>,
    config: BatchConfig,
}

impl BatchExecutor {
    /// Build an executor over the production HTTP transport. Fails fast when
    /// the underlying client cannot be constructed.
    pub fn new(config: BatchConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config.verify_ssl)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Build an executor over an injected transport.
    pub fn with_transport(config: BatchConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run the whole batch, returning exactly one slot per request in input
    /// order. A slot is `None` when its request failed or timed out; the
    /// failure was already delivered to `on_error`. Returns only after every
    /// request has settled.
    pub async fn run(&self, requests: Vec<RequestSpec>) -> Vec<Option<Response>> {
        let n = requests.len();
        if n == 0 {
            return Vec::new();
        }

        // Permit pool, private to this run. Acquired before the transport
        // call, released on drop whatever the outcome.
        let permits = Arc::new(Semaphore::new(self.config.size.max(1)));

        let futs = requests.into_iter().enumerate().map(|(idx, spec)| {
            let permits = Arc::clone(&permits);
            async move {
                // The pool is never closed while futures hold a clone.
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (idx, None),
                };
                tracing::debug!(url = %spec.url, method = %spec.method, "dispatching");
                match self.dispatch(&spec).await {
                    Ok(resp) => {
                        tracing::debug!(url = %spec.url, status = resp.status, "request settled");
                        if let Some(handler) = &self.config.on_success {
                            handler(&resp);
                        }
                        (idx, Some(resp))
                    }
                    Err(err) => {
                        tracing::warn!(url = %spec.url, error = %err, "request failed");
                        if let Some(handler) = &self.config.on_error {
                            handler(&err, &spec);
                        }
                        (idx, None)
                    }
                }
            }
        });

        let mut slots: Vec<Option<Response>> = (0..n).map(|_| None).collect();
        for (idx, slot) in futures::future::join_all(futs).await {
            slots[idx] = slot;
        }
        slots
    }

    async fn dispatch(&self, spec: &RequestSpec) -> Result<Response> {
        let send = self.transport.send(spec, self.config.include_content);
        match self.config.timeout {
            Some(deadline) => match tokio::time::timeout(deadline, send).await {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::Timeout(deadline)),
            },
            None => send.await,
        }
    }
}
