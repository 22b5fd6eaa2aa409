//! Background batch runs and their completion handles.

use super::executor::{BatchConfig, BatchExecutor};
use crate::{RequestSpec, Response, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Invoked exactly once, on the worker, with the final result sequence.
pub type FinishedHandler = Box<dyn FnOnce(&[Option<Response>]) + Send>;

/// Snapshot of a background batch, as returned by [`CompletionHandle::poll`].
#[derive(Debug, Clone)]
pub enum BatchPoll {
    Running,
    Finished(Arc<Vec<Option<Response>>>),
}

impl BatchPoll {
    pub fn is_finished(&self) -> bool {
        matches!(self, BatchPoll::Finished(_))
    }

    /// The result slots, present only once finished.
    pub fn data(&self) -> Option<&[Option<Response>]> {
        match self {
            BatchPoll::Running => None,
            BatchPoll::Finished(data) => Some(data),
        }
    }
}

/// Caller-held handle to a batch running on a background worker.
///
/// The worker publishes the final result sequence exactly once; after that,
/// every [`poll`](Self::poll) returns the same immutable snapshot. Cloneable
/// and safe to poll from any number of threads concurrently.
#[derive(Clone)]
pub struct CompletionHandle {
    results: Arc<OnceCell<Arc<Vec<Option<Response>>>>>,
}

impl CompletionHandle {
    /// Non-blocking completion query. Never waits: [`BatchPoll::Running`]
    /// before the worker publishes, the final slots ever after.
    pub fn poll(&self) -> BatchPoll {
        match self.results.get() {
            Some(data) => BatchPoll::Finished(Arc::clone(data)),
            None => BatchPoll::Running,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.results.get().is_some()
    }
}

impl std::fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.is_finished() { "finished" } else { "running" };
        write!(f, "CompletionHandle [{state}]")
    }
}

/// Run `executor` over `requests` on a dedicated worker thread, returning a
/// [`CompletionHandle`] immediately.
///
/// The runtime and thread are created before dispatch, so a returned `Ok`
/// guarantees the handle will reach `Finished` no matter how many requests
/// fail: per-request errors are already absorbed into `None` slots by
/// [`BatchExecutor::run`].
pub fn launch(
    executor: BatchExecutor,
    requests: Vec<RequestSpec>,
    on_finished: Option<FinishedHandler>,
) -> Result<CompletionHandle> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let results = Arc::new(OnceCell::new());
    let publish = Arc::clone(&results);
    std::thread::Builder::new()
        .name("http-volley-batch".into())
        .spawn(move || {
            let data = Arc::new(runtime.block_on(executor.run(requests)));
            // Single writer: this thread owns the only publication.
            let _ = publish.set(Arc::clone(&data));
            if let Some(callback) = on_finished {
                callback(&data);
            }
        })?;

    Ok(CompletionHandle { results })
}

/// Background counterpart of [`map`](crate::batch::map): builds the executor
/// (failing fast on construction errors), launches the batch on a worker and
/// returns without waiting for any request.
pub fn map_threaded(
    requests: Vec<RequestSpec>,
    config: BatchConfig,
    on_finished: Option<FinishedHandler>,
) -> Result<CompletionHandle> {
    launch(BatchExecutor::new(config)?, requests, on_finished)
}
