//! Batch dispatch: run many independent requests with bounded concurrency.
//!
//! This is the core of the crate. [`BatchExecutor::run`] drives every request
//! of a batch through the transport under a permit pool of `size` slots,
//! absorbing per-request failures into `None` result slots so one bad
//! endpoint never aborts its siblings. [`map`] is the blocking facade;
//! [`map_threaded`] runs the whole batch on a background worker and hands
//! back a [`CompletionHandle`] for non-blocking polling.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchConfig`] | Concurrency limit, timeout, content retention, callbacks |
//! | [`BatchExecutor`] | Bounded-concurrency dispatch over a [`Transport`](crate::transport::Transport) |
//! | [`CompletionHandle`] | Non-blocking completion query for a background batch |
//! | [`map`] / [`map_threaded`] | Blocking and background facades |

mod executor;
mod handle;

pub use executor::{BatchConfig, BatchExecutor, ErrorHandler, SuccessHandler};
pub use handle::{launch, map_threaded, BatchPoll, CompletionHandle, FinishedHandler};

use crate::{RequestSpec, Response, Result};

/// Execute a batch on the calling thread, blocking until every request has
/// settled. Returns one slot per request, in input order; failed requests
/// leave a `None` slot (and fire `on_error` if configured).
///
/// Builds a private runtime per call, so it must not be invoked from inside
/// an async context — async callers use [`BatchExecutor::run`] directly.
pub fn map(requests: Vec<RequestSpec>, config: BatchConfig) -> Result<Vec<Option<Response>>> {
    let executor = BatchExecutor::new(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(executor.run(requests)))
}
