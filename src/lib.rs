//! # http-volley
//!
//! A client-side batch HTTP request engine: describe any number of
//! independent requests, execute them with bounded concurrency, and get one
//! result slot per request back — a failed or timed-out request leaves its
//! slot empty instead of aborting the batch.
//!
//! ## Overview
//!
//! - **Bounded dispatch**: at most `size` requests are in flight at any
//!   instant, enforced by a permit pool private to each run.
//! - **Failure isolation**: transport errors, timeouts and TLS failures are
//!   absorbed per request and routed to an optional `on_error` callback.
//! - **Input-order results**: slot `i` of the output always corresponds to
//!   request `i` of the input, however the requests actually completed.
//! - **Non-blocking mode**: [`map_threaded`] runs the batch on a background
//!   worker and returns a [`CompletionHandle`] to poll at leisure.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http_volley::{get, map, BatchConfig};
//!
//! fn main() -> http_volley::Result<()> {
//!     let requests = (0..10)
//!         .map(|i| get("https://example.com/item").param("i", i.to_string()).build())
//!         .collect::<http_volley::Result<Vec<_>>>()?;
//!
//!     let responses = map(requests, BatchConfig::new().with_size(4))?;
//!     for slot in responses.iter().flatten() {
//!         println!("{slot}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Async callers skip the blocking facade and drive
//! [`BatchExecutor::run`](batch::BatchExecutor::run) directly.
//!
//! ## Module organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`request`] | Request specifications and their builders |
//! | [`response`] | Completed-request results with lazy text/JSON views |
//! | [`batch`] | Bounded-concurrency dispatch, blocking and background facades |
//! | [`transport`] | The one-shot send boundary and its reqwest implementation |
//! | [`error`] | Unified error taxonomy |

pub mod batch;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use batch::{
    launch, map, map_threaded, BatchConfig, BatchExecutor, BatchPoll, CompletionHandle,
    ErrorHandler, FinishedHandler, SuccessHandler,
};
pub use error::Error;
pub use request::{delete, get, head, options, patch, post, put, request, Body, Method,
    RequestBuilder, RequestSpec};
pub use response::Response;
pub use transport::{HttpTransport, Transport, TransportError};

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, Error>;
