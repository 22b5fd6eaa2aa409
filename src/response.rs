//! Completed-request results.

use crate::{Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashMap;

/// Immutable result of one completed HTTP call.
///
/// The raw body is retained only when the batch ran with `include_content`;
/// [`text`](Self::text) and [`json`](Self::json) are derived from it on
/// demand, so decode failures surface at the accessor, not at construction.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// URL the originating request was built with, kept for traceability.
    pub url: String,
    /// Raw body bytes, present only when content retention was requested.
    pub body: Option<Bytes>,
    pub headers: HashMap<String, String>,
}

impl Response {
    pub fn new(
        status: u16,
        url: impl Into<String>,
        headers: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Self {
        Self {
            status,
            url: url.into(),
            body,
            headers,
        }
    }

    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// UTF-8 view of the body. Invalid sequences are replaced rather than
    /// rejected; use [`json`](Self::json) when strictness matters.
    /// `None` when the batch ran without content retention.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.body.as_ref().map(|b| String::from_utf8_lossy(b))
    }

    /// Parse the body as JSON into `T`.
    ///
    /// Fails with [`Error::Decode`] when the body was not retained or is not
    /// valid JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| Error::decode("no body retained (include_content was false)"))?;
        serde_json::from_slice(body).map_err(|e| Error::decode(format!("invalid JSON body: {e}")))
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Response {} [\"{}\"]>", self.status, self.url)
    }
}
