//! Request specifications and their builders.
//!
//! A [`RequestSpec`] is an immutable description of one HTTP call. Specs are
//! created through [`request`] or the fixed-method conveniences ([`get`],
//! [`post`], ...), collected into a `Vec`, and handed to the batch layer.
//! Construction is pure: no I/O happens until the batch runs.

use crate::{Error, Result};
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

/// HTTP method for a [`RequestSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload. Raw bytes and structured JSON are mutually exclusive;
/// the builder enforces this at [`RequestBuilder::build`].
#[derive(Debug, Clone)]
pub enum Body {
    Raw(Bytes),
    Json(serde_json::Value),
}

/// Immutable description of one HTTP call.
///
/// Built once, consumed read-only by the executor, never mutated.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub params: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub proxy: Option<Url>,
    pub body: Option<Body>,
    /// Lowercase names of implicit default headers the transport must not add.
    pub skip_headers: Vec<String>,
}

impl std::fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Request [{} \"{}\"]>", self.method, self.url)
    }
}

/// Chainable builder for [`RequestSpec`]. Terminal [`build`](Self::build)
/// validates the URL, the proxy, and the body exclusivity rule.
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    url: String,
    params: Vec<(String, String)>,
    headers: HashMap<String, String>,
    proxy: Option<String>,
    data: Option<Bytes>,
    json: Option<Result<serde_json::Value>>,
    skip_headers: Vec<String>,
}

impl RequestBuilder {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Vec::new(),
            headers: HashMap::new(),
            proxy: None,
            data: None,
            json: None,
            skip_headers: Vec::new(),
        }
    }

    /// Append one query parameter. Parameters keep insertion order.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Route this request through a proxy. Supported schemes: http, https,
    /// socks4, socks5.
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy = Some(proxy_url.into());
        self
    }

    /// Raw request body. Mutually exclusive with [`json`](Self::json).
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// JSON request body. Serialized eagerly so a broken payload fails at
    /// build time rather than mid-batch. Mutually exclusive with
    /// [`data`](Self::data).
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.json = Some(
            serde_json::to_value(value)
                .map_err(|e| Error::invalid_request(format!("unserializable JSON body: {e}"))),
        );
        self
    }

    /// Exclude one of the transport's implicit default headers
    /// (`user-agent`, `accept`, `content-type`) from this request.
    pub fn skip_header(mut self, name: impl Into<String>) -> Self {
        self.skip_headers.push(name.into().to_ascii_lowercase());
        self
    }

    pub fn build(self) -> Result<RequestSpec> {
        if self.url.is_empty() {
            return Err(Error::invalid_request("empty URL"));
        }
        let url = Url::parse(&self.url)
            .map_err(|e| Error::invalid_request(format!("unparsable URL {:?}: {e}", self.url)))?;

        if self.data.is_some() && self.json.is_some() {
            return Err(Error::invalid_request(
                "data and json bodies are mutually exclusive",
            ));
        }
        let body = match (self.data, self.json) {
            (Some(raw), None) => Some(Body::Raw(raw)),
            (None, Some(json)) => Some(Body::Json(json?)),
            (None, None) => None,
            (Some(_), Some(_)) => unreachable!("checked above"),
        };

        let proxy = match self.proxy {
            Some(p) => Some(parse_proxy(&p)?),
            None => None,
        };

        let mut skip_headers = self.skip_headers;
        if body.is_none() {
            // Without a body there is nothing to describe; an invented
            // content-type (octet-stream and friends) confuses servers.
            if !skip_headers.iter().any(|h| h == "content-type") {
                skip_headers.push("content-type".to_string());
            }
        }

        Ok(RequestSpec {
            method: self.method,
            url,
            params: self.params,
            headers: self.headers,
            proxy,
            body,
            skip_headers,
        })
    }
}

fn parse_proxy(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::invalid_request(format!("unparsable proxy URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" | "socks4" | "socks5" => Ok(url),
        other => Err(Error::invalid_request(format!(
            "unsupported proxy scheme {other:?} (expected http, https, socks4 or socks5)"
        ))),
    }
}

/// Start building a request with an explicit method. All fixed-method
/// conveniences below forward here.
pub fn request(method: Method, url: impl Into<String>) -> RequestBuilder {
    RequestBuilder::new(method, url)
}

pub fn get(url: impl Into<String>) -> RequestBuilder {
    request(Method::Get, url)
}

pub fn post(url: impl Into<String>) -> RequestBuilder {
    request(Method::Post, url)
}

pub fn put(url: impl Into<String>) -> RequestBuilder {
    request(Method::Put, url)
}

pub fn patch(url: impl Into<String>) -> RequestBuilder {
    request(Method::Patch, url)
}

pub fn delete(url: impl Into<String>) -> RequestBuilder {
    request(Method::Delete, url)
}

pub fn head(url: impl Into<String>) -> RequestBuilder {
    request(Method::Head, url)
}

pub fn options(url: impl Into<String>) -> RequestBuilder {
    request(Method::Options, url)
}
