use super::{Transport, TransportError};
use crate::request::{Body, Method, RequestSpec};
use crate::{Error, Response, Result};
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Proxy;
use std::collections::HashMap;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("http-volley/", env!("CARGO_PKG_VERSION"));

/// Production [`Transport`] over a shared reqwest client.
///
/// One `HttpTransport` is built per batch run; the underlying client is
/// shared by every request in that batch. Requests carrying a proxy get a
/// dedicated client, since reqwest proxies are client-level.
pub struct HttpTransport {
    client: reqwest::Client,
    verify_ssl: bool,
}

impl HttpTransport {
    /// Build the transport. `verify_ssl=false` disables certificate
    /// validation for every request sent through it — use only against
    /// endpoints you control.
    pub fn new(verify_ssl: bool) -> Result<Self> {
        let client = Self::builder(verify_ssl)
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;
        Ok(Self { client, verify_ssl })
    }

    fn builder(verify_ssl: bool) -> reqwest::ClientBuilder {
        reqwest::Client::builder().danger_accept_invalid_certs(!verify_ssl)
    }

    fn proxied_client(&self, proxy: &Url) -> Result<reqwest::Client> {
        let proxy = Proxy::all(proxy.as_str()).map_err(TransportError::Http)?;
        Self::builder(self.verify_ssl)
            .proxy(proxy)
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, spec: &RequestSpec, include_content: bool) -> Result<Response> {
        let client = match &spec.proxy {
            Some(proxy) => self.proxied_client(proxy)?,
            None => self.client.clone(),
        };

        let mut req = client.request(reqwest_method(spec.method), spec.url.clone());
        if !spec.params.is_empty() {
            req = req.query(&spec.params);
        }

        // Implicit defaults, suppressed per the spec's skip list or by an
        // explicit header of the same name.
        if wants_default(spec, "user-agent") {
            req = req.header(USER_AGENT, DEFAULT_USER_AGENT);
        }
        if wants_default(spec, "accept") {
            req = req.header(ACCEPT, "*/*");
        }
        for (name, value) in &spec.headers {
            req = req.header(name, value);
        }

        match &spec.body {
            Some(Body::Raw(bytes)) => req = req.body(bytes.clone()),
            Some(Body::Json(value)) => {
                let payload = serde_json::to_vec(value)
                    .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;
                req = req.body(payload);
                if wants_default(spec, "content-type") {
                    req = req.header(CONTENT_TYPE, "application/json");
                }
            }
            None => {}
        }

        let resp = req.send().await.map_err(classify)?;
        let status = resp.status().as_u16();
        let headers = header_map(resp.headers());
        let body = if include_content {
            Some(resp.bytes().await.map_err(classify)?)
        } else {
            None
        };

        Ok(Response::new(status, spec.url.as_str(), headers, body))
    }
}

fn wants_default(spec: &RequestSpec, name: &str) -> bool {
    !spec.skip_headers.iter().any(|h| h == name)
        && !spec.headers.keys().any(|h| h.eq_ignore_ascii_case(name))
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Map a reqwest failure into the crate taxonomy. Certificate failures are
/// surfaced as their own class; rustls reports them deep in the source chain.
fn classify(err: reqwest::Error) -> Error {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(e) = source {
        let msg = e.to_string();
        if msg.contains("certificate") || msg.contains("CertificateError") {
            return Error::TlsVerification(msg);
        }
        source = e.source();
    }
    Error::Transport(TransportError::Http(err))
}
