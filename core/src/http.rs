//! HTTP transport types and the pluggable `Transport` seam.
//!
//! # Design
//! Requests and responses are plain data. The `Dispatcher` builds an
//! `HttpRequest`, hands it to a `Transport` for the network round-trip, and
//! classifies the returned `HttpResponse`. Only `UreqTransport` touches the
//! network; everything else is deterministic and testable with a fake
//! transport.
//!
//! All fields use owned types (`String`, `Vec`) so requests can be recorded
//! and inspected after the fact.

use std::fmt;
use std::time::Duration;

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: the configured base URL joined with the endpoint path
/// and any pre-encoded query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one HTTP round-trip.
///
/// Non-2xx statuses must come back as `Ok(HttpResponse)`; `Err` is reserved
/// for failures where no response was obtained. `timeout` bounds the whole
/// call, from connect to the last body byte.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
///
/// The agent owns the connection pool; clones of the agent share it.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(default_timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(default_timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_timeout(apply_headers(self.agent.get(url), request), timeout).call(),
            (HttpMethod::Delete, _) => {
                with_timeout(apply_headers(self.agent.delete(url), request), timeout).call()
            }
            (HttpMethod::Post, Some(body)) => {
                with_timeout(apply_headers(self.agent.post(url), request), timeout).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_timeout(apply_headers(self.agent.post(url), request), timeout).send_empty()
            }
            (HttpMethod::Put, Some(body)) => {
                with_timeout(apply_headers(self.agent.put(url), request), timeout).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => {
                with_timeout(apply_headers(self.agent.put(url), request), timeout).send_empty()
            }
        };

        let mut response = result.map_err(map_ureq_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        // ureq caps bodies at 10 MiB by default; history and uid lists can exceed that.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(map_ureq_error)?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn apply_headers<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn with_timeout<B>(builder: ureq::RequestBuilder<B>, timeout: Duration) -> ureq::RequestBuilder<B> {
    builder.config().timeout_global(Some(timeout)).build()
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::TimedOut,
        other => TransportError::Io(Box::new(other)),
    }
}
