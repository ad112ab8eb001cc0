//! Request dispatch and error normalization shared by every endpoint.
//!
//! # Design
//! Each call is split the same way:
//! 1. `build_request` turns a verb, a path and an optional payload into an
//!    `HttpRequest` (absolute URL, JSON body, auth header).
//! 2. The `Transport` performs the round-trip under a timeout capped by the
//!    caller's `Context`.
//! 3. `parse_response` classifies the `HttpResponse`: a non-2xx status becomes
//!    `Error::Backend` when the body describes the failure and `Error::Status`
//!    otherwise; a 2xx body is decoded into the caller's type.
//!
//! Steps 1 and 3 are pure, so they are tested without a network. The
//! dispatcher holds no mutable state and is shared freely across threads.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::{BackendError, Error, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};

pub struct Dispatcher {
    base_url: String,
    auth_header: Option<String>,
    timeout: Duration,
    debug: bool,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.auth_header.is_some())
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Dispatcher backed by the default `ureq` transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = UreqTransport::new(config.effective_timeout());
        Self::with_transport(config, transport)
    }

    pub fn with_transport<T>(config: ClientConfig, transport: T) -> Result<Self>
    where
        T: Transport + 'static,
    {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::InvalidConfig("base_url is required".to_string()));
        }
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| Error::InvalidConfig(format!("base_url {base_url:?} is not a valid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "base_url scheme must be http or https, got {:?}",
                parsed.scheme()
            )));
        }

        let auth_header = config
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {t}"));

        Ok(Self {
            base_url,
            auth_header,
            timeout: config.effective_timeout(),
            debug: config.debug,
            transport: Box::new(transport),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URLs pass through untouched; anything else is joined to the
    /// base URL.
    fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub fn build_request<B>(
        &self,
        op: &'static str,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = Vec::new();
        let body = match body {
            Some(payload) => {
                let json = serde_json::to_string(payload).map_err(|source| Error::Encode { op, source })?;
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(json)
            }
            None => None,
        };
        if let Some(auth) = &self.auth_header {
            headers.push(("authorization".to_string(), auth.clone()));
        }

        Ok(HttpRequest {
            method,
            url: self.resolve(path),
            headers,
            body,
        })
    }

    pub fn parse_response<T>(&self, op: &'static str, response: HttpResponse) -> Result<T>
    where
        T: DeserializeOwned,
    {
        check_status(op, &response)?;
        decode_body(op, &response.body)
    }

    pub fn execute<B, T>(
        &self,
        ctx: &Context,
        op: &'static str,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(op, method, path, body)?;

        if ctx.is_cancelled() {
            debug!("[wukongim] {op}: context cancelled, not sending {method} {}", request.url);
            return Err(Error::Transport {
                op,
                source: TransportError::Cancelled,
            });
        }
        if ctx.is_expired() {
            debug!("[wukongim] {op}: deadline already exceeded, not sending {method} {}", request.url);
            return Err(Error::Transport {
                op,
                source: TransportError::DeadlineExceeded,
            });
        }
        let timeout = ctx.cap(self.timeout);

        if self.debug {
            debug!(
                "[wukongim] {op} -> {method} {} timeout={timeout:?} body={}",
                request.url,
                loggable(op, request.body.as_deref().unwrap_or(""))
            );
        }

        let response = self
            .transport
            .send(&request, timeout)
            .map_err(|source| {
                debug!("[wukongim] {op}: transport failure: {source}");
                Error::Transport { op, source }
            })?;

        if ctx.is_cancelled() {
            debug!("[wukongim] {op}: context cancelled, dropping {} response", response.status);
            return Err(Error::Transport {
                op,
                source: TransportError::Cancelled,
            });
        }

        if self.debug {
            debug!("[wukongim] {op} <- {} body={}", response.status, loggable(op, &response.body));
        }

        self.parse_response(op, response)
    }

    pub fn get<T>(&self, ctx: &Context, op: &'static str, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute::<(), T>(ctx, op, HttpMethod::Get, path, None)
    }

    pub fn post<B, T>(&self, ctx: &Context, op: &'static str, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ctx, op, HttpMethod::Post, path, Some(body))
    }
}

/// Operations whose bodies carry credentials.
const REDACTED_OPS: &[&str] = &["manager.login"];

/// Body text safe to put in a debug log.
fn loggable<'a>(op: &str, body: &'a str) -> Cow<'a, str> {
    if REDACTED_OPS.contains(&op) && !body.is_empty() {
        Cow::Owned(format!("<redacted {} bytes>", body.len()))
    } else {
        Cow::Borrowed(body)
    }
}

/// Map a non-2xx response to `Backend` when the body describes the error,
/// else to `Status` with the raw code.
fn check_status(op: &'static str, response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    match serde_json::from_str::<BackendError>(&response.body) {
        Ok(error) if error.is_populated() => {
            debug!("[wukongim] {op}: backend error {} ({})", error.status, error.message);
            Err(Error::Backend { op, error })
        }
        _ => {
            debug!("[wukongim] {op}: unexpected status code {}", response.status);
            Err(Error::Status {
                op,
                status: response.status,
                body: response.body.clone(),
            })
        }
    }
}

fn decode_body<T>(op: &'static str, body: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|source| Error::Decode { op, source })
}

/// Append form-encoded query parameters to `path`.
pub fn with_query<'a, I>(path: &str, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, &value);
    }
    let query = serializer.finish();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}
