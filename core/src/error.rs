//! Error types for the WuKongIM client.
//!
//! # Design
//! Failures split into two kinds that callers can tell apart:
//! - transport failures (`Transport`, `Decode`): no usable answer came back;
//! - backend failures (`Backend`, `Status`): the service answered with a
//!   non-2xx status. `Backend` carries the service's own message and status
//!   code; `Status` is the fallback when the body did not describe the error.
//!
//! Every variant except `InvalidConfig` records the operation name
//! (`"channel.create"`, `"system.health"`, ...) for traceability.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An application-level failure reported by the WuKongIM backend.
///
/// Decoded from bodies like `{"msg": "channel_id must not be empty", "status": 400}`.
/// Older and newer backend builds disagree on whether the text lives under
/// `msg` or `message`; the first non-empty of the two wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawBackendError")]
pub struct BackendError {
    pub message: String,
    pub status: i64,
}

#[derive(Deserialize)]
struct RawBackendError {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<i64>,
}

impl From<RawBackendError> for BackendError {
    fn from(raw: RawBackendError) -> Self {
        let message = [raw.msg, raw.message]
            .into_iter()
            .flatten()
            .find(|m| !m.is_empty())
            .unwrap_or_default();
        BackendError {
            message,
            status: raw.status.unwrap_or_default(),
        }
    }
}

impl BackendError {
    pub fn new(message: impl Into<String>, status: i64) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// Whether the body actually described an error. An all-default value
    /// means the backend sent something that merely parsed, like `{}`.
    pub fn is_populated(&self) -> bool {
        !self.message.is_empty() || self.status != 0
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str("wukongim api error")
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for BackendError {}

/// Failure to obtain any HTTP response.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The caller's deadline had already passed; nothing was sent.
    #[error("deadline exceeded before the request was sent")]
    DeadlineExceeded,

    /// The caller cancelled the context.
    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out")]
    TimedOut,

    #[error("{0}")]
    Io(#[source] BoxError),
}

/// Errors returned by every client operation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{op}: {error}")]
    Backend {
        op: &'static str,
        #[source]
        error: BackendError,
    },

    #[error("{op}: unexpected status code: {status}")]
    Status {
        op: &'static str,
        status: u16,
        body: String,
    },

    #[error("{op}: transport error: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("{op}: failed to decode response: {source}")]
    Decode {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{op}: failed to encode request: {source}")]
    Encode {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// The backend-reported error, if the service described the failure.
    pub fn backend(&self) -> Option<&BackendError> {
        match self {
            Error::Backend { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Backend status when available, otherwise the raw HTTP status.
    pub fn status_code(&self) -> Option<i64> {
        match self {
            Error::Backend { error, .. } => Some(error.status),
            Error::Status { status, .. } => Some(i64::from(*status)),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Decode { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Transport {
                source: TransportError::TimedOut | TransportError::DeadlineExceeded,
                ..
            }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Error::Transport {
                source: TransportError::Cancelled,
                ..
            }
        )
    }

    pub fn op(&self) -> Option<&'static str> {
        match self {
            Error::Backend { op, .. }
            | Error::Status { op, .. }
            | Error::Transport { op, .. }
            | Error::Decode { op, .. }
            | Error::Encode { op, .. } => Some(*op),
            Error::InvalidConfig(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msg_key_is_preferred() {
        let err: BackendError =
            serde_json::from_str(r#"{"msg":"channel already exists","message":"other","status":400}"#).unwrap();
        assert_eq!(err, BackendError::new("channel already exists", 400));
    }

    #[test]
    fn message_key_is_used_when_msg_is_empty() {
        let err: BackendError = serde_json::from_str(r#"{"msg":"","message":"invalid credentials","status":401}"#).unwrap();
        assert_eq!(err.message, "invalid credentials");
        assert_eq!(err.status, 401);
    }

    #[test]
    fn empty_object_is_not_populated() {
        let err: BackendError = serde_json::from_str("{}").unwrap();
        assert!(!err.is_populated());
        assert_eq!(err.to_string(), "wukongim api error");
    }

    #[test]
    fn status_alone_counts_as_populated() {
        let err: BackendError = serde_json::from_str(r#"{"status":500}"#).unwrap();
        assert!(err.is_populated());
    }

    #[test]
    fn null_fields_are_tolerated() {
        let err: BackendError = serde_json::from_str(r#"{"msg":null,"message":"boom","status":null}"#).unwrap();
        assert_eq!(err, BackendError::new("boom", 0));
    }

    #[test]
    fn backend_error_is_extractable() {
        let err = Error::Backend {
            op: "channel.create",
            error: BackendError::new("channel already exists", 400),
        };
        assert_eq!(err.backend().map(|e| e.status), Some(400));
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.op(), Some("channel.create"));
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "channel.create: channel already exists");
    }

    #[test]
    fn status_error_mentions_code() {
        let err = Error::Status {
            op: "system.health",
            status: 503,
            body: String::new(),
        };
        assert!(err.backend().is_none());
        assert_eq!(err.status_code(), Some(503));
        assert!(err.to_string().contains("unexpected status code: 503"));
    }

    #[test]
    fn timeouts_are_transport_errors() {
        let err = Error::Transport {
            op: "system.health",
            source: TransportError::DeadlineExceeded,
        };
        assert!(err.is_transport());
        assert!(err.is_timeout());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn cancellation_is_transport_but_not_timeout() {
        let err = Error::Transport {
            op: "message.sync",
            source: TransportError::Cancelled,
        };
        assert!(err.is_transport());
        assert!(err.is_cancelled());
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "message.sync: transport error: request cancelled");
    }
}
