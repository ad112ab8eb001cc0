//! In-process transport used by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Transport};

pub const BASE_URL: &str = "http://localhost:5001";

/// Records every request and answers from a queue of canned responses.
/// The last canned response repeats once the queue is down to one.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<(HttpRequest, Duration)>>>,
    replies: Arc<Mutex<VecDeque<(u16, String)>>>,
}

impl RecordingTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        let transport = Self::default();
        transport.push_reply(status, body);
        transport
    }

    pub fn push_reply(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back((status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.requests.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests().pop().expect("no request recorded")
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push((request.clone(), timeout));
        let mut replies = self.replies.lock().unwrap();
        let (status, body) = if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap_or((200, String::new()))
        };
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

pub fn client_with(transport: &RecordingTransport) -> Client {
    Client::with_transport(ClientConfig::new(BASE_URL), transport.clone()).unwrap()
}

pub fn body_json(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_str(request.body.as_deref().expect("request has no body")).unwrap()
}
