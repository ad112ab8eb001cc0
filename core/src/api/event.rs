//! Streaming events attached to a message (typing, AI token streams, ...).

use serde::{Deserialize, Serialize};

use crate::api::post_ack;
use crate::context::Context;
use crate::dispatcher::{with_query, Dispatcher};
use crate::error::Result;
use crate::types::{Ack, ChannelType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSendRequest {
    pub client_msg_no: String,
    pub channel_id: String,
    pub channel_type: ChannelType,
    pub from_uid: String,
    pub event: EventPayload,
    /// Sent as the `force_end` query parameter, never in the body.
    #[serde(skip)]
    pub force_end: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub struct EventService<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> EventService<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn send(&self, ctx: &Context, req: &EventSendRequest) -> Result<Ack> {
        let path = with_query(
            "/event",
            req.force_end
                .map(|force| ("force_end", u8::from(force).to_string())),
        );
        post_ack(self.dispatcher, ctx, "event.send", &path, req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{body_json, client_with, RecordingTransport};

    fn request(force_end: Option<bool>) -> EventSendRequest {
        EventSendRequest {
            client_msg_no: "c1".to_string(),
            channel_id: "g1".to_string(),
            channel_type: ChannelType::Group,
            from_uid: "bot".to_string(),
            event: EventPayload {
                event_type: "stream.delta".to_string(),
                data: serde_json::json!({"text": "hel"}),
            },
            force_end,
        }
    }

    #[test]
    fn unset_force_end_is_absent() {
        let transport = RecordingTransport::replying(200, "");
        let client = client_with(&transport);
        client.event().send(&Context::background(), &request(None)).unwrap();
        let sent = transport.last();
        assert_eq!(sent.url, "http://localhost:5001/event");
        let body = body_json(&sent);
        assert!(body.get("force_end").is_none());
        assert_eq!(body["event"]["type"], "stream.delta");
    }

    #[test]
    fn force_end_goes_in_query() {
        let transport = RecordingTransport::replying(200, "");
        let client = client_with(&transport);
        client.event().send(&Context::background(), &request(Some(true))).unwrap();
        let sent = transport.last();
        assert_eq!(sent.url, "http://localhost:5001/event?force_end=1");
        assert!(body_json(&sent).get("force_end").is_none());
    }
}
