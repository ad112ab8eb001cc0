//! Sending messages and reading channel history.
//!
//! Message bodies travel base64-encoded in the `payload` field;
//! `SendMessageRequest::new` and `Message::decode_payload` handle the
//! encoding so callers work with raw bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::api::channel::ChannelKey;
use crate::api::post_list;
use crate::context::Context;
use crate::dispatcher::{with_query, Dispatcher};
use crate::error::Result;
use crate::types::{int_flag, null_as_default, ChannelType, PullMode};

/// A fresh client message number: a dash-less UUIDv4.
pub fn new_client_msg_no() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Deliver but do not store.
    #[serde(with = "int_flag")]
    pub no_persist: bool,
    /// Count towards the receiver's unread badge.
    #[serde(with = "int_flag")]
    pub red_dot: bool,
    /// Deliver to one online device only.
    #[serde(with = "int_flag")]
    pub sync_once: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<MessageHeader>,
    pub client_msg_no: String,
    pub from_uid: String,
    pub channel_id: String,
    pub channel_type: ChannelType,
    /// Seconds until the message expires; 0 keeps it forever.
    #[serde(default)]
    pub expire: i64,
    /// Base64-encoded message body.
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_key: Option<String>,
}

impl SendMessageRequest {
    /// Request with a generated `client_msg_no` and `payload` base64-encoded.
    pub fn new(
        from_uid: impl Into<String>,
        channel_id: impl Into<String>,
        channel_type: ChannelType,
        payload: impl AsRef<[u8]>,
    ) -> Self {
        Self {
            header: None,
            client_msg_no: new_client_msg_no(),
            from_uid: from_uid.into(),
            channel_id: channel_id.into(),
            channel_type,
            expire: 0,
            payload: STANDARD.encode(payload),
            tag_key: None,
        }
    }

    pub fn with_header(mut self, header: MessageHeader) -> Self {
        self.header = Some(header);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub message_id: i64,
    #[serde(default)]
    pub message_seq: i64,
    #[serde(default)]
    pub client_msg_no: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub message_seq: i64,
    #[serde(default)]
    pub client_msg_no: String,
    #[serde(default)]
    pub from_uid: String,
    pub channel_id: String,
    pub channel_type: ChannelType,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub payload: String,
}

impl Message {
    pub fn decode_payload(&self) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSyncRequest {
    pub login_uid: String,
    pub channel_id: String,
    pub channel_type: ChannelType,
    pub start_message_seq: i64,
    /// 0 means no upper bound.
    pub end_message_seq: i64,
    pub limit: u32,
    pub pull_mode: PullMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxMessageSeqResponse {
    #[serde(default)]
    pub max_message_seq: i64,
}

/// Full-text search through the search plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSearchRequest {
    pub uid: String,
    /// Field-level match conditions, e.g. `{"content": "hello"}`.
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub payload_types: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<ChannelType>,
    pub limit: u32,
    pub page: u32,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSearchResult {
    pub message_id: i64,
    /// `message_id` as a string, for clients without 64-bit integers.
    #[serde(default)]
    pub message_idstr: String,
    #[serde(default)]
    pub message_seq: i64,
    #[serde(default)]
    pub client_msg_no: String,
    #[serde(default)]
    pub from_uid: String,
    pub channel_id: String,
    pub channel_type: ChannelType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSearchResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<UserSearchResult>,
}

#[derive(Serialize)]
struct MessageIds<'a> {
    message_ids: &'a [i64],
}

#[derive(Serialize)]
struct MessageIdRef {
    message_id: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct MessageService<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> MessageService<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn send(&self, ctx: &Context, req: &SendMessageRequest) -> Result<SendMessageResponse> {
        self.dispatcher.post(ctx, "message.send", "/message/send", req)
    }

    /// Results follow the backend's response order; partial failures are
    /// whatever the backend reports.
    pub fn send_batch(&self, ctx: &Context, messages: &[SendMessageRequest]) -> Result<Vec<SendMessageResponse>> {
        post_list(self.dispatcher, ctx, "message.send_batch", "/message/sendbatch", messages)
    }

    pub fn sync(&self, ctx: &Context, req: &MessageSyncRequest) -> Result<Vec<Message>> {
        post_list(self.dispatcher, ctx, "message.sync", "/channel/messagesync", req)
    }

    pub fn max_message_seq(&self, ctx: &Context, key: &ChannelKey) -> Result<MaxMessageSeqResponse> {
        let path = with_query("/channel/max_message_seq", key.query());
        self.dispatcher.get(ctx, "message.max_message_seq", &path)
    }

    pub fn search(&self, ctx: &Context, req: &UserSearchRequest) -> Result<UserSearchResponse> {
        self.dispatcher
            .post(ctx, "message.search", "/plugins/wk.plugin.search/usersearch", req)
    }

    pub fn get_batch(&self, ctx: &Context, message_ids: &[i64]) -> Result<Vec<Message>> {
        post_list(self.dispatcher, ctx, "message.get_batch", "/messages", &MessageIds { message_ids })
    }

    pub fn get(&self, ctx: &Context, message_id: i64) -> Result<Message> {
        self.dispatcher
            .post(ctx, "message.get", "/message", &MessageIdRef { message_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{body_json, client_with, RecordingTransport};

    #[test]
    fn new_request_encodes_payload_and_numbers_message() {
        let req = SendMessageRequest::new("u1", "g1", ChannelType::Group, br#"{"type":1,"content":"hi"}"#);
        assert_eq!(req.client_msg_no.len(), 32);
        assert!(!req.client_msg_no.contains('-'));
        assert_eq!(
            STANDARD.decode(&req.payload).unwrap(),
            br#"{"type":1,"content":"hi"}"#.to_vec()
        );
    }

    #[test]
    fn client_msg_nos_are_unique() {
        assert_ne!(new_client_msg_no(), new_client_msg_no());
    }

    #[test]
    fn send_omits_unset_header_and_tag() {
        let transport = RecordingTransport::replying(200, r#"{"message_id":1001,"message_seq":1,"client_msg_no":"c1"}"#);
        let client = client_with(&transport);
        let mut req = SendMessageRequest::new("u1", "g1", ChannelType::Group, "hi");
        req.client_msg_no = "c1".to_string();
        let resp = client.message().send(&Context::background(), &req).unwrap();
        assert_eq!(resp.message_id, 1001);

        let body = body_json(&transport.last());
        assert!(body.get("header").is_none());
        assert!(body.get("tag_key").is_none());
        assert_eq!(body["payload"], "aGk=");
    }

    #[test]
    fn send_includes_header_flags() {
        let transport = RecordingTransport::replying(200, "{}");
        let client = client_with(&transport);
        let req = SendMessageRequest::new("u1", "g1", ChannelType::Group, "hi").with_header(MessageHeader {
            no_persist: false,
            red_dot: true,
            sync_once: false,
        });
        client.message().send(&Context::background(), &req).unwrap();
        assert_eq!(
            body_json(&transport.last())["header"],
            serde_json::json!({"no_persist": 0, "red_dot": 1, "sync_once": 0})
        );
    }

    #[test]
    fn send_batch_posts_array() {
        let transport = RecordingTransport::replying(
            200,
            r#"[{"message_id":1,"message_seq":1,"client_msg_no":"a"},{"message_id":2,"message_seq":2,"client_msg_no":"b"}]"#,
        );
        let client = client_with(&transport);
        let messages = vec![
            SendMessageRequest::new("u1", "g1", ChannelType::Group, "a"),
            SendMessageRequest::new("u1", "g1", ChannelType::Group, "b"),
        ];
        let results = client.message().send_batch(&Context::background(), &messages).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].client_msg_no, "b");
        let body = body_json(&transport.last());
        assert_eq!(body.as_array().map(Vec::len), Some(2));
        assert_eq!(transport.last().url, "http://localhost:5001/message/sendbatch");
    }

    #[test]
    fn max_message_seq_sends_channel_in_query() {
        let transport = RecordingTransport::replying(200, r#"{"max_message_seq":42}"#);
        let client = client_with(&transport);
        let resp = client
            .message()
            .max_message_seq(&Context::background(), &ChannelKey::new("g1", ChannelType::Group))
            .unwrap();
        assert_eq!(resp.max_message_seq, 42);
        let sent = transport.last();
        assert_eq!(sent.method, HttpMethod::Get);
        assert_eq!(
            sent.url,
            "http://localhost:5001/channel/max_message_seq?channel_id=g1&channel_type=2"
        );
    }

    #[test]
    fn sync_sends_pull_mode_code() {
        let transport = RecordingTransport::replying(
            200,
            r#"[{"message_id":5,"message_seq":3,"client_msg_no":"c","from_uid":"u1","channel_id":"g1","channel_type":2,"timestamp":1,"payload":"aGk="}]"#,
        );
        let client = client_with(&transport);
        let req = MessageSyncRequest {
            login_uid: "u1".to_string(),
            channel_id: "g1".to_string(),
            channel_type: ChannelType::Group,
            start_message_seq: 0,
            end_message_seq: 0,
            limit: 20,
            pull_mode: PullMode::Up,
        };
        let messages = client.message().sync(&Context::background(), &req).unwrap();
        assert_eq!(messages[0].decode_payload().unwrap(), b"hi");
        assert_eq!(body_json(&transport.last())["pull_mode"], 1);
        assert_eq!(transport.last().url, "http://localhost:5001/channel/messagesync");
    }

    #[test]
    fn lookups_post_ids() {
        let transport = RecordingTransport::default();
        transport.push_reply(200, "[]");
        transport.push_reply(
            200,
            r#"{"message_id":7,"channel_id":"g1","channel_type":2}"#,
        );
        let client = client_with(&transport);
        let ctx = Context::background();
        assert!(client.message().get_batch(&ctx, &[7, 8]).unwrap().is_empty());
        let message = client.message().get(&ctx, 7).unwrap();
        assert_eq!(message.message_id, 7);

        let sent = transport.requests();
        assert_eq!(sent[0].url, "http://localhost:5001/messages");
        assert_eq!(body_json(&sent[0]), serde_json::json!({"message_ids": [7, 8]}));
        assert_eq!(sent[1].url, "http://localhost:5001/message");
        assert_eq!(body_json(&sent[1]), serde_json::json!({"message_id": 7}));
    }

    #[test]
    fn search_skips_unset_channel_type() {
        let transport = RecordingTransport::replying(
            200,
            r#"{"total":1,"limit":10,"page":1,"messages":[{"message_id":9,"message_idstr":"9","channel_id":"g1","channel_type":2,"payload":{"content":"hello"},"topic":"","timestamp":3}]}"#,
        );
        let client = client_with(&transport);
        let mut req = UserSearchRequest {
            uid: "u1".to_string(),
            limit: 10,
            page: 1,
            ..UserSearchRequest::default()
        };
        req.payload.insert("content".to_string(), serde_json::json!("hello"));
        let resp = client.message().search(&Context::background(), &req).unwrap();
        assert_eq!(resp.total, 1);
        assert_eq!(resp.messages[0].payload["content"], "hello");

        let sent = transport.last();
        assert_eq!(sent.url, "http://localhost:5001/plugins/wk.plugin.search/usersearch");
        assert!(body_json(&sent).get("channel_type").is_none());
    }
}
