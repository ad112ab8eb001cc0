//! Per-user conversation lists and unread counters.

use serde::{Deserialize, Serialize};

use crate::api::{post_ack, post_list};
use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::types::{null_as_default, Ack, ChannelType, OnlyUnreadMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSyncRequest {
    pub uid: String,
    /// Highest conversation version the caller already has; 0 syncs everything.
    pub version: i64,
    /// `channel_id:channel_type:last_msg_seq` triples joined by `|`.
    pub last_msg_seqs: String,
    /// Recent messages to include per conversation.
    pub msg_count: u32,
    pub only_unread: OnlyUnreadMode,
    #[serde(default)]
    pub exclude_channel_types: Vec<ChannelType>,
}

impl ConversationSyncRequest {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            version: 0,
            last_msg_seqs: String::new(),
            msg_count: 0,
            only_unread: OnlyUnreadMode::All,
            exclude_channel_types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentMessage {
    #[serde(default)]
    pub message_id: i64,
    #[serde(default)]
    pub message_seq: i64,
    #[serde(default)]
    pub client_msg_no: String,
    #[serde(default)]
    pub from_uid: String,
    #[serde(default)]
    pub timestamp: i64,
    /// Base64-encoded message body.
    #[serde(default)]
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub channel_id: String,
    pub channel_type: ChannelType,
    #[serde(default)]
    pub unread: i64,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub last_msg_seq: i64,
    #[serde(default)]
    pub version: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recents: Vec<RecentMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearUnreadRequest {
    pub uid: String,
    pub channel_id: String,
    pub channel_type: ChannelType,
    /// Sequence the user has read up to; 0 clears everything.
    pub message_seq: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetUnreadRequest {
    pub uid: String,
    pub channel_id: String,
    pub channel_type: ChannelType,
    pub unread: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConversationRequest {
    pub uid: String,
    pub channel_id: String,
    pub channel_type: ChannelType,
}

#[derive(Debug, Clone, Copy)]
pub struct ConversationService<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> ConversationService<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn sync(&self, ctx: &Context, req: &ConversationSyncRequest) -> Result<Vec<Conversation>> {
        post_list(self.dispatcher, ctx, "conversation.sync", "/conversation/sync", req)
    }

    pub fn clear_unread(&self, ctx: &Context, req: &ClearUnreadRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "conversation.clear_unread", "/conversations/clearUnread", req)
    }

    pub fn set_unread(&self, ctx: &Context, req: &SetUnreadRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "conversation.set_unread", "/conversations/setUnread", req)
    }

    pub fn delete(&self, ctx: &Context, req: &DeleteConversationRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "conversation.delete", "/conversations/delete", req)
    }
}
