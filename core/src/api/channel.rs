//! Channel lifecycle, membership and access-control lists.

use serde::{Deserialize, Serialize};

use crate::api::{get_list, post_ack};
use crate::context::Context;
use crate::dispatcher::{with_query, Dispatcher};
use crate::error::Result;
use crate::types::{opt_int_flag, Ack, ChannelType};

/// Identifies a channel: ids are only unique within a channel type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelKey {
    pub channel_id: String,
    pub channel_type: ChannelType,
}

impl ChannelKey {
    pub fn new(channel_id: impl Into<String>, channel_type: ChannelType) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_type,
        }
    }

    pub(crate) fn query(&self) -> [(&'static str, String); 2] {
        [
            ("channel_id", self.channel_id.clone()),
            ("channel_type", self.channel_type.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChannelRequest {
    pub channel_id: String,
    pub channel_type: ChannelType,
    /// Large groups skip per-member conversation bookkeeping.
    #[serde(default, with = "opt_int_flag", skip_serializing_if = "Option::is_none")]
    pub large: Option<bool>,
    #[serde(default, with = "opt_int_flag", skip_serializing_if = "Option::is_none")]
    pub ban: Option<bool>,
    #[serde(default)]
    pub subscribers: Vec<String>,
}

impl CreateChannelRequest {
    pub fn new(channel_id: impl Into<String>, channel_type: ChannelType) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_type,
            large: None,
            ban: None,
            subscribers: Vec::new(),
        }
    }

    pub fn with_subscribers<I, S>(mut self, subscribers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscribers = subscribers.into_iter().map(Into::into).collect();
        self
    }
}

/// Only the flags that are `Some` are changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateChannelInfoRequest {
    pub channel_id: String,
    pub channel_type: ChannelType,
    #[serde(default, with = "opt_int_flag", skip_serializing_if = "Option::is_none")]
    pub large: Option<bool>,
    #[serde(default, with = "opt_int_flag", skip_serializing_if = "Option::is_none")]
    pub ban: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSubscribersRequest {
    pub channel_id: String,
    pub channel_type: ChannelType,
    pub subscribers: Vec<String>,
    /// Replace the existing subscriber list instead of appending.
    #[serde(with = "crate::types::int_flag")]
    pub reset: bool,
    #[serde(with = "crate::types::int_flag")]
    pub temp_subscriber: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveSubscribersRequest {
    pub channel_id: String,
    pub channel_type: ChannelType,
    pub subscribers: Vec<String>,
    #[serde(with = "crate::types::int_flag")]
    pub temp_subscriber: bool,
}

/// Payload shared by the blacklist and whitelist endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelUidsRequest {
    pub channel_id: String,
    pub channel_type: ChannelType,
    pub uids: Vec<String>,
}

impl ChannelUidsRequest {
    pub fn new<I, S>(key: ChannelKey, uids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channel_id: key.channel_id,
            channel_type: key.channel_type,
            uids: uids.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTmpSubscribersRequest {
    pub channel_id: String,
    pub channel_type: ChannelType,
    pub subscribers: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelService<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> ChannelService<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn create(&self, ctx: &Context, req: &CreateChannelRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.create", "/channel", req)
    }

    pub fn update_info(&self, ctx: &Context, req: &UpdateChannelInfoRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.update_info", "/channel/info", req)
    }

    pub fn add_subscribers(&self, ctx: &Context, req: &AddSubscribersRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.add_subscribers", "/channel/subscriber_add", req)
    }

    pub fn remove_subscribers(&self, ctx: &Context, req: &RemoveSubscribersRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.remove_subscribers", "/channel/subscriber_remove", req)
    }

    pub fn delete(&self, ctx: &Context, key: &ChannelKey) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.delete", "/channel/delete", key)
    }

    pub fn add_blacklist(&self, ctx: &Context, req: &ChannelUidsRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.add_blacklist", "/channel/blacklist_add", req)
    }

    /// Replace the whole blacklist.
    pub fn set_blacklist(&self, ctx: &Context, req: &ChannelUidsRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.set_blacklist", "/channel/blacklist_set", req)
    }

    pub fn remove_blacklist(&self, ctx: &Context, req: &ChannelUidsRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.remove_blacklist", "/channel/blacklist_remove", req)
    }

    pub fn add_whitelist(&self, ctx: &Context, req: &ChannelUidsRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.add_whitelist", "/channel/whitelist_add", req)
    }

    /// Replace the whole whitelist.
    pub fn set_whitelist(&self, ctx: &Context, req: &ChannelUidsRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.set_whitelist", "/channel/whitelist_set", req)
    }

    pub fn remove_whitelist(&self, ctx: &Context, req: &ChannelUidsRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.remove_whitelist", "/channel/whitelist_remove", req)
    }

    pub fn whitelist(&self, ctx: &Context, key: &ChannelKey) -> Result<Vec<String>> {
        let path = with_query("/channel/whitelist", key.query());
        get_list(self.dispatcher, ctx, "channel.whitelist", &path)
    }

    pub fn set_tmp_subscribers(&self, ctx: &Context, req: &SetTmpSubscribersRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "channel.set_tmp_subscribers", "/channel/tmp_subscriber_set", req)
    }
}
