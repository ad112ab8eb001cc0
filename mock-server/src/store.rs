//! In-memory backend state.

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const PERSON: u8 = 1;

pub type ChannelId = (String, u8);

#[derive(Debug, Default, Clone)]
pub struct Channel {
    pub large: bool,
    pub ban: bool,
    pub subscribers: BTreeSet<String>,
    pub temp_subscribers: BTreeSet<String>,
    pub blacklist: BTreeSet<String>,
    pub whitelist: BTreeSet<String>,
    pub max_seq: i64,
}

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub message_id: i64,
    pub message_seq: i64,
    pub client_msg_no: String,
    pub from_uid: String,
    pub channel_id: String,
    pub channel_type: u8,
    pub timestamp: i64,
    pub payload: String,
}

#[derive(Debug, Default, Clone)]
pub struct ConversationState {
    pub unread: i64,
    pub timestamp: i64,
    pub last_msg_seq: i64,
    pub version: i64,
}

#[derive(Debug, Clone)]
pub struct Device {
    pub token: String,
    pub level: u8,
}

#[derive(Debug, Default)]
pub struct Store {
    pub channels: HashMap<ChannelId, Channel>,
    pub messages: Vec<StoredMessage>,
    /// uid -> conversation key -> state
    pub conversations: HashMap<String, BTreeMap<ChannelId, ConversationState>>,
    /// (uid, device_flag) -> device
    pub devices: BTreeMap<(String, u8), Device>,
    pub system_uids: BTreeSet<String>,
    pub events: Vec<(ChannelId, String)>,
    pub next_message_id: i64,
    pub version: i64,
}

impl Store {
    /// Person channels exist implicitly; everything else must be created.
    pub fn channel_mut(&mut self, id: &ChannelId) -> Option<&mut Channel> {
        if id.1 == PERSON {
            Some(self.channels.entry(id.clone()).or_default())
        } else {
            self.channels.get_mut(id)
        }
    }

    /// Recipients other than the sender.
    pub fn recipients(&self, id: &ChannelId, from_uid: &str) -> Vec<String> {
        if id.1 == PERSON {
            return vec![id.0.clone()];
        }
        self.channels
            .get(id)
            .map(|c| {
                c.subscribers
                    .iter()
                    .chain(c.temp_subscribers.iter())
                    .filter(|uid| uid.as_str() != from_uid)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Conversation key as seen by `uid`: a person channel is keyed by the peer.
    pub fn conversation_key(id: &ChannelId, uid: &str, from_uid: &str) -> ChannelId {
        if id.1 == PERSON && id.0 == uid {
            (from_uid.to_string(), PERSON)
        } else {
            id.clone()
        }
    }

    pub fn touch_conversation(&mut self, uid: &str, key: ChannelId, seq: i64, timestamp: i64, unread: bool) {
        self.version += 1;
        let version = self.version;
        let state = self
            .conversations
            .entry(uid.to_string())
            .or_default()
            .entry(key)
            .or_default();
        if unread {
            state.unread += 1;
        }
        state.last_msg_seq = seq;
        state.timestamp = timestamp;
        state.version = version;
    }

    pub fn can_see(&self, uid: &str, message: &StoredMessage) -> bool {
        if message.from_uid == uid {
            return true;
        }
        let id = (message.channel_id.clone(), message.channel_type);
        if id.1 == PERSON {
            return id.0 == uid;
        }
        self.channels
            .get(&id)
            .is_some_and(|c| c.subscribers.contains(uid) || c.temp_subscribers.contains(uid))
    }
}
