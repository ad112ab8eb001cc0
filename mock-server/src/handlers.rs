use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::store::{ChannelId, Device, Store, StoredMessage};
use crate::{ApiError, ApiResult, AppState};

fn ok() -> Json<Value> {
    Json(json!({"status": 200}))
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn require(field: &str, value: &str) -> ApiResult<()> {
    if value.is_empty() {
        Err(ApiError::bad_request(&format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

fn channel_not_found() -> ApiError {
    ApiError::not_found("channel not found")
}

// --- system ---

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

// --- channel ---

#[derive(Debug, Deserialize)]
pub struct CreateChannel {
    pub channel_id: String,
    pub channel_type: u8,
    pub large: Option<u8>,
    pub ban: Option<u8>,
    #[serde(default)]
    pub subscribers: Vec<String>,
}

pub async fn create_channel(State(state): State<AppState>, Json(input): Json<CreateChannel>) -> ApiResult<Json<Value>> {
    require("channel_id", &input.channel_id)?;
    let mut db = state.db.write().await;
    let id = (input.channel_id, input.channel_type);
    if db.channels.contains_key(&id) {
        return Err(ApiError::bad_request("channel already exists"));
    }
    let channel = db.channels.entry(id).or_default();
    channel.large = input.large.unwrap_or_default() != 0;
    channel.ban = input.ban.unwrap_or_default() != 0;
    channel.subscribers = input.subscribers.into_iter().collect();
    Ok(ok())
}

#[derive(Debug, Deserialize)]
pub struct UpdateChannelInfo {
    pub channel_id: String,
    pub channel_type: u8,
    pub large: Option<u8>,
    pub ban: Option<u8>,
}

pub async fn update_channel_info(
    State(state): State<AppState>,
    Json(input): Json<UpdateChannelInfo>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    let channel = db
        .channels
        .get_mut(&(input.channel_id, input.channel_type))
        .ok_or_else(channel_not_found)?;
    if let Some(large) = input.large {
        channel.large = large != 0;
    }
    if let Some(ban) = input.ban {
        channel.ban = ban != 0;
    }
    Ok(ok())
}

#[derive(Debug, Deserialize)]
pub struct Subscribers {
    pub channel_id: String,
    pub channel_type: u8,
    #[serde(default)]
    pub subscribers: Vec<String>,
    #[serde(default)]
    pub reset: u8,
    #[serde(default)]
    pub temp_subscriber: u8,
}

pub async fn add_subscribers(State(state): State<AppState>, Json(input): Json<Subscribers>) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    let channel = db
        .channel_mut(&(input.channel_id, input.channel_type))
        .ok_or_else(channel_not_found)?;
    let set = if input.temp_subscriber != 0 {
        &mut channel.temp_subscribers
    } else {
        &mut channel.subscribers
    };
    if input.reset != 0 {
        set.clear();
    }
    set.extend(input.subscribers);
    Ok(ok())
}

pub async fn remove_subscribers(State(state): State<AppState>, Json(input): Json<Subscribers>) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    let channel = db
        .channel_mut(&(input.channel_id, input.channel_type))
        .ok_or_else(channel_not_found)?;
    let set = if input.temp_subscriber != 0 {
        &mut channel.temp_subscribers
    } else {
        &mut channel.subscribers
    };
    for uid in &input.subscribers {
        set.remove(uid);
    }
    Ok(ok())
}

#[derive(Debug, Deserialize)]
pub struct ChannelRef {
    pub channel_id: String,
    pub channel_type: u8,
}

pub async fn delete_channel(State(state): State<AppState>, Json(input): Json<ChannelRef>) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    db.channels
        .remove(&(input.channel_id, input.channel_type))
        .map(|_| ok())
        .ok_or_else(channel_not_found)
}

#[derive(Debug, Deserialize)]
pub struct ChannelUids {
    pub channel_id: String,
    pub channel_type: u8,
    #[serde(default)]
    pub uids: Vec<String>,
}

#[derive(Clone, Copy)]
enum AccessList {
    Black,
    White,
}

#[derive(Clone, Copy)]
enum ListOp {
    Add,
    Set,
    Remove,
}

async fn edit_list(state: AppState, input: ChannelUids, list: AccessList, op: ListOp) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    let channel = db
        .channel_mut(&(input.channel_id, input.channel_type))
        .ok_or_else(channel_not_found)?;
    let set: &mut BTreeSet<String> = match list {
        AccessList::Black => &mut channel.blacklist,
        AccessList::White => &mut channel.whitelist,
    };
    match op {
        ListOp::Add => set.extend(input.uids),
        ListOp::Set => *set = input.uids.into_iter().collect(),
        ListOp::Remove => {
            for uid in &input.uids {
                set.remove(uid);
            }
        }
    }
    Ok(ok())
}

pub async fn blacklist_add(State(state): State<AppState>, Json(input): Json<ChannelUids>) -> ApiResult<Json<Value>> {
    edit_list(state, input, AccessList::Black, ListOp::Add).await
}

pub async fn blacklist_set(State(state): State<AppState>, Json(input): Json<ChannelUids>) -> ApiResult<Json<Value>> {
    edit_list(state, input, AccessList::Black, ListOp::Set).await
}

pub async fn blacklist_remove(State(state): State<AppState>, Json(input): Json<ChannelUids>) -> ApiResult<Json<Value>> {
    edit_list(state, input, AccessList::Black, ListOp::Remove).await
}

pub async fn whitelist_add(State(state): State<AppState>, Json(input): Json<ChannelUids>) -> ApiResult<Json<Value>> {
    edit_list(state, input, AccessList::White, ListOp::Add).await
}

pub async fn whitelist_set(State(state): State<AppState>, Json(input): Json<ChannelUids>) -> ApiResult<Json<Value>> {
    edit_list(state, input, AccessList::White, ListOp::Set).await
}

pub async fn whitelist_remove(State(state): State<AppState>, Json(input): Json<ChannelUids>) -> ApiResult<Json<Value>> {
    edit_list(state, input, AccessList::White, ListOp::Remove).await
}

pub async fn get_whitelist(State(state): State<AppState>, Query(query): Query<ChannelRef>) -> ApiResult<Json<Vec<String>>> {
    let db = state.db.read().await;
    let channel = db
        .channels
        .get(&(query.channel_id, query.channel_type))
        .ok_or_else(channel_not_found)?;
    Ok(Json(channel.whitelist.iter().cloned().collect()))
}

#[derive(Debug, Deserialize)]
pub struct TmpSubscribers {
    pub channel_id: String,
    pub channel_type: u8,
    #[serde(default)]
    pub subscribers: Vec<String>,
}

/// Temporary channels need no prior create.
pub async fn set_tmp_subscribers(
    State(state): State<AppState>,
    Json(input): Json<TmpSubscribers>,
) -> ApiResult<Json<Value>> {
    require("channel_id", &input.channel_id)?;
    let mut db = state.db.write().await;
    let channel = db.channels.entry((input.channel_id, input.channel_type)).or_default();
    channel.temp_subscribers = input.subscribers.into_iter().collect();
    Ok(ok())
}

// --- connection ---

#[derive(Debug, Deserialize)]
pub struct Connection {
    pub uid: String,
    #[serde(default)]
    pub conn_id: i64,
    #[serde(default)]
    pub node_id: i64,
}

pub async fn remove_connection(Json(input): Json<Connection>) -> ApiResult<Json<Value>> {
    require("uid", &input.uid)?;
    Ok(ok())
}

pub async fn kick_connection(Json(input): Json<Connection>) -> ApiResult<Json<Value>> {
    require("uid", &input.uid)?;
    Ok(ok())
}

// --- conversation ---

#[derive(Debug, Deserialize)]
pub struct ConversationSync {
    pub uid: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub msg_count: usize,
    #[serde(default)]
    pub only_unread: u8,
    #[serde(default)]
    pub exclude_channel_types: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationOut {
    pub channel_id: String,
    pub channel_type: u8,
    pub unread: i64,
    pub timestamp: i64,
    pub last_msg_seq: i64,
    pub version: i64,
    pub recents: Vec<MessageOut>,
}

pub async fn sync_conversations(
    State(state): State<AppState>,
    Json(input): Json<ConversationSync>,
) -> ApiResult<Json<Vec<ConversationOut>>> {
    require("uid", &input.uid)?;
    let db = state.db.read().await;
    let Some(conversations) = db.conversations.get(&input.uid) else {
        return Ok(Json(Vec::new()));
    };
    let out = conversations
        .iter()
        .filter(|(_, c)| c.version > input.version)
        .filter(|(_, c)| input.only_unread == 0 || c.unread > 0)
        .filter(|((_, channel_type), _)| !input.exclude_channel_types.contains(channel_type))
        .map(|((channel_id, channel_type), c)| {
            let mut recents: Vec<MessageOut> = db
                .messages
                .iter()
                .rev()
                .filter(|m| {
                    Store::conversation_key(&(m.channel_id.clone(), m.channel_type), &input.uid, &m.from_uid)
                        == (channel_id.clone(), *channel_type)
                        && db.can_see(&input.uid, m)
                })
                .take(input.msg_count)
                .map(MessageOut::from)
                .collect();
            recents.reverse();
            ConversationOut {
                channel_id: channel_id.clone(),
                channel_type: *channel_type,
                unread: c.unread,
                timestamp: c.timestamp,
                last_msg_seq: c.last_msg_seq,
                version: c.version,
                recents,
            }
        })
        .collect();
    Ok(Json(out))
}

#[derive(Debug, Deserialize)]
pub struct ConversationRef {
    pub uid: String,
    pub channel_id: String,
    pub channel_type: u8,
    #[serde(default)]
    pub unread: i64,
}

fn conversation_mut<'a>(db: &'a mut Store, input: &ConversationRef) -> ApiResult<&'a mut crate::store::ConversationState> {
    db.conversations
        .get_mut(&input.uid)
        .and_then(|c| c.get_mut(&(input.channel_id.clone(), input.channel_type)))
        .ok_or_else(|| ApiError::not_found("conversation not found"))
}

pub async fn clear_unread(State(state): State<AppState>, Json(input): Json<ConversationRef>) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    conversation_mut(&mut db, &input)?.unread = 0;
    Ok(ok())
}

pub async fn set_unread(State(state): State<AppState>, Json(input): Json<ConversationRef>) -> ApiResult<Json<Value>> {
    if input.unread < 0 {
        return Err(ApiError::bad_request("unread must not be negative"));
    }
    let mut db = state.db.write().await;
    conversation_mut(&mut db, &input)?.unread = input.unread;
    Ok(ok())
}

pub async fn delete_conversation(
    State(state): State<AppState>,
    Json(input): Json<ConversationRef>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    db.conversations
        .get_mut(&input.uid)
        .and_then(|c| c.remove(&(input.channel_id, input.channel_type)))
        .map(|_| ok())
        .ok_or_else(|| ApiError::not_found("conversation not found"))
}

// --- event ---

#[derive(Debug, Deserialize)]
pub struct EventBody {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct SendEvent {
    pub client_msg_no: String,
    pub channel_id: String,
    pub channel_type: u8,
    pub from_uid: String,
    pub event: EventBody,
}

#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub force_end: Option<u8>,
}

pub async fn send_event(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
    Json(input): Json<SendEvent>,
) -> ApiResult<Json<Value>> {
    require("event.type", &input.event.event_type)?;
    require("client_msg_no", &input.client_msg_no)?;
    let mut db = state.db.write().await;
    let id: ChannelId = (input.channel_id, input.channel_type);
    db.channel_mut(&id).ok_or_else(channel_not_found)?;
    let kind = match query.force_end {
        Some(flag) if flag != 0 => format!("{}:end", input.event.event_type),
        _ => input.event.event_type,
    };
    db.events.push((id, kind));
    Ok(ok())
}

// --- manager ---

#[derive(Debug, Deserialize)]
pub struct ManagerLogin {
    pub username: String,
    pub password: String,
}

pub async fn manager_login(Json(input): Json<ManagerLogin>) -> ApiResult<Json<Value>> {
    if input.username != "admin" || input.password != "admin" {
        return Err(ApiError::with_message_key(StatusCode::UNAUTHORIZED, "invalid credentials"));
    }
    Ok(Json(json!({
        "token": Uuid::new_v4().simple().to_string(),
        "expire": 86400,
        "user": {"username": "admin", "role": "superAdmin", "permissions": ["*"]},
    })))
}

// --- message ---

#[derive(Debug, Deserialize)]
pub struct MessageHeader {
    #[serde(default)]
    pub no_persist: u8,
    #[serde(default = "one")]
    pub red_dot: u8,
}

fn one() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SendMessage {
    pub header: Option<MessageHeader>,
    #[serde(default)]
    pub client_msg_no: String,
    pub from_uid: String,
    pub channel_id: String,
    pub channel_type: u8,
    #[serde(default)]
    pub payload: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendResult {
    pub message_id: i64,
    pub message_seq: i64,
    pub client_msg_no: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOut {
    pub message_id: i64,
    pub message_seq: i64,
    pub client_msg_no: String,
    pub from_uid: String,
    pub channel_id: String,
    pub channel_type: u8,
    pub timestamp: i64,
    pub payload: String,
}

impl From<&StoredMessage> for MessageOut {
    fn from(m: &StoredMessage) -> Self {
        Self {
            message_id: m.message_id,
            message_seq: m.message_seq,
            client_msg_no: m.client_msg_no.clone(),
            from_uid: m.from_uid.clone(),
            channel_id: m.channel_id.clone(),
            channel_type: m.channel_type,
            timestamp: m.timestamp,
            payload: m.payload.clone(),
        }
    }
}

fn store_message(db: &mut Store, input: SendMessage) -> ApiResult<SendResult> {
    require("from_uid", &input.from_uid)?;
    require("channel_id", &input.channel_id)?;
    if STANDARD.decode(&input.payload).is_err() {
        return Err(ApiError::bad_request("payload must be base64"));
    }
    let id: ChannelId = (input.channel_id.clone(), input.channel_type);
    let channel = db.channel_mut(&id).ok_or_else(channel_not_found)?;
    if channel.ban {
        return Err(ApiError::bad_request("channel is banned"));
    }
    if channel.blacklist.contains(&input.from_uid) {
        return Err(ApiError::bad_request("sender is blacklisted"));
    }
    if !channel.whitelist.is_empty() && !channel.whitelist.contains(&input.from_uid) {
        return Err(ApiError::bad_request("sender is not whitelisted"));
    }
    channel.max_seq += 1;
    let message_seq = channel.max_seq;

    db.next_message_id += 1;
    let message_id = db.next_message_id;
    let timestamp = now();
    let client_msg_no = if input.client_msg_no.is_empty() {
        Uuid::new_v4().simple().to_string()
    } else {
        input.client_msg_no
    };
    let (no_persist, red_dot) = input
        .header
        .map(|h| (h.no_persist != 0, h.red_dot != 0))
        .unwrap_or((false, true));

    let recipients = db.recipients(&id, &input.from_uid);
    for uid in &recipients {
        let key = Store::conversation_key(&id, uid, &input.from_uid);
        db.touch_conversation(uid, key, message_seq, timestamp, red_dot);
    }
    let sender_key = Store::conversation_key(&id, &input.from_uid, &input.from_uid);
    db.touch_conversation(&input.from_uid, sender_key, message_seq, timestamp, false);

    if !no_persist {
        db.messages.push(StoredMessage {
            message_id,
            message_seq,
            client_msg_no: client_msg_no.clone(),
            from_uid: input.from_uid,
            channel_id: input.channel_id,
            channel_type: input.channel_type,
            timestamp,
            payload: input.payload,
        });
    }
    Ok(SendResult {
        message_id,
        message_seq,
        client_msg_no,
    })
}

pub async fn send_message(State(state): State<AppState>, Json(input): Json<SendMessage>) -> ApiResult<Json<SendResult>> {
    let mut db = state.db.write().await;
    store_message(&mut db, input).map(Json)
}

/// Failed items come back with zero ids rather than failing the batch.
pub async fn send_batch(State(state): State<AppState>, Json(input): Json<Vec<SendMessage>>) -> Json<Vec<SendResult>> {
    let mut db = state.db.write().await;
    let results = input
        .into_iter()
        .map(|message| {
            let client_msg_no = message.client_msg_no.clone();
            store_message(&mut db, message).unwrap_or(SendResult {
                message_id: 0,
                message_seq: 0,
                client_msg_no,
            })
        })
        .collect();
    Json(results)
}

#[derive(Debug, Deserialize)]
pub struct MessageSync {
    pub login_uid: String,
    pub channel_id: String,
    pub channel_type: u8,
    #[serde(default)]
    pub start_message_seq: i64,
    #[serde(default)]
    pub end_message_seq: i64,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub pull_mode: u8,
}

/// Pull up: ascending from `start` (exclusive) towards `end`.
/// Pull down: the newest messages at or below `start`, above `end`.
pub async fn message_sync(State(state): State<AppState>, Json(input): Json<MessageSync>) -> ApiResult<Json<Vec<MessageOut>>> {
    require("login_uid", &input.login_uid)?;
    let db = state.db.read().await;
    let limit = if input.limit == 0 { 100 } else { input.limit };
    let history = db
        .messages
        .iter()
        .filter(|m| m.channel_id == input.channel_id && m.channel_type == input.channel_type)
        .filter(|m| db.can_see(&input.login_uid, m));
    let mut out: Vec<MessageOut> = if input.pull_mode == 1 {
        history
            .filter(|m| m.message_seq > input.start_message_seq)
            .filter(|m| input.end_message_seq == 0 || m.message_seq <= input.end_message_seq)
            .take(limit)
            .map(MessageOut::from)
            .collect()
    } else {
        history
            .rev()
            .filter(|m| input.start_message_seq == 0 || m.message_seq <= input.start_message_seq)
            .filter(|m| m.message_seq > input.end_message_seq)
            .take(limit)
            .map(MessageOut::from)
            .collect()
    };
    out.sort_by_key(|m| m.message_seq);
    Ok(Json(out))
}

pub async fn max_message_seq(State(state): State<AppState>, Query(query): Query<ChannelRef>) -> ApiResult<Json<Value>> {
    let db = state.db.read().await;
    let channel = db
        .channels
        .get(&(query.channel_id, query.channel_type))
        .ok_or_else(channel_not_found)?;
    Ok(Json(json!({"max_message_seq": channel.max_seq})))
}

#[derive(Debug, Deserialize)]
pub struct UserSearch {
    pub uid: String,
    #[serde(default)]
    pub payload: serde_json::Map<String, Value>,
    #[serde(default)]
    pub payload_types: Vec<i64>,
    pub channel_type: Option<u8>,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub page: usize,
}

/// Matches messages whose JSON payload contains every requested field value
/// as a substring.
pub async fn user_search(State(state): State<AppState>, Json(input): Json<UserSearch>) -> ApiResult<Json<Value>> {
    require("uid", &input.uid)?;
    let db = state.db.read().await;
    let limit = if input.limit == 0 { 10 } else { input.limit };
    let page = input.page.max(1);

    let hits: Vec<(&StoredMessage, serde_json::Map<String, Value>)> = db
        .messages
        .iter()
        .filter(|m| db.can_see(&input.uid, m))
        .filter(|m| input.channel_type.is_none_or(|t| t == 0 || t == m.channel_type))
        .filter_map(|m| {
            let bytes = STANDARD.decode(&m.payload).ok()?;
            let payload: serde_json::Map<String, Value> = serde_json::from_slice(&bytes).ok()?;
            Some((m, payload))
        })
        .filter(|(_, payload)| {
            input.payload_types.is_empty()
                || payload
                    .get("type")
                    .and_then(Value::as_i64)
                    .is_some_and(|t| input.payload_types.contains(&t))
        })
        .filter(|(_, payload)| {
            input.payload.iter().all(|(key, wanted)| {
                let wanted = wanted.as_str().map(str::to_string).unwrap_or_else(|| wanted.to_string());
                payload
                    .get(key)
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .is_some_and(|v| v.contains(&wanted))
            })
        })
        .collect();

    let total = hits.len();
    let messages: Vec<Value> = hits
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .map(|(m, payload)| {
            json!({
                "message_id": m.message_id,
                "message_idstr": m.message_id.to_string(),
                "message_seq": m.message_seq,
                "client_msg_no": m.client_msg_no,
                "from_uid": m.from_uid,
                "channel_id": m.channel_id,
                "channel_type": m.channel_type,
                "payload": payload,
                "topic": "",
                "timestamp": m.timestamp,
            })
        })
        .collect();

    Ok(Json(json!({"total": total, "limit": limit, "page": page, "messages": messages})))
}

#[derive(Debug, Deserialize)]
pub struct MessageIds {
    #[serde(default)]
    pub message_ids: Vec<i64>,
}

pub async fn get_messages(State(state): State<AppState>, Json(input): Json<MessageIds>) -> Json<Vec<MessageOut>> {
    let db = state.db.read().await;
    Json(
        db.messages
            .iter()
            .filter(|m| input.message_ids.contains(&m.message_id))
            .map(MessageOut::from)
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
pub struct MessageIdRef {
    pub message_id: i64,
}

pub async fn get_message(State(state): State<AppState>, Json(input): Json<MessageIdRef>) -> ApiResult<Json<MessageOut>> {
    let db = state.db.read().await;
    db.messages
        .iter()
        .find(|m| m.message_id == input.message_id)
        .map(|m| Json(MessageOut::from(m)))
        .ok_or_else(|| ApiError::not_found("message not found"))
}

// --- route ---

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    #[serde(default)]
    pub intranet: u8,
}

fn addresses(intranet: u8) -> Value {
    if intranet == 1 {
        json!({"tcp_addr": "127.0.0.1:5100", "ws_addr": "ws://127.0.0.1:5200", "wss_addr": ""})
    } else {
        json!({
            "tcp_addr": "im.example.com:5100",
            "ws_addr": "ws://im.example.com:5200",
            "wss_addr": "wss://im.example.com:5210",
        })
    }
}

pub async fn route_address(Query(query): Query<RouteQuery>) -> Json<Value> {
    Json(addresses(query.intranet))
}

/// Single-node cluster: every uid maps to the same node.
pub async fn batch_route_address(Query(query): Query<RouteQuery>, Json(uids): Json<Vec<String>>) -> Json<Value> {
    if uids.is_empty() {
        return Json(json!([]));
    }
    let mut entry = addresses(query.intranet);
    entry["uids"] = json!(uids);
    Json(json!([entry]))
}

// --- user ---

#[derive(Debug, Deserialize)]
pub struct UpdateToken {
    pub uid: String,
    pub token: String,
    #[serde(default)]
    pub device_flag: u8,
    #[serde(default)]
    pub device_level: u8,
}

pub async fn update_token(State(state): State<AppState>, Json(input): Json<UpdateToken>) -> ApiResult<Json<Value>> {
    require("uid", &input.uid)?;
    require("token", &input.token)?;
    let mut db = state.db.write().await;
    db.devices.insert(
        (input.uid, input.device_flag),
        Device {
            token: input.token,
            level: input.device_level,
        },
    );
    Ok(ok())
}

#[derive(Debug, Deserialize)]
pub struct DeviceQuit {
    pub uid: String,
    #[serde(default)]
    pub device_flag: u8,
}

pub async fn device_quit(State(state): State<AppState>, Json(input): Json<DeviceQuit>) -> ApiResult<Json<Value>> {
    require("uid", &input.uid)?;
    let mut db = state.db.write().await;
    db.devices.remove(&(input.uid, input.device_flag));
    Ok(ok())
}

/// A user counts as online while any device holds a token.
pub async fn online_status(State(state): State<AppState>, Json(uids): Json<Vec<String>>) -> Json<Value> {
    let db = state.db.read().await;
    let online: Vec<Value> = db
        .devices
        .iter()
        .filter(|((uid, _), device)| uids.contains(uid) && !device.token.is_empty())
        .map(|((uid, flag), device)| json!({"uid": uid, "online": 1, "device_flag": flag, "device_level": device.level}))
        .collect();
    Json(Value::Array(online))
}

pub async fn system_uids(State(state): State<AppState>) -> Json<Vec<String>> {
    let db = state.db.read().await;
    Json(db.system_uids.iter().cloned().collect())
}

#[derive(Debug, Deserialize)]
pub struct Uids {
    #[serde(default)]
    pub uids: Vec<String>,
}

pub async fn add_system_uids(State(state): State<AppState>, Json(input): Json<Uids>) -> Json<Value> {
    state.db.write().await.system_uids.extend(input.uids);
    ok()
}

pub async fn remove_system_uids(State(state): State<AppState>, Json(input): Json<Uids>) -> Json<Value> {
    let mut db = state.db.write().await;
    for uid in &input.uids {
        db.system_uids.remove(uid);
    }
    ok()
}
