//! Blocking client for the WuKongIM instant-messaging REST API.
//!
//! # Overview
//! `Client` exposes the backend's endpoint groups (channels, messages,
//! conversations, connections, events, routes, users, system, manager) as
//! typed methods. Every method is a single HTTP round-trip through the
//! shared `Dispatcher`.
//!
//! # Design
//! - `Dispatcher` splits each call into `build_request` (pure),
//!   `Transport::send` (I/O) and `parse_response` (pure), so request shapes
//!   and error classification are tested without a network.
//! - Failures are one `Error` enum. Backend-reported failures
//!   (`Error::Backend`) are distinguishable from transport failures, and
//!   `Error::backend()` extracts the backend's message and status.
//! - Every operation takes a `Context` whose deadline caps the transport
//!   timeout. A cancelled context fails with `TransportError::Cancelled`.
//! - No retries, caching or background threads; connection pooling is left
//!   to the `ureq` agent.

pub mod api;
pub mod client;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod types;

#[cfg(test)]
mod testing;

pub use api::channel::{
    AddSubscribersRequest, ChannelKey, ChannelUidsRequest, CreateChannelRequest, RemoveSubscribersRequest,
    SetTmpSubscribersRequest, UpdateChannelInfoRequest,
};
pub use api::connection::ConnectionRequest;
pub use api::conversation::{
    ClearUnreadRequest, Conversation, ConversationSyncRequest, DeleteConversationRequest, RecentMessage,
    SetUnreadRequest,
};
pub use api::event::{EventPayload, EventSendRequest};
pub use api::manager::{ManagerLoginRequest, ManagerLoginResponse, ManagerUser};
pub use api::message::{
    new_client_msg_no, MaxMessageSeqResponse, Message, MessageHeader, MessageSyncRequest, SendMessageRequest,
    SendMessageResponse, UserSearchRequest, UserSearchResponse, UserSearchResult,
};
pub use api::route::{BatchRouteAddress, RouteAddress};
pub use api::system::HealthStatus;
pub use api::user::{DeviceQuitRequest, UpdateTokenRequest, UserOnlineStatus};
pub use client::Client;
pub use config::ClientConfig;
pub use context::Context;
pub use dispatcher::Dispatcher;
pub use error::{BackendError, Error, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{
    Ack, ChannelType, DeviceFlag, DeviceLevel, IntranetType, OnlineStatus, OnlyUnreadMode, PullMode,
};
