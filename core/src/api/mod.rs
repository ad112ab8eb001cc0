//! Typed endpoint groups.
//!
//! Each service is a thin, copyable handle that borrows the shared
//! `Dispatcher`. Methods build a path and a payload, delegate to the
//! dispatcher and return the decoded result. No service keeps state.

pub mod channel;
pub mod connection;
pub mod conversation;
pub mod event;
pub mod manager;
pub mod message;
pub mod route;
pub mod system;
pub mod user;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::types::Ack;

pub use channel::ChannelService;
pub use connection::ConnectionService;
pub use conversation::ConversationService;
pub use event::EventService;
pub use manager::ManagerService;
pub use message::MessageService;
pub use route::RouteService;
pub use system::SystemService;
pub use user::UserService;

/// POST whose answer is only an acknowledgement; an empty body is a plain `Ack`.
pub(crate) fn post_ack<B>(dispatcher: &Dispatcher, ctx: &Context, op: &'static str, path: &str, body: &B) -> Result<Ack>
where
    B: Serialize + ?Sized,
{
    Ok(dispatcher
        .post::<B, Option<Ack>>(ctx, op, path, body)?
        .unwrap_or_default())
}

/// POST returning a JSON array; `null` decodes as empty.
pub(crate) fn post_list<B, T>(
    dispatcher: &Dispatcher,
    ctx: &Context,
    op: &'static str,
    path: &str,
    body: &B,
) -> Result<Vec<T>>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    Ok(dispatcher
        .post::<B, Option<Vec<T>>>(ctx, op, path, body)?
        .unwrap_or_default())
}

/// GET returning a JSON array; `null` decodes as empty.
pub(crate) fn get_list<T>(dispatcher: &Dispatcher, ctx: &Context, op: &'static str, path: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    Ok(dispatcher
        .get::<Option<Vec<T>>>(ctx, op, path)?
        .unwrap_or_default())
}
