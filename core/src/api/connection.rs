//! Forcibly closing client connections.

use serde::{Deserialize, Serialize};

use crate::api::post_ack;
use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::types::Ack;

/// Identifies one connection of `uid` on cluster node `node_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub uid: String,
    pub conn_id: i64,
    pub node_id: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectionService<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> ConnectionService<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Drop the connection without notifying the client.
    pub fn remove(&self, ctx: &Context, req: &ConnectionRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "connection.remove", "/conn/remove", req)
    }

    /// Send a kick packet, then close the connection.
    pub fn kick(&self, ctx: &Context, req: &ConnectionRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "connection.kick", "/conn/kick", req)
    }
}
