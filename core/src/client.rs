//! Entry point tying configuration, dispatcher and endpoint groups together.
//!
//! # Design
//! `Client` owns the only `Dispatcher`. Service accessors hand out small
//! `Copy` handles borrowing it, so there is no per-service state and no
//! reference counting. `Client` is `Send + Sync`; share it behind an `Arc`
//! to issue calls from several threads at once.

use crate::api::{
    ChannelService, ConnectionService, ConversationService, EventService, ManagerService, MessageService,
    RouteService, SystemService, UserService,
};
use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::http::Transport;

/// Client for the WuKongIM REST API.
///
/// ```no_run
/// use wukongim_core::{Client, ClientConfig, Context};
///
/// let client = Client::new(ClientConfig::new("http://localhost:5001"))?;
/// let health = client.system().health(&Context::background())?;
/// assert_eq!(health.status, "ok");
/// # Ok::<(), wukongim_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Client {
    dispatcher: Dispatcher,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(config)?,
        })
    }

    pub fn with_transport<T>(config: ClientConfig, transport: T) -> Result<Self>
    where
        T: Transport + 'static,
    {
        Ok(Self {
            dispatcher: Dispatcher::with_transport(config, transport)?,
        })
    }

    /// Raw access for endpoints this crate does not wrap.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn channel(&self) -> ChannelService<'_> {
        ChannelService::new(&self.dispatcher)
    }

    pub fn connection(&self) -> ConnectionService<'_> {
        ConnectionService::new(&self.dispatcher)
    }

    pub fn conversation(&self) -> ConversationService<'_> {
        ConversationService::new(&self.dispatcher)
    }

    pub fn event(&self) -> EventService<'_> {
        EventService::new(&self.dispatcher)
    }

    pub fn manager(&self) -> ManagerService<'_> {
        ManagerService::new(&self.dispatcher)
    }

    pub fn message(&self) -> MessageService<'_> {
        MessageService::new(&self.dispatcher)
    }

    pub fn route(&self) -> RouteService<'_> {
        RouteService::new(&self.dispatcher)
    }

    pub fn user(&self) -> UserService<'_> {
        UserService::new(&self.dispatcher)
    }

    pub fn system(&self) -> SystemService<'_> {
        SystemService::new(&self.dispatcher)
    }
}
