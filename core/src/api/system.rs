//! Backend health check.

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Copy)]
pub struct SystemService<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> SystemService<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn health(&self, ctx: &Context) -> Result<HealthStatus> {
        self.dispatcher.get(ctx, "system.health", "/health")
    }
}
