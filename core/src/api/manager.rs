//! Administrative login for the management console API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::error::Result;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerLoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ManagerLoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerLoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerLoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expire: i64,
    #[serde(default)]
    pub user: ManagerUser,
}

#[derive(Debug, Clone, Copy)]
pub struct ManagerService<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> ManagerService<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn login(&self, ctx: &Context, req: &ManagerLoginRequest) -> Result<ManagerLoginResponse> {
        self.dispatcher.post(ctx, "manager.login", "/manager/login", req)
    }
}
