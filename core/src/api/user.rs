//! User tokens, devices, presence and the system-user list.

use serde::{Deserialize, Serialize};

use crate::api::{get_list, post_ack, post_list};
use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::types::{Ack, DeviceFlag, DeviceLevel, OnlineStatus};

/// Registers the token a device will present when it connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTokenRequest {
    pub uid: String,
    pub token: String,
    pub device_flag: DeviceFlag,
    pub device_level: DeviceLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceQuitRequest {
    pub uid: String,
    pub device_flag: DeviceFlag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOnlineStatus {
    pub uid: String,
    pub online: OnlineStatus,
    #[serde(default)]
    pub device_flag: DeviceFlag,
}

#[derive(Serialize)]
struct Uids<'a> {
    uids: &'a [String],
}

#[derive(Debug, Clone, Copy)]
pub struct UserService<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> UserService<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn update_token(&self, ctx: &Context, req: &UpdateTokenRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "user.update_token", "/user/token", req)
    }

    /// Log the device out and drop its connections.
    pub fn device_quit(&self, ctx: &Context, req: &DeviceQuitRequest) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "user.device_quit", "/user/device_quit", req)
    }

    /// Only users with at least one online device appear in the result.
    pub fn online_status(&self, ctx: &Context, uids: &[String]) -> Result<Vec<UserOnlineStatus>> {
        post_list(self.dispatcher, ctx, "user.online_status", "/user/onlinestatus", uids)
    }

    pub fn system_uids(&self, ctx: &Context) -> Result<Vec<String>> {
        get_list(self.dispatcher, ctx, "user.system_uids", "/user/systemuids")
    }

    pub fn add_system_uids(&self, ctx: &Context, uids: &[String]) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "user.add_system_uids", "/user/systemuids_add", &Uids { uids })
    }

    pub fn remove_system_uids(&self, ctx: &Context, uids: &[String]) -> Result<Ack> {
        post_ack(self.dispatcher, ctx, "user.remove_system_uids", "/user/systemuids_remove", &Uids { uids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{body_json, client_with, RecordingTransport};

    #[test]
    fn update_token_sends_device_codes() {
        let transport = RecordingTransport::replying(200, "");
        let client = client_with(&transport);
        let req = UpdateTokenRequest {
            uid: "u1".to_string(),
            token: "tok".to_string(),
            device_flag: DeviceFlag::Web,
            device_level: DeviceLevel::Master,
        };
        client.user().update_token(&Context::background(), &req).unwrap();
        let sent = transport.last();
        assert_eq!(sent.url, "http://localhost:5001/user/token");
        assert_eq!(
            body_json(&sent),
            serde_json::json!({"uid": "u1", "token": "tok", "device_flag": 1, "device_level": 1})
        );
    }

    #[test]
    fn device_quit_posts_flag() {
        let transport = RecordingTransport::replying(200, "");
        let client = client_with(&transport);
        let req = DeviceQuitRequest {
            uid: "u1".to_string(),
            device_flag: DeviceFlag::Pc,
        };
        client.user().device_quit(&Context::background(), &req).unwrap();
        assert_eq!(transport.last().url, "http://localhost:5001/user/device_quit");
        assert_eq!(body_json(&transport.last())["device_flag"], 2);
    }

    #[test]
    fn online_status_posts_uid_array() {
        let transport = RecordingTransport::replying(200, r#"[{"uid":"u1","online":1,"device_flag":0}]"#);
        let client = client_with(&transport);
        let statuses = client
            .user()
            .online_status(&Context::background(), &["u1".to_string(), "u2".to_string()])
            .unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].online, OnlineStatus::Online);
        assert_eq!(body_json(&transport.last()), serde_json::json!(["u1", "u2"]));
    }

    #[test]
    fn system_uid_roundtrip_paths() {
        let transport = RecordingTransport::default();
        transport.push_reply(200, "");
        transport.push_reply(200, r#"["admin"]"#);
        transport.push_reply(200, "");
        let client = client_with(&transport);
        let ctx = Context::background();
        let uids = vec!["admin".to_string()];

        client.user().add_system_uids(&ctx, &uids).unwrap();
        assert_eq!(client.user().system_uids(&ctx).unwrap(), uids);
        client.user().remove_system_uids(&ctx, &uids).unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].url, "http://localhost:5001/user/systemuids_add");
        assert_eq!(body_json(&sent[0]), serde_json::json!({"uids": ["admin"]}));
        assert_eq!(sent[1].method, HttpMethod::Get);
        assert_eq!(sent[1].url, "http://localhost:5001/user/systemuids");
        assert_eq!(sent[2].url, "http://localhost:5001/user/systemuids_remove");
    }
}
