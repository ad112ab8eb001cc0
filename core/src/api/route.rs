//! Resolving which real-time node a user should connect to.

use serde::{Deserialize, Serialize};

use crate::api::post_list;
use crate::context::Context;
use crate::dispatcher::{with_query, Dispatcher};
use crate::error::Result;
use crate::types::IntranetType;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAddress {
    #[serde(default)]
    pub tcp_addr: String,
    #[serde(default)]
    pub ws_addr: String,
    #[serde(default)]
    pub wss_addr: String,
}

/// One node and the users that should connect to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRouteAddress {
    #[serde(default)]
    pub uids: Vec<String>,
    #[serde(default)]
    pub tcp_addr: String,
    #[serde(default)]
    pub ws_addr: String,
    #[serde(default)]
    pub wss_addr: String,
}

fn intranet_query(intranet: IntranetType) -> [(&'static str, String); 1] {
    [("intranet", intranet.to_string())]
}

#[derive(Debug, Clone, Copy)]
pub struct RouteService<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> RouteService<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn address(&self, ctx: &Context, intranet: IntranetType) -> Result<RouteAddress> {
        let path = with_query("/route", intranet_query(intranet));
        self.dispatcher.get(ctx, "route.address", &path)
    }

    pub fn batch_addresses(&self, ctx: &Context, intranet: IntranetType, uids: &[String]) -> Result<Vec<BatchRouteAddress>> {
        let path = with_query("/route/batch", intranet_query(intranet));
        post_list(self.dispatcher, ctx, "route.batch_addresses", &path, uids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{body_json, client_with, RecordingTransport};

    #[test]
    fn address_always_sends_intranet() {
        let transport = RecordingTransport::replying(
            200,
            r#"{"tcp_addr":"10.0.0.1:5100","ws_addr":"ws://10.0.0.1:5200","wss_addr":""}"#,
        );
        let client = client_with(&transport);
        let addr = client.route().address(&Context::background(), IntranetType::default()).unwrap();
        assert_eq!(addr.tcp_addr, "10.0.0.1:5100");

        let sent = transport.last();
        assert_eq!(sent.method, HttpMethod::Get);
        assert_eq!(sent.url, "http://localhost:5001/route?intranet=0");
    }

    #[test]
    fn batch_posts_uid_array() {
        let transport = RecordingTransport::replying(
            200,
            r#"[{"uids":["u1","u2"],"tcp_addr":"n1:5100","ws_addr":"ws://n1:5200","wss_addr":"wss://n1"}]"#,
        );
        let client = client_with(&transport);
        let uids = vec!["u1".to_string(), "u2".to_string()];
        let routes = client
            .route()
            .batch_addresses(&Context::background(), IntranetType::Internal, &uids)
            .unwrap();
        assert_eq!(routes[0].uids, uids);

        let sent = transport.last();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, "http://localhost:5001/route/batch?intranet=1");
        assert_eq!(body_json(&sent), serde_json::json!(["u1", "u2"]));
    }
}
