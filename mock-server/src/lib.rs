//! In-memory stand-in for the WuKongIM REST API.
//!
//! Implements every endpoint the client wraps with plausible semantics and
//! the backend's error shape (`{"msg": ..., "status": ...}`), so the client
//! can be exercised end-to-end over real HTTP.

mod handlers;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

pub use handlers::*;
use store::Store;

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub token: Option<Arc<str>>,
}

/// Backend-style error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    pub fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            body: json!({"msg": msg, "status": status.as_u16()}),
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Some backend builds put the text under `message` instead of `msg`.
    pub fn with_message_key(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({"message": message, "status": status.as_u16()}),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn app() -> Router {
    router(AppState {
        db: Db::default(),
        token: None,
    })
}

/// Like `app`, but every endpoint except `/health` requires
/// `Authorization: Bearer <token>`.
pub fn app_with_token(token: &str) -> Router {
    router(AppState {
        db: Db::default(),
        token: Some(Arc::from(token)),
    })
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/channel", post(create_channel))
        .route("/channel/info", post(update_channel_info))
        .route("/channel/subscriber_add", post(add_subscribers))
        .route("/channel/subscriber_remove", post(remove_subscribers))
        .route("/channel/delete", post(delete_channel))
        .route("/channel/blacklist_add", post(blacklist_add))
        .route("/channel/blacklist_set", post(blacklist_set))
        .route("/channel/blacklist_remove", post(blacklist_remove))
        .route("/channel/whitelist_add", post(whitelist_add))
        .route("/channel/whitelist_set", post(whitelist_set))
        .route("/channel/whitelist_remove", post(whitelist_remove))
        .route("/channel/whitelist", get(get_whitelist))
        .route("/channel/tmp_subscriber_set", post(set_tmp_subscribers))
        .route("/channel/messagesync", post(message_sync))
        .route("/channel/max_message_seq", get(max_message_seq))
        .route("/conn/remove", post(remove_connection))
        .route("/conn/kick", post(kick_connection))
        .route("/conversation/sync", post(sync_conversations))
        .route("/conversations/clearUnread", post(clear_unread))
        .route("/conversations/setUnread", post(set_unread))
        .route("/conversations/delete", post(delete_conversation))
        .route("/event", post(send_event))
        .route("/manager/login", post(manager_login))
        .route("/message/send", post(send_message))
        .route("/message/sendbatch", post(send_batch))
        .route("/plugins/wk.plugin.search/usersearch", post(user_search))
        .route("/messages", post(get_messages))
        .route("/message", post(get_message))
        .route("/route", get(route_address))
        .route("/route/batch", post(batch_route_address))
        .route("/user/token", post(update_token))
        .route("/user/device_quit", post(device_quit))
        .route("/user/onlinestatus", post(online_status))
        .route("/user/systemuids", get(system_uids))
        .route("/user/systemuids_add", post(add_system_uids))
        .route("/user/systemuids_remove", post(remove_system_uids))
        .layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(expected) = &state.token {
        if request.uri().path() != "/health" {
            let presented = request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "));
            if presented != Some(expected.as_ref()) {
                return ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized").into_response();
            }
        }
    }
    next.run(request).await
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_token(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(token)).await
}
