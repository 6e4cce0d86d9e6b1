//! Shared test helpers for relay integration tests.
//!
//! Provides a mock platform server standing in for the GroupMe API, the
//! GroupMe image service, and the Discord REST API all at once, plus
//! config and event builders so individual test modules can focus on
//! behaviour rather than boilerplate.

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use groupme_bridge::config::GlobalConfig;
use groupme_bridge::models::event::{Attachment, InboundMessage, ReactionEvent, ReplyRef};

/// Shared observable state of the mock platform.
#[derive(Clone)]
pub struct MockState {
    /// JSON bodies received by the bot-post endpoint, in arrival order.
    pub posts: Arc<Mutex<Vec<Value>>>,
    /// Number of hits on the image-upload endpoint.
    pub uploads: Arc<AtomicUsize>,
    /// Status returned by the bot-post endpoint (default 202).
    pub post_status: Arc<AtomicU16>,
    /// Status returned by the image-upload endpoint (default 200).
    pub upload_status: Arc<AtomicU16>,
    /// When set, the upload endpoint returns a body without `payload.url`.
    pub upload_malformed: Arc<AtomicBool>,
    /// When set, the upload endpoint returns a body that is not JSON.
    pub upload_not_json: Arc<AtomicBool>,
    /// When set, the group message-list endpoint returns a body that is
    /// not JSON.
    pub history_not_json: Arc<AtomicBool>,
    /// Messages returned by the group message-list endpoint.
    pub history: Arc<Mutex<Vec<Value>>>,
    /// JSON bodies received by the Discord channel-message endpoint.
    pub discord_posts: Arc<Mutex<Vec<Value>>>,
}

/// A spawned mock platform bound to an ephemeral port.
pub struct MockPlatform {
    pub base_url: String,
    pub state: MockState,
}

/// Spawn the mock platform server. It serves until the test process exits.
pub async fn spawn_mock_platform() -> MockPlatform {
    let state = MockState {
        posts: Arc::new(Mutex::new(Vec::new())),
        uploads: Arc::new(AtomicUsize::new(0)),
        post_status: Arc::new(AtomicU16::new(202)),
        upload_status: Arc::new(AtomicU16::new(200)),
        upload_malformed: Arc::new(AtomicBool::new(false)),
        upload_not_json: Arc::new(AtomicBool::new(false)),
        history_not_json: Arc::new(AtomicBool::new(false)),
        history: Arc::new(Mutex::new(Vec::new())),
        discord_posts: Arc::new(Mutex::new(Vec::new())),
    };

    let router = Router::new()
        .route("/bots/post", post(handle_bot_post))
        .route("/pictures", post(handle_upload))
        .route("/groups/{group_id}/messages", get(handle_history))
        .route(
            "/channels/{channel_id}/messages/{message_id}",
            get(handle_message_fetch),
        )
        .route("/channels/{channel_id}/messages", post(handle_channel_post))
        .route("/attachments/ok.png", get(handle_attachment))
        .route(
            "/attachments/missing.png",
            get(|| async { StatusCode::NOT_FOUND }),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    MockPlatform {
        base_url: format!("http://{addr}"),
        state,
    }
}

async fn handle_bot_post(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state.posts.lock().expect("posts lock").push(body);
    let status = StatusCode::from_u16(state.post_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::ACCEPTED);
    (status, String::new())
}

async fn handle_upload(State(state): State<MockState>, _body: Bytes) -> (StatusCode, String) {
    state.uploads.fetch_add(1, Ordering::SeqCst);
    let status = StatusCode::from_u16(state.upload_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::OK);
    let body = if state.upload_not_json.load(Ordering::SeqCst) {
        "upload service is down for maintenance".to_owned()
    } else if state.upload_malformed.load(Ordering::SeqCst) {
        json!({ "unexpected": true }).to_string()
    } else {
        json!({ "payload": { "url": "https://i.groupme.com/abc123" } }).to_string()
    };
    (status, body)
}

async fn handle_history(State(state): State<MockState>) -> String {
    if state.history_not_json.load(Ordering::SeqCst) {
        return "<html>gateway timeout</html>".to_owned();
    }
    let messages = state.history.lock().expect("history lock").clone();
    json!({ "response": { "messages": messages } }).to_string()
}

async fn handle_channel_post(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.discord_posts.lock().expect("discord lock").push(body);
    Json(json!({ "id": "reply-1" }))
}

async fn handle_message_fetch() -> Json<Value> {
    Json(json!({
        "author": { "username": "carol" },
        "content": "original words",
    }))
}

async fn handle_attachment() -> Bytes {
    Bytes::from_static(b"\x89PNG-not-really-a-png")
}

/// Monitored channel id used across the integration tests.
pub const CHANNEL: &str = "C_MONITORED";

/// Build a config whose GroupMe, image, and Discord endpoints all point at
/// the mock platform. `with_token` enables image relay and reactions.
pub fn test_config(base_url: &str, with_token: bool) -> GlobalConfig {
    let toml = format!(
        r#"
http_port = 0

[discord]
channel_id = "{CHANNEL}"
api_base = "{base_url}"

[groupme]
bot_id = "bot-test"
group_id = "g-1"
api_base = "{base_url}"
image_base = "{base_url}"
"#
    );
    let mut config = GlobalConfig::from_toml_str(&toml).expect("valid test config");
    config.discord.bot_token = "test-bot-token".into();
    if with_token {
        config.groupme.access_token = "img-token".into();
    }
    config
}

/// Build a plain inbound message on the monitored channel.
pub fn message(id: &str, author: &str, body: &str) -> InboundMessage {
    InboundMessage {
        message_id: id.into(),
        channel_id: CHANNEL.into(),
        author: author.into(),
        author_is_bot: false,
        body: body.into(),
        attachments: vec![],
        reply_ref: None,
        timestamp: Utc::now(),
    }
}

/// Attach an image hosted by the mock platform.
pub fn image_attachment(base_url: &str, available: bool) -> Attachment {
    let path = if available { "ok.png" } else { "missing.png" };
    Attachment {
        url: format!("{base_url}/attachments/{path}"),
        content_type: Some("image/png".into()),
        filename: path.into(),
    }
}

/// A non-image attachment.
pub fn file_attachment(filename: &str) -> Attachment {
    Attachment {
        url: "https://cdn.example/doc".into(),
        content_type: Some("application/pdf".into()),
        filename: filename.into(),
    }
}

/// A structural reply reference to a message on the monitored channel.
pub fn reply_ref(message_id: &str) -> ReplyRef {
    ReplyRef {
        channel_id: CHANNEL.into(),
        message_id: message_id.into(),
    }
}

/// A reaction on the monitored channel.
pub fn reaction(reactor: &str, emoji: &str, message_id: &str) -> ReactionEvent {
    ReactionEvent {
        reactor: reactor.into(),
        reactor_is_bot: false,
        emoji: emoji.into(),
        message_id: message_id.into(),
        channel_id: CHANNEL.into(),
    }
}

/// Posts captured so far by the mock bot-post endpoint.
pub fn captured_posts(state: &MockState) -> Vec<Value> {
    state.posts.lock().expect("posts lock").clone()
}

/// Channel messages captured so far by the mock Discord endpoint.
pub fn channel_replies(state: &MockState) -> Vec<Value> {
    state.discord_posts.lock().expect("discord lock").clone()
}
