//! Discord Gateway WebSocket feed.
//!
//! Connects to the Gateway, identifies with message and reaction intents,
//! keeps the heartbeat, and translates `MESSAGE_CREATE` and
//! `MESSAGE_REACTION_ADD` dispatches into typed [`InboundEvent`]s on an
//! mpsc channel consumed serially by the router.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use crate::config::DiscordConfig;
use crate::health::BridgeStatus;
use crate::models::event::{
    Attachment, InboundEvent, InboundMessage, ReactionEvent, ReplyRef,
};
use crate::{AppError, Result};

/// GUILDS | GUILD_MESSAGES | GUILD_MESSAGE_REACTIONS | MESSAGE_CONTENT
const GATEWAY_INTENTS: u64 = 1 | 512 | 1024 | 32768;

/// Fallback heartbeat interval when the Hello payload is malformed.
const DEFAULT_HEARTBEAT_MS: u64 = 41_250;

/// Delay between reconnect attempts after a dropped connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Spawn the gateway task.
///
/// The task reconnects on connection loss and exits when `shutdown`
/// flips to `true` or the event channel closes. `status` readiness is set
/// after a successful Identify and cleared whenever the session ends.
pub fn spawn(
    config: DiscordConfig,
    events: mpsc::Sender<InboundEvent>,
    status: Arc<BridgeStatus>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if *shutdown.borrow() {
                break;
            }
            let outcome = run_connection(&config, &events, &status, &mut shutdown).await;
            status.set_ready(false);
            match outcome {
                Ok(ConnectionEnd::Shutdown) => break,
                Ok(ConnectionEnd::Dropped) => {
                    warn!("gateway connection dropped; reconnecting");
                }
                Err(err) => {
                    error!(%err, "gateway connection failed; reconnecting");
                }
            }
            tokio::select! {
                () = sleep(RECONNECT_DELAY) => {}
                _ = shutdown.changed() => break,
            }
        }
        info!("gateway task exiting");
    })
}

enum ConnectionEnd {
    Shutdown,
    Dropped,
}

async fn run_connection(
    config: &DiscordConfig,
    events: &mpsc::Sender<InboundEvent>,
    status: &BridgeStatus,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<ConnectionEnd> {
    let gateway_url = fetch_gateway_url(config).await?;
    info!(url = %gateway_url, "connecting to discord gateway");

    let (ws, _) = tokio_tungstenite::connect_async(&gateway_url)
        .await
        .map_err(|err| AppError::Gateway(format!("websocket connect failed: {err}")))?;
    let (mut writer, mut reader) = ws.split();

    // Hello (opcode 10) carries the heartbeat interval.
    let heartbeat_ms = match reader.next().await {
        Some(Ok(msg)) => {
            let payload: Value =
                serde_json::from_str(msg.to_text().unwrap_or("{}")).unwrap_or_default();
            if payload["op"].as_u64() == Some(10) {
                payload["d"]["heartbeat_interval"]
                    .as_u64()
                    .unwrap_or(DEFAULT_HEARTBEAT_MS)
            } else {
                warn!("expected hello, got op {:?}", payload["op"].as_u64());
                DEFAULT_HEARTBEAT_MS
            }
        }
        _ => return Err(AppError::Gateway("no hello from gateway".into())),
    };
    debug!(heartbeat_ms, "gateway hello received");

    let identify = json!({
        "op": 2,
        "d": {
            "token": config.bot_token,
            "intents": GATEWAY_INTENTS,
            "properties": {
                "os": "linux",
                "browser": "groupme-bridge",
                "device": "groupme-bridge"
            }
        }
    });
    writer
        .send(WsMessage::Text(identify.to_string().into()))
        .await
        .map_err(|err| AppError::Gateway(format!("identify failed: {err}")))?;
    status.set_ready(true);

    let mut heartbeat = interval(Duration::from_millis(heartbeat_ms));
    heartbeat.tick().await; // first tick fires immediately
    let mut last_seq: Option<u64> = None;

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return Ok(ConnectionEnd::Shutdown);
                }
            }
            _ = heartbeat.tick() => {
                let beat = json!({ "op": 1, "d": last_seq });
                if let Err(err) = writer.send(WsMessage::Text(beat.to_string().into())).await {
                    warn!(%err, "heartbeat failed");
                    return Ok(ConnectionEnd::Dropped);
                }
            }
            frame = reader.next() => {
                let Some(frame) = frame else {
                    return Ok(ConnectionEnd::Dropped);
                };
                let msg = match frame {
                    Ok(msg) => msg,
                    Err(err) => {
                        warn!(%err, "websocket error");
                        return Ok(ConnectionEnd::Dropped);
                    }
                };
                let Ok(text) = msg.to_text() else { continue };
                let Ok(payload) = serde_json::from_str::<Value>(text) else { continue };

                if let Some(seq) = payload["s"].as_u64() {
                    last_seq = Some(seq);
                }

                let Some(event) = translate_dispatch(&payload) else { continue };
                if events.send(event).await.is_err() {
                    debug!("event channel closed");
                    return Ok(ConnectionEnd::Shutdown);
                }
            }
        }
    }
}

async fn fetch_gateway_url(config: &DiscordConfig) -> Result<String> {
    let response = reqwest::Client::new()
        .get(format!("{}/gateway/bot", config.api_base))
        .header("Authorization", format!("Bot {}", config.bot_token))
        .send()
        .await?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        return Err(AppError::FetchFailed(status));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|err| AppError::ParseFailed(format!("invalid gateway response: {err}")))?;
    let url = body["url"]
        .as_str()
        .ok_or_else(|| AppError::ParseFailed("missing url in gateway response".into()))?;
    Ok(format!("{url}/?v=10&encoding=json"))
}

/// Translate a Gateway dispatch payload into an inbound event.
///
/// Returns `None` for anything other than `MESSAGE_CREATE` and
/// `MESSAGE_REACTION_ADD`.
fn translate_dispatch(payload: &Value) -> Option<InboundEvent> {
    match payload["t"].as_str() {
        Some("MESSAGE_CREATE") => translate_message(&payload["d"]),
        Some("MESSAGE_REACTION_ADD") => translate_reaction(&payload["d"]),
        _ => None,
    }
}

fn translate_message(data: &Value) -> Option<InboundEvent> {
    let message_id = data["id"].as_str()?.to_owned();
    let channel_id = data["channel_id"].as_str()?.to_owned();
    let author = data
        .pointer("/author/global_name")
        .and_then(Value::as_str)
        .or_else(|| data.pointer("/author/username").and_then(Value::as_str))
        .unwrap_or("unknown")
        .to_owned();
    let author_is_bot = data.pointer("/author/bot").and_then(Value::as_bool) == Some(true);

    let attachments = data["attachments"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|entry| {
                    Some(Attachment {
                        url: entry["url"].as_str()?.to_owned(),
                        content_type: entry["content_type"].as_str().map(str::to_owned),
                        filename: entry["filename"].as_str().unwrap_or("file").to_owned(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let reply_ref = data
        .get("message_reference")
        .and_then(|reference| {
            Some(ReplyRef {
                channel_id: reference["channel_id"]
                    .as_str()
                    .unwrap_or(channel_id.as_str())
                    .to_owned(),
                message_id: reference["message_id"].as_str()?.to_owned(),
            })
        });

    let timestamp = data["timestamp"]
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map_or_else(Utc::now, |parsed| parsed.with_timezone(&Utc));

    Some(InboundEvent::NewMessage(InboundMessage {
        message_id,
        channel_id,
        author,
        author_is_bot,
        body: data["content"].as_str().unwrap_or_default().to_owned(),
        attachments,
        reply_ref,
        timestamp,
    }))
}

fn translate_reaction(data: &Value) -> Option<InboundEvent> {
    let emoji = data.pointer("/emoji/name").and_then(Value::as_str)?.to_owned();
    let reactor = data
        .pointer("/member/user/global_name")
        .and_then(Value::as_str)
        .or_else(|| data.pointer("/member/user/username").and_then(Value::as_str))
        .unwrap_or("someone")
        .to_owned();
    let reactor_is_bot =
        data.pointer("/member/user/bot").and_then(Value::as_bool) == Some(true);

    Some(InboundEvent::ReactionAdded(ReactionEvent {
        reactor,
        reactor_is_bot,
        emoji,
        message_id: data["message_id"].as_str()?.to_owned(),
        channel_id: data["channel_id"].as_str()?.to_owned(),
    }))
}
