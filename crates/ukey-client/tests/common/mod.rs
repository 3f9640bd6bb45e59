//! Shared test support: an in-process WebSocket peer that plays the role
//! of the native control process.
//!
//! The peer accepts one connection, parses each inbound envelope, and asks
//! the test's handler what frames to send back.  Returning several frames
//! (or none) lets tests script duplicates, out-of-order replies, and
//! silence.

// Each integration-test binary compiles this module independently and uses
// a different subset of the helpers.
#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use ukey_client::ClientConfig;
use ukey_core::u32_to_hex_le;

/// The control class id used by every test configuration.
pub const TEST_CLSID: &str = "{TEST-CLSID}";

/// Installs a per-test log subscriber once; `RUST_LOG` controls the level.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Spawns a scripted peer on an ephemeral port and returns its `ws://` URL.
///
/// `handler` is invoked once per inbound envelope with the parsed JSON
/// object; every string it returns is sent back as one text frame, in
/// order.
pub async fn spawn_peer<F>(mut handler: F) -> String
where
    F: FnMut(Value) -> Vec<String> + Send + 'static,
{
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let ws = accept_async(stream).await.expect("WebSocket handshake");
        let (mut tx, mut rx) = ws.split();

        while let Some(Ok(msg)) = rx.next().await {
            match msg {
                Message::Text(text) => {
                    let request: Value = serde_json::from_str(&text).expect("request is JSON");
                    for reply in handler(request) {
                        if tx.send(Message::Text(reply)).await.is_err() {
                            return;
                        }
                    }
                }
                Message::Close(_) => return,
                _ => {}
            }
        }
    });

    format!("ws://{addr}")
}

/// A client configuration pointed at the test peer, with a short timeout
/// so timeout tests finish quickly.
pub fn test_config(ws_url: String) -> ClientConfig {
    ClientConfig {
        ws_url,
        control_class_id: TEST_CLSID.to_string(),
        module_name: "IActiveXCtrl".to_string(),
        request_timeout: Duration::from_millis(500),
    }
}

/// Builds a reply frame for the given request's `MsgId`.
pub fn reply_to(request: &Value, result: bool, response: &str) -> String {
    let msg_id = request["MsgId"].as_str().expect("request has MsgId");
    json!({"MsgId": msg_id, "Result": result, "Response": response}).to_string()
}

/// The command name of a request (the `Method` field before the `|`).
///
/// The `LoadModule` bootstrap frame has no `Method`; its `MsgId` doubles
/// as the command name.
pub fn command_of(request: &Value) -> String {
    match request["Method"].as_str() {
        Some(method) => method.split('|').next().unwrap_or("").to_string(),
        None => request["MsgId"].as_str().unwrap_or("").to_string(),
    }
}

/// The wire encoding of a status/integer word (byte-swapped hex).
pub fn word(value: u32) -> String {
    u32_to_hex_le(value)
}

/// A successful `[status][payload...]` response with status 0.
pub fn ok_payload(rest: &str) -> String {
    format!("{}{rest}", word(0))
}

/// Polls `probe` every few milliseconds until it returns true or the
/// deadline passes.  Used for assertions about background effects (e.g.
/// the unmatched-frame counter) without fixed sleeps.
pub async fn wait_until<F>(mut probe: F, deadline: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let start = tokio::time::Instant::now();
    while start.elapsed() < deadline {
        if probe() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    probe()
}
