//! WebSocket transport session and request correlator.
//!
//! One [`WsSession`] owns one WebSocket connection to the native control
//! process.  Many callers may have commands in flight simultaneously; each
//! outbound envelope carries a fresh correlation id, and a single reader
//! task routes every inbound frame back to the caller that is waiting on
//! that id.  There is **no ordering guarantee** between distinct commands:
//! replies resolve in whatever order the peer emits them.
//!
//! # Correlation invariants
//!
//! - An id is never reused while a request with that id is pending (the
//!   counter is session-owned and monotonic).
//! - A pending request resolves **at most once**: the completion sender is
//!   removed from the table *before* it is fired, so a duplicate frame for
//!   the same id finds nothing and is counted as unmatched.
//! - A pending request is never left dangling: it resolves with a frame,
//!   fails on timeout, or fails with a connection-closed error when the
//!   session shuts down — whichever comes first.
//!
//! # Unmatched frames
//!
//! A frame whose id matches no pending request (unknown id, or an id that
//! already resolved) is dropped.  That tolerance is part of the protocol's
//! design, but a desync is worth noticing, so every drop increments the
//! counter behind [`WsSession::unmatched_frames`] and logs a warning.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use anyhow::Context;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::Message as WsMessage,
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use ukey_core::protocol::envelope::{CommandEnvelope, LoadModuleEnvelope, ReplyFrame};
use ukey_core::protocol::request_id::RequestIdCounter;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

// ── Public types ──────────────────────────────────────────────────────────────

/// Lifecycle state of a transport session.
///
/// ```text
/// Disconnected → Connecting → Open → Closing → Closed
///                     └──────────────────────────┘ (handshake failure)
/// ```
///
/// `Disconnected` is the notional state before [`WsSession::connect`] runs;
/// a constructed session is already past it.  Any transport error moves
/// the session straight to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Transport-level failures of a single request.
///
/// These are all "class 1" errors in the protocol's taxonomy: the reply
/// payload never arrived, so no status decoding was possible.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session is not in the `Open` state.
    #[error("session is not open (state: {0:?})")]
    NotOpen(SessionState),

    /// The envelope could not be serialized (should not happen for
    /// well-formed parameters).
    #[error("failed to serialize envelope: {0}")]
    Serialize(String),

    /// Writing the frame to the WebSocket failed.
    #[error("failed to send frame: {0}")]
    Send(String),

    /// The session closed before a reply for this request arrived.
    #[error("connection closed before a reply arrived")]
    ConnectionClosed,

    /// No reply arrived within the configured request timeout.
    #[error("no reply within {0:?}")]
    Timeout(Duration),
}

// ── Shared correlator state ───────────────────────────────────────────────────

/// State shared between callers and the reader task.
struct Shared {
    ids: RequestIdCounter,
    /// Pending completions keyed by correlation id.  `None` once the
    /// session has shut down, so late registrations fail instead of
    /// leaking.
    pending: StdMutex<Option<HashMap<String, oneshot::Sender<ReplyFrame>>>>,
    state: StdMutex<SessionState>,
    unmatched: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            ids: RequestIdCounter::new(),
            pending: StdMutex::new(Some(HashMap::new())),
            state: StdMutex::new(SessionState::Connecting),
            unmatched: AtomicU64::new(0),
        }
    }

    fn state(&self) -> SessionState {
        *self.state.lock().expect("state lock poisoned")
    }

    fn set_state(&self, next: SessionState) {
        *self.state.lock().expect("state lock poisoned") = next;
    }

    /// Registers a completion under `id`.  Fails when the session has
    /// already shut down.
    fn register(&self, id: &str, tx: oneshot::Sender<ReplyFrame>) -> Result<(), SessionError> {
        let mut guard = self.pending.lock().expect("pending lock poisoned");
        match guard.as_mut() {
            Some(map) => {
                map.insert(id.to_string(), tx);
                Ok(())
            }
            None => Err(SessionError::ConnectionClosed),
        }
    }

    /// Removes the completion for `id`, if still pending.
    fn deregister(&self, id: &str) {
        if let Some(map) = self.pending.lock().expect("pending lock poisoned").as_mut() {
            map.remove(id);
        }
    }

    /// Routes an inbound frame to its waiting caller.
    ///
    /// The completion is removed from the table before it is fired, which
    /// is what makes resolution at-most-once: a second frame with the same
    /// id finds nothing and is counted as unmatched.
    fn dispatch(&self, frame: ReplyFrame) {
        let sender = self
            .pending
            .lock()
            .expect("pending lock poisoned")
            .as_mut()
            .and_then(|map| map.remove(&frame.msg_id));

        match sender {
            Some(tx) => {
                // The caller may have timed out and dropped its receiver;
                // that is not an error.
                let _ = tx.send(frame);
            }
            None => {
                self.unmatched.fetch_add(1, Ordering::Relaxed);
                warn!(msg_id = %frame.msg_id, "dropping frame with no pending request");
            }
        }
    }

    /// Moves the session to `Closed` and fails every pending request.
    ///
    /// Dropping a completion sender wakes its receiver with a closed-channel
    /// error, which callers surface as [`SessionError::ConnectionClosed`].
    fn shutdown(&self, reason: &str) {
        self.set_state(SessionState::Closed);
        let drained = self
            .pending
            .lock()
            .expect("pending lock poisoned")
            .take()
            .map(|map| map.len())
            .unwrap_or(0);
        if drained > 0 {
            info!(pending = drained, "session shut down ({reason}); failing pending requests");
        } else {
            debug!("session shut down ({reason})");
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// A connected WebSocket session to the native control process.
///
/// Cheap to share: callers typically wrap it in an `Arc` (the façade does)
/// and issue concurrent requests without further locking — identity is
/// carried per request by the correlation id, not by shared cursor state.
pub struct WsSession {
    shared: Arc<Shared>,
    sink: tokio::sync::Mutex<WsSink>,
    request_timeout: Duration,
    reader: tokio::task::JoinHandle<()>,
}

impl WsSession {
    /// Opens a WebSocket connection to `url` and starts the reader task.
    ///
    /// # Errors
    ///
    /// Returns an error if the WebSocket handshake fails (control process
    /// not running, TLS failure, wrong URL).  The session is `Closed` in
    /// that case and was never `Open`.
    pub async fn connect(url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let shared = Arc::new(Shared::new());

        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| {
                shared.set_state(SessionState::Closed);
                e
            })
            .with_context(|| format!("failed to connect to UKey control process at {url}"))?;

        info!(%url, "WebSocket session established");
        shared.set_state(SessionState::Open);

        // Split into independently owned halves: the sink stays with the
        // session for senders, the stream moves into the reader task.
        let (sink, stream) = ws_stream.split();

        let reader_shared = Arc::clone(&shared);
        let reader = tokio::spawn(async move {
            read_frames(stream, reader_shared).await;
        });

        Ok(Self {
            shared,
            sink: tokio::sync::Mutex::new(sink),
            request_timeout,
            reader,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Number of inbound frames dropped because no request was pending
    /// under their id.  A steadily growing value indicates protocol
    /// desync with the peer.
    pub fn unmatched_frames(&self) -> u64 {
        self.shared.unmatched.load(Ordering::Relaxed)
    }

    /// Sends one command and awaits its correlated reply.
    ///
    /// `method` is the full `"<Command>|<control-class-id>"` string.  Any
    /// number of `request` calls may be outstanding concurrently; replies
    /// resolve in peer order, not send order.
    ///
    /// # Errors
    ///
    /// All failures are transport-level ([`SessionError`]); a reply frame
    /// with `Result: false` is *not* an error here — interpreting the
    /// flag belongs to the façade.
    pub async fn request(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<ReplyFrame, SessionError> {
        let id = self.shared.ids.next_id();
        let envelope = CommandEnvelope::new(id.clone(), method.to_string(), params);
        let text = serde_json::to_string(&envelope)
            .map_err(|e| SessionError::Serialize(e.to_string()))?;
        self.send_and_await(&id, text).await
    }

    /// Sends the `LoadModule` bootstrap frame and awaits its reply.
    ///
    /// Must complete successfully before any command is issued; the reply
    /// is correlated under the fixed id `"LoadModule"`.
    pub async fn load_module(&self, module: &str) -> Result<ReplyFrame, SessionError> {
        let envelope = LoadModuleEnvelope::new(module);
        let text = serde_json::to_string(&envelope)
            .map_err(|e| SessionError::Serialize(e.to_string()))?;
        self.send_and_await(LoadModuleEnvelope::MSG_ID, text).await
    }

    /// Registers a pending completion, writes the frame, and awaits the
    /// reply under the per-request timeout.
    async fn send_and_await(&self, id: &str, text: String) -> Result<ReplyFrame, SessionError> {
        let state = self.state();
        if state != SessionState::Open {
            return Err(SessionError::NotOpen(state));
        }

        let (tx, rx) = oneshot::channel();
        self.shared.register(id, tx)?;

        debug!(msg_id = %id, "sending command frame");
        {
            let mut sink = self.sink.lock().await;
            if let Err(e) = sink.send(WsMessage::Text(text)).await {
                // The frame never left; the registration must not linger.
                self.shared.deregister(id);
                return Err(SessionError::Send(e.to_string()));
            }
        }

        match timeout(self.request_timeout, rx).await {
            Ok(Ok(frame)) => Ok(frame),
            // Sender dropped: the session shut down while we were waiting.
            Ok(Err(_)) => Err(SessionError::ConnectionClosed),
            Err(_) => {
                // Timed out: remove the entry so a late reply counts as
                // unmatched instead of resolving into the void, and so the
                // table does not grow without bound.
                self.shared.deregister(id);
                warn!(msg_id = %id, "request timed out after {:?}", self.request_timeout);
                Err(SessionError::Timeout(self.request_timeout))
            }
        }
    }

    /// Closes the session.
    ///
    /// Every still-pending request fails with a connection-closed error;
    /// none is left unresolved.  Safe to call more than once.
    pub async fn close(&self) {
        self.shared.set_state(SessionState::Closing);
        {
            let mut sink = self.sink.lock().await;
            // Best effort: the peer may already be gone.
            let _ = sink.send(WsMessage::Close(None)).await;
        }
        self.shared.shutdown("closed by caller");
        self.reader.abort();
    }
}

// ── Reader task ───────────────────────────────────────────────────────────────

/// Reads frames until the stream ends, dispatching each reply to its
/// pending request.  On exit the session is shut down and all remaining
/// pending requests fail.
async fn read_frames(mut stream: WsStream, shared: Arc<Shared>) {
    while let Some(item) = stream.next().await {
        match item {
            Ok(WsMessage::Text(text)) => match serde_json::from_str::<ReplyFrame>(&text) {
                Ok(frame) => shared.dispatch(frame),
                Err(e) => warn!("discarding malformed frame from peer: {e}"),
            },
            Ok(WsMessage::Binary(_)) => {
                // The envelope protocol is text-only.
                warn!("unexpected binary frame from peer (ignored)");
            }
            Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => {
                // Protocol-level keepalive; tungstenite answers pings
                // automatically on the next sink write.
            }
            Ok(WsMessage::Close(_)) => {
                debug!("peer sent Close frame");
                break;
            }
            Ok(WsMessage::Frame(_)) => {}
            Err(e) => {
                warn!("WebSocket read error: {e}");
                break;
            }
        }
    }
    shared.shutdown("transport ended");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
//
// The correlator logic (register/dispatch/shutdown) is tested here against
// the Shared state directly; the full network path, including the reader
// task and timeouts, is covered by tests/session_integration.rs.
