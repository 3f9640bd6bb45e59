//! Infrastructure layer for ukey-client.
//!
//! All I/O lives here: the WebSocket connection to the native control
//! process, the per-session reader task, and the pending-request table
//! that correlates replies back to their callers.

pub mod session;

pub use session::{SessionError, SessionState, WsSession};
