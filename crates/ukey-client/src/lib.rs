//! ukey-client library crate.
//!
//! An async client for the UKey native control process: it speaks the
//! JSON-over-WebSocket envelope protocol, multiplexes many concurrent
//! in-flight commands over one connection, and turns the peer's
//! hex-encoded fixed-layout replies into typed results.
//!
//! # Architecture
//!
//! ```text
//! caller (typed async operations)
//!         ↕
//! [ukey-client]
//!   ├── domain/           Pure types: ClientConfig
//!   ├── application/      UkeyClient façade: one operation per command,
//!   │                     decode + status classification
//!   └── infrastructure/
//!         └── session/    WsSession: WebSocket connection, correlation
//!                         ids, pending-request table, reader task
//!         ↕
//! native control process (JSON envelopes over wss://, hex payloads)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async).
//! - `application` depends on `domain`, `ukey-core`, and the session.
//! - `infrastructure` depends on `tokio` and `tokio-tungstenite`.
//!
//! # Example
//!
//! ```no_run
//! use ukey_client::{ClientConfig, UkeyClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = UkeyClient::connect(ClientConfig {
//!     control_class_id: "{F0E2...}".to_string(),
//!     ..ClientConfig::default()
//! })
//! .await?;
//!
//! client.load_module().await?;
//! let devices = client.enum_dev(true).await?;
//! let dev = client.connect_dev(&devices[0]).await?;
//! # Ok(())
//! # }
//! ```

/// Domain layer: pure configuration types (no I/O).
pub mod domain;

/// Application layer: the typed command façade and its error type.
pub mod application;

/// Infrastructure layer: the WebSocket transport session and correlator.
pub mod infrastructure;

pub use application::{OperationError, PinType, UkeyClient};
pub use domain::ClientConfig;
pub use infrastructure::session::{SessionState, WsSession};

// Re-export the typed payload values so callers don't need a direct
// ukey-core dependency for ordinary use.
pub use ukey_core::skf::decode::{
    ContainerType, DeviceInfo, EccPublicKey, EccSignature, FileInfo, FileRight, Handle,
    RsaPublicKey,
};
