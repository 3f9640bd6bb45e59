//! Application layer for ukey-client.
//!
//! The [`UkeyClient`] façade exposes one typed async operation per remote
//! command and owns the decode/classify pipeline that turns raw reply
//! frames into typed results.

pub mod client;

pub use client::{OperationError, PinType, UkeyClient};
