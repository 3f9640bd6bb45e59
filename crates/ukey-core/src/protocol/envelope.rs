//! JSON envelope types exchanged with the native control process.
//!
//! The control process accepts one JSON object per WebSocket text frame and
//! answers with one JSON object per frame, correlated by `MsgId`:
//!
//! ```text
//! → {"MsgId":"7","Method":"EnumDev|<control-class-id>","Param":[true]}
//! ← {"MsgId":"7","Result":true,"Response":"000000000a000000..."}
//! ```
//!
//! A distinguished bootstrap frame loads the remote control before any
//! command is issued:
//!
//! ```text
//! → {"MsgId":"LoadModule","Module":"IActiveXCtrl"}
//! ```
//!
//! The `Response` string is either a hex payload or short decimal status
//! text depending on the command; interpreting it is the job of
//! [`crate::skf::decode`], not of this module.

use serde::{Deserialize, Serialize};

/// An outbound command envelope.
///
/// `method` carries the command name joined to the control class id with a
/// pipe, e.g. `"ConnectDev|{F0E2...}"`.  `params` is omitted from the JSON
/// entirely when the command takes no arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandEnvelope {
    /// Correlation id echoed back in the matching [`ReplyFrame`].
    #[serde(rename = "MsgId")]
    pub msg_id: String,

    /// `"<CommandName>|<ControlClassId>"`.
    #[serde(rename = "Method")]
    pub method: String,

    /// Ordered command arguments; absent when empty.
    #[serde(rename = "Param", skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<serde_json::Value>>,
}

impl CommandEnvelope {
    /// Builds an envelope, dropping an empty parameter list entirely so the
    /// `Param` key is omitted from the serialized JSON.
    pub fn new(msg_id: String, method: String, params: Vec<serde_json::Value>) -> Self {
        Self {
            msg_id,
            method,
            params: if params.is_empty() { None } else { Some(params) },
        }
    }
}

/// The bootstrap envelope that loads the remote control module.
///
/// Sent once per session before any command; the reply is correlated under
/// the fixed id `"LoadModule"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadModuleEnvelope {
    /// Always the literal `"LoadModule"`.
    #[serde(rename = "MsgId")]
    pub msg_id: String,

    /// Name of the control module to load.
    #[serde(rename = "Module")]
    pub module: String,
}

impl LoadModuleEnvelope {
    /// The fixed correlation id used by the bootstrap frame.
    pub const MSG_ID: &'static str = "LoadModule";

    pub fn new(module: &str) -> Self {
        Self {
            msg_id: Self::MSG_ID.to_string(),
            module: module.to_string(),
        }
    }
}

/// An inbound reply frame.
///
/// The peer omits `Result` and `Response` on some error paths; missing
/// fields default to `false` / `""` so a sparse frame still deserializes
/// into a well-formed (failed) reply instead of a parse error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplyFrame {
    /// Correlation id of the originating request.
    #[serde(rename = "MsgId")]
    pub msg_id: String,

    /// Transport-level success flag.  When `false` the payload is not the
    /// expected hex shape and no status decoding should be attempted.
    #[serde(rename = "Result", default)]
    pub succeeded: bool,

    /// Hex payload or short status text, depending on the command.
    #[serde(rename = "Response", default)]
    pub payload: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
