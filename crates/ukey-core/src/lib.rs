//! # ukey-core
//!
//! Shared library for the UKey WebSocket bridge containing the hex wire
//! codec, the JSON envelope types, the correlation-id counter, and the
//! GM/T 0016 status-code taxonomy with the response decode rules.
//!
//! This crate is pure: it has zero dependencies on sockets, async runtimes,
//! or UI frameworks.  Everything in here is a function from strings and
//! integers to strings and integers, which is what makes the decode rules
//! easy to test exhaustively.
//!
//! # Architecture overview
//!
//! The UKey control process speaks a two-layer protocol:
//!
//! - **Envelope layer** (JSON over WebSocket): `{MsgId, Method, Param}`
//!   requests and `{MsgId, Result, Response}` replies, correlated by id.
//! - **Payload layer** (hex text inside `Response`): fixed-offset binary
//!   layouts where every 32-bit integer is encoded byte-swapped relative
//!   to natural reading order.
//!
//! This crate defines:
//!
//! - **`protocol`** – the envelope types ([`protocol::envelope`]), the hex
//!   payload codec ([`protocol::codec`]), and the session-owned request-id
//!   counter ([`protocol::request_id`]).
//!
//! - **`skf`** – the GM/T 0016 ("SKF") command-set knowledge: the status
//!   code table ([`skf::status`]) and the declarative per-command response
//!   decode rules ([`skf::decode`]).

pub mod protocol;
pub mod skf;

// Re-export the most-used items at the crate root so callers can write
// `ukey_core::hex_to_u32` instead of the longer module path.
pub use protocol::codec::{
    extract_field, hex_to_text, hex_to_u32, normalize_status, reverse_byte_hex, u32_to_hex_be,
    u32_to_hex_le, CodecError,
};
pub use protocol::envelope::{CommandEnvelope, LoadModuleEnvelope, ReplyFrame};
pub use protocol::request_id::RequestIdCounter;
pub use skf::decode::{decode_response, DecodedResponse, ResponseError, ResponseRule};
pub use skf::status::{is_success, StatusEntry};
