//! Protocol module containing the hex payload codec, the JSON envelope
//! types, and the correlation-id counter.

pub mod codec;
pub mod envelope;
pub mod request_id;

pub use codec::CodecError;
pub use envelope::{CommandEnvelope, LoadModuleEnvelope, ReplyFrame};
pub use request_id::RequestIdCounter;
