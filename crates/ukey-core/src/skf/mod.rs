//! GM/T 0016 command-set knowledge: the status-code taxonomy and the
//! declarative response decode rules.

pub mod algorithm;
pub mod decode;
pub mod status;

pub use decode::{decode_response, DecodedResponse, ResponseError, ResponseRule};
pub use status::{by_code, by_hex_str, by_stable_id, is_success, StatusEntry};
