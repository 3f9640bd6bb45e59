//! Algorithm identifier constants for the GM/T 0016 command set.
//!
//! Passed as the `alg_id` parameter of session-key and digest commands.
//! The values are the standard's `SGD_*` identifiers; anything else is
//! rejected by the peer with an invalid-parameter status.

/// Symmetric cipher identifiers (session-key export, encryption).
pub mod cipher {
    pub const SGD_SM1_ECB: u32 = 0x0000_0101;
    pub const SGD_SM1_CBC: u32 = 0x0000_0102;
    pub const SGD_SM4_ECB: u32 = 0x0000_0401;
    pub const SGD_SM4_CBC: u32 = 0x0000_0402;
}

/// Digest algorithm identifiers (`DigestInit`).
pub mod hash {
    pub const SGD_SM3: u32 = 0x0000_0001;
    pub const SGD_SHA1: u32 = 0x0000_0002;
    pub const SGD_SHA256: u32 = 0x0000_0004;
}
