//! Declarative response decode rules for the GM/T 0016 command set.
//!
//! The source protocol has about forty commands, but only a handful of
//! distinct reply layouts.  Instead of one hand-written decoder per
//! command, each command names a [`ResponseRule`] and a single generic
//! [`decode_response`] function interprets the payload.
//!
//! All offsets below are **byte** offsets into the hex payload (one byte =
//! two hex characters).  Unless a rule says otherwise, the payload starts
//! with a 4-byte byte-swapped status word; decoding proceeds only when the
//! status is `0x00000000`.
//!
//! ```text
//! Handle:        [status:4][handle:4]
//! NameList:      [status:4][size:4][names: size-2 bytes, NUL-separated]
//! Blob:          [status:4][len:4][data: len bytes of plain hex]
//! RsaKeyPair:    [status:4][alg_id:4][bits:4][modulus field:256][exponent:4]
//! EccKeyPair:    [status:4][bits:4][x:64][y:64]
//! EccSignature:  [status:4][r:64][s:64]
//! DeviceInfo:    [..][label: bytes 134..166][serial: bytes 166..198]
//! FileInfo:      [status:4][name:32][size:4][read:4][write:4]
//! PinGuarded:    [status:4][remaining attempts:4 — failure path only]
//! Status:        whole payload is one status (decimal text or hex word)
//! ```

use std::fmt;

use thiserror::Error;

use crate::protocol::codec::{extract_field, hex_to_text, hex_to_u32, normalize_status, CodecError};

// ── Typed payload values ──────────────────────────────────────────────────────

/// An opaque 32-bit handle issued by the peer.
///
/// Handles identify devices, applications, containers, session keys, and
/// hash contexts.  They are hierarchical on the peer's side (Device →
/// Application → Container → Key/Session/Hash), but this library never
/// validates the hierarchy — it only threads values through and propagates
/// the peer's rejection of a stale handle faithfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub u32);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of key material held by a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerType {
    /// No key pair has been generated or imported yet.
    Empty,
    Rsa,
    Ecc,
    /// A type word this library does not recognise.
    Unknown(u32),
}

impl From<u32> for ContainerType {
    fn from(word: u32) -> Self {
        match word {
            0 => ContainerType::Empty,
            1 => ContainerType::Rsa,
            2 => ContainerType::Ecc,
            other => ContainerType::Unknown(other),
        }
    }
}

/// Access right attached to a stored file, for reading or writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRight {
    /// Nobody may perform the operation.
    Nobody,
    /// Requires the admin PIN.
    Admin,
    /// Requires the user PIN.
    User,
    /// No authentication required.
    Anyone,
    Unknown(u32),
}

impl From<u32> for FileRight {
    fn from(word: u32) -> Self {
        match word {
            0x00 => FileRight::Nobody,
            0x01 => FileRight::Admin,
            0x10 => FileRight::User,
            0xff => FileRight::Anyone,
            other => FileRight::Unknown(other),
        }
    }
}

impl FileRight {
    /// The wire word for this right, used when creating files.
    pub fn word(&self) -> u32 {
        match self {
            FileRight::Nobody => 0x00,
            FileRight::Admin => 0x01,
            FileRight::User => 0x10,
            FileRight::Anyone => 0xff,
            FileRight::Unknown(w) => *w,
        }
    }
}

/// Label and serial number reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub label: String,
    pub serial_number: String,
}

/// Public half of a freshly generated RSA key pair.
///
/// The modulus field on the wire is a fixed 256-byte area with the actual
/// modulus right-aligned by key length; only the significant bytes are
/// kept here, as hex text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub alg_id: u32,
    /// Modulus length in bits (1024 or 2048 in practice).
    pub bits: u32,
    /// Significant modulus bytes, `bits / 8 * 2` hex characters.
    pub modulus: String,
    /// 4-byte public exponent field, as raw hex.
    pub public_exponent: String,
}

/// Public half of a freshly generated ECC (SM2) key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EccPublicKey {
    pub bits: u32,
    /// 64-byte X coordinate field as hex (the curve point occupies the low half).
    pub x: String,
    /// 64-byte Y coordinate field as hex.
    pub y: String,
}

/// An ECC signature as returned by the peer.
///
/// `r` and `s` are the raw 64-byte big-endian fields; the significant
/// signature is the low 32 bytes of each, concatenated into `signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EccSignature {
    pub r: String,
    pub s: String,
    /// `r[32..64] || s[32..64]`, 128 hex characters.
    pub signature: String,
}

/// Attributes of a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    /// File size in bytes.
    pub size: u32,
    pub read_right: FileRight,
    pub write_right: FileRight,
}

// ── Rule table ────────────────────────────────────────────────────────────────

/// The reply layout a command expects.
///
/// This is the declarative table consumed by [`decode_response`]; the
/// façade assigns one rule per command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseRule {
    /// The whole payload is one status word (decimal text or swapped hex).
    Status,
    /// Like a leading status word, but a failure carries the remaining
    /// PIN attempts at offset 4.
    PinGuarded,
    /// Handle at offset 4.
    Handle,
    /// Container-type word at offset 4.
    ContainerType,
    /// Length-prefixed, NUL-separated ASCII name list.
    NameList,
    /// Length-prefixed plain hex blob.
    Blob,
    /// Fixed label/serial byte ranges.
    DeviceInfo,
    /// RSA public-key blob.
    RsaKeyPair,
    /// ECC public-key blob.
    EccKeyPair,
    /// ECC signature blob.
    EccSignature,
    /// File attribute struct.
    FileInfo,
}

/// A successfully decoded reply payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    /// Status-only commands carry no payload beyond success itself.
    Unit,
    Handle(Handle),
    ContainerType(ContainerType),
    Names(Vec<String>),
    Blob(String),
    DeviceInfo(DeviceInfo),
    RsaKeyPair(RsaPublicKey),
    EccKeyPair(EccPublicKey),
    EccSignature(EccSignature),
    FileInfo(FileInfo),
}

/// Why a payload did not decode to a success value.
///
/// The two variants are deliberately disjoint error classes: `Status` is
/// the peer reporting a failure (classified later against the status
/// table), `Malformed` is a payload that contradicts its own rule (too
/// short, bad hex, empty enumeration).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The embedded status word is non-zero.
    #[error("peer status 0x{code:08x}")]
    Status {
        code: u32,
        /// Remaining PIN attempts, only for PIN-guarded commands
        /// (`0` when the field was undecodable).
        remaining_attempts: Option<u32>,
    },

    /// The payload does not match the expected layout.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl From<CodecError> for ResponseError {
    fn from(e: CodecError) -> Self {
        ResponseError::Malformed(e.to_string())
    }
}

// ── Generic decoder ───────────────────────────────────────────────────────────

/// Decodes a reply payload according to its command's [`ResponseRule`].
///
/// # Errors
///
/// [`ResponseError::Status`] when the peer reported a non-zero status;
/// [`ResponseError::Malformed`] when the payload is too short or otherwise
/// contradicts the rule.  Only a `0x00000000` status ever yields `Ok`.
pub fn decode_response(rule: ResponseRule, payload: &str) -> Result<DecodedResponse, ResponseError> {
    match rule {
        ResponseRule::Status => {
            let code = normalize_status(payload)?;
            expect_success(code)?;
            Ok(DecodedResponse::Unit)
        }

        ResponseRule::PinGuarded => {
            let code = status_word(payload)?;
            if code != 0 {
                // The remaining-attempts field sits after the status word;
                // a truncated payload degrades to 0 rather than masking the
                // status failure with a decode failure.
                let remaining = extract_field(payload, 4, 4)
                    .ok()
                    .and_then(|f| hex_to_u32(f).ok())
                    .unwrap_or(0);
                return Err(ResponseError::Status {
                    code,
                    remaining_attempts: Some(remaining),
                });
            }
            Ok(DecodedResponse::Unit)
        }

        ResponseRule::Handle => {
            expect_success(status_word(payload)?)?;
            let handle = hex_to_u32(extract_field(payload, 4, 4)?)?;
            Ok(DecodedResponse::Handle(Handle(handle)))
        }

        ResponseRule::ContainerType => {
            expect_success(status_word(payload)?)?;
            let word = hex_to_u32(extract_field(payload, 4, 4)?)?;
            Ok(DecodedResponse::ContainerType(ContainerType::from(word)))
        }

        ResponseRule::NameList => {
            expect_success(status_word(payload)?)?;
            let size = hex_to_u32(extract_field(payload, 4, 4)?)? as usize;
            if size < 1 {
                // Distinct from a peer-reported status failure: the peer
                // claimed success but declared an empty element block.
                return Err(ResponseError::Malformed("empty enumeration (size < 1)".into()));
            }
            // The element block conventionally ends with one extra
            // separator pair, which is not part of any name.
            let body_len = size.saturating_sub(2);
            let names_hex = extract_field(payload, 8, body_len)?;
            let text = hex_to_text(names_hex)?;
            let names = text.split('\0').map(str::to_string).collect();
            Ok(DecodedResponse::Names(names))
        }

        ResponseRule::Blob => {
            expect_success(status_word(payload)?)?;
            let len = hex_to_u32(extract_field(payload, 4, 4)?)? as usize;
            let blob = extract_field(payload, 8, len)?;
            Ok(DecodedResponse::Blob(blob.to_string()))
        }

        ResponseRule::DeviceInfo => {
            expect_success(status_word(payload)?)?;
            let label = hex_to_text(extract_field(payload, 134, 32)?)?;
            let serial_number = hex_to_text(extract_field(payload, 166, 32)?)?;
            Ok(DecodedResponse::DeviceInfo(DeviceInfo { label, serial_number }))
        }

        ResponseRule::RsaKeyPair => {
            expect_success(status_word(payload)?)?;
            let alg_id = hex_to_u32(extract_field(payload, 4, 4)?)?;
            let bits = hex_to_u32(extract_field(payload, 8, 4)?)?;
            let len = (bits / 8) as usize;
            if len == 0 || len > 256 {
                return Err(ResponseError::Malformed(format!(
                    "modulus bit length out of range: {bits}"
                )));
            }
            // The 256-byte modulus field starts at byte 12 with the actual
            // modulus right-aligned in it.
            let modulus = extract_field(payload, 12 + 256 - len, len)?;
            let public_exponent = extract_field(payload, 268, 4)?;
            Ok(DecodedResponse::RsaKeyPair(RsaPublicKey {
                alg_id,
                bits,
                modulus: modulus.to_string(),
                public_exponent: public_exponent.to_string(),
            }))
        }

        ResponseRule::EccKeyPair => {
            expect_success(status_word(payload)?)?;
            let bits = hex_to_u32(extract_field(payload, 4, 4)?)?;
            let x = extract_field(payload, 8, 64)?;
            let y = extract_field(payload, 72, 64)?;
            Ok(DecodedResponse::EccKeyPair(EccPublicKey {
                bits,
                x: x.to_string(),
                y: y.to_string(),
            }))
        }

        ResponseRule::EccSignature => {
            expect_success(status_word(payload)?)?;
            let r = extract_field(payload, 4, 64)?;
            let s = extract_field(payload, 68, 64)?;
            // Each 64-byte field stores the significant 32 bytes in its low
            // half; the concatenation of those halves is the signature.
            let signature = format!("{}{}", &r[64..128], &s[64..128]);
            Ok(DecodedResponse::EccSignature(EccSignature {
                r: r.to_string(),
                s: s.to_string(),
                signature,
            }))
        }

        ResponseRule::FileInfo => {
            expect_success(status_word(payload)?)?;
            let name = hex_to_text(extract_field(payload, 4, 32)?)?;
            let size = hex_to_u32(extract_field(payload, 36, 4)?)?;
            let read_right = FileRight::from(hex_to_u32(extract_field(payload, 40, 4)?)?);
            let write_right = FileRight::from(hex_to_u32(extract_field(payload, 44, 4)?)?);
            Ok(DecodedResponse::FileInfo(FileInfo {
                name,
                size,
                read_right,
                write_right,
            }))
        }
    }
}

/// Reads the leading byte-swapped status word of a payload.
fn status_word(payload: &str) -> Result<u32, ResponseError> {
    Ok(hex_to_u32(extract_field(payload, 0, 4)?)?)
}

fn expect_success(code: u32) -> Result<(), ResponseError> {
    if code != 0 {
        return Err(ResponseError::Status {
            code,
            remaining_attempts: None,
        });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
