//! Hex payload codec for the UKey control protocol.
//!
//! The control process returns binary payloads as hexadecimal text (two
//! characters per byte).  Multi-byte integers inside those payloads use a
//! peculiar convention: the four byte pairs of a 32-bit value appear in
//! **reverse group order** relative to natural big-endian reading.  The
//! value `0x0a000005` therefore arrives on the wire as `"05000a0a"`.
//!
//! ```text
//! natural:  0a 00 00 05
//! on wire:  05 00 00 0a   →  "05000a0a"
//! ```
//!
//! Every function here is pure and returns a [`CodecError`] instead of
//! panicking; the fixed-offset decode rules in [`crate::skf::decode`] rely
//! on [`extract_field`] as their bounds-safety contract.

use thiserror::Error;

/// Errors that can occur while decoding hex payload text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A byte-swapped integer field must be exactly 8 hex characters.
    #[error("invalid hex integer length: expected 8 characters, got {0}")]
    InvalidIntegerLength(usize),

    /// The input contained a character outside `[0-9a-fA-F]`.
    #[error("not a hex string: {0:?}")]
    NotHex(String),

    /// Hex text must contain an even number of characters (whole bytes).
    #[error("odd hex length: {0} characters")]
    OddLength(usize),

    /// The payload is shorter than a decode rule requires.
    #[error("payload too short: need {needed} bytes, got {available}")]
    ShortPayload { needed: usize, available: usize },

    /// A status text was neither a decimal number nor 8 hex characters.
    #[error("unrecognized status text: {0:?}")]
    BadStatusText(String),
}

// ── Byte-swapped integer codec ────────────────────────────────────────────────

/// Reverses the four byte pairs of an 8-character hex string.
///
/// This converts between the peer's wire order and natural reading order
/// in either direction — the operation is its own inverse.
///
/// # Errors
///
/// Returns [`CodecError::InvalidIntegerLength`] if the input is not exactly
/// 8 characters, or [`CodecError::NotHex`] if any character is not a hex
/// digit.
///
/// # Examples
///
/// ```rust
/// use ukey_core::reverse_byte_hex;
///
/// assert_eq!(reverse_byte_hex("05000a0a").unwrap(), "0a000005");
/// ```
pub fn reverse_byte_hex(hex: &str) -> Result<String, CodecError> {
    if hex.len() != 8 {
        return Err(CodecError::InvalidIntegerLength(hex.len()));
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::NotHex(hex.to_string()));
    }

    // Re-emit the four 2-character groups back to front.
    let mut out = String::with_capacity(8);
    for i in (0..4).rev() {
        out.push_str(&hex[i * 2..i * 2 + 2]);
    }
    Ok(out)
}

/// Parses a byte-swapped 8-character hex field as a `u32`.
///
/// # Errors
///
/// Propagates the length/hex-digit errors of [`reverse_byte_hex`].
pub fn hex_to_u32(hex: &str) -> Result<u32, CodecError> {
    let natural = reverse_byte_hex(hex)?;
    u32::from_str_radix(&natural, 16).map_err(|_| CodecError::NotHex(hex.to_string()))
}

/// Formats a `u32` in natural (big-endian) hex, zero-padded to 8 characters.
pub fn u32_to_hex_be(n: u32) -> String {
    format!("{n:08x}")
}

/// Formats a `u32` in the peer's byte-swapped wire order.
///
/// Inverse of [`hex_to_u32`]; mainly used to build test payloads and the
/// rare request parameter that is sent as raw hex.
pub fn u32_to_hex_le(n: u32) -> String {
    let mut out = String::with_capacity(8);
    for b in n.to_le_bytes() {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

// ── ASCII / label decoding ────────────────────────────────────────────────────

/// Decodes hex text as a NUL-padded single-byte string field.
///
/// Trailing `00` byte pairs are stripped from the tail first (the peer pads
/// fixed-width label fields with NUL bytes), then each remaining byte pair
/// is decoded as a single-byte code point.  The first byte is never
/// stripped, so an all-zero field decodes to a single NUL character rather
/// than an empty string.
///
/// Multi-byte UTF-8 is deliberately **not** reconstructed: the peer's label
/// fields are fixed-width ASCII, and byte-per-code-point decoding is the
/// wire-compatible behaviour.
///
/// # Errors
///
/// Returns [`CodecError::OddLength`] or [`CodecError::NotHex`] for
/// malformed input.
pub fn hex_to_text(hex: &str) -> Result<String, CodecError> {
    if hex.len() % 2 != 0 {
        return Err(CodecError::OddLength(hex.len()));
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::NotHex(hex.to_string()));
    }

    let mut bytes: Vec<u8> = (0..hex.len() / 2)
        .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap_or(0))
        .collect();

    // Strip NUL padding from the tail, keeping at least the first byte.
    while bytes.len() > 1 && bytes.last() == Some(&0) {
        bytes.pop();
    }

    Ok(bytes.into_iter().map(char::from).collect())
}

// ── Field extraction ──────────────────────────────────────────────────────────

/// Returns the hex slice covering `len_bytes` bytes at `offset_bytes`.
///
/// This is the bounds-safety contract every fixed-offset decode rule
/// depends on: a payload shorter than `offset + length` is rejected here,
/// once, instead of panicking in forty call sites.  The returned slice is
/// guaranteed to be hex digits, so downstream character indexing (e.g. the
/// low half of a signature field) is safe.
///
/// # Errors
///
/// Returns [`CodecError::ShortPayload`] if the payload does not cover the
/// requested range, or [`CodecError::NotHex`] if the covered range is not
/// hex text.
pub fn extract_field(payload: &str, offset_bytes: usize, len_bytes: usize) -> Result<&str, CodecError> {
    let start = offset_bytes * 2;
    let end = (offset_bytes + len_bytes) * 2;
    // `get` also rejects ranges that split a multi-byte character, so a
    // non-ASCII payload can never cause a slicing panic.
    let slice = payload.get(start..end).ok_or(CodecError::ShortPayload {
        needed: offset_bytes + len_bytes,
        available: payload.len() / 2,
    })?;
    if !slice.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::NotHex(slice.to_string()));
    }
    Ok(slice)
}

// ── Status normalization ──────────────────────────────────────────────────────

/// Folds the peer's mixed status encodings into a single `u32`.
///
/// Short "boolean-style" replies carry their status either as base-10
/// decimal text (`"0"`) or as a byte-swapped 8-character hex word
/// (`"05000a0a"`).  Normalizing here keeps the per-call-site branching out
/// of the decode rules: decimal digits win, otherwise an 8-character hex
/// string is parsed byte-swapped.
///
/// # Errors
///
/// Returns [`CodecError::BadStatusText`] for empty input or text that is
/// neither form.
pub fn normalize_status(text: &str) -> Result<u32, CodecError> {
    if text.is_empty() {
        return Err(CodecError::BadStatusText(text.to_string()));
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text
            .parse::<u32>()
            .map_err(|_| CodecError::BadStatusText(text.to_string()));
    }
    if text.len() == 8 {
        return hex_to_u32(text).map_err(|_| CodecError::BadStatusText(text.to_string()));
    }
    Err(CodecError::BadStatusText(text.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
