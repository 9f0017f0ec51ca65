//! Protocol codec
//!
//! Checksum, framing, binary escaping and hex helpers for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Packet
//! ```text
//! ┌─────┬─────────────────────┬─────┬──────────────┐
//! │  $  │       Payload       │  #  │ Checksum (2) │
//! └─────┴─────────────────────┴─────┴──────────────┘
//! ```
//!
//! The checksum is the sum of the payload bytes modulo 256, rendered as two
//! lowercase hex digits.
//!
//! ### Binary escaping
//! Inside binary-bearing replies `$`, `#` and `}` are sent as `}` followed by
//! the original byte XOR 0x20.

use crate::error::{MockError, Result};

/// Start of a packet
pub const PACKET_START: u8 = b'$';

/// End of a packet's payload, followed by the checksum digits
pub const PACKET_END: u8 = b'#';

/// Acknowledgment byte
pub const ACK: u8 = b'+';

/// Escape byte for binary payloads
pub const ESCAPE: u8 = 0x7d;

/// Value XORed into escaped bytes
pub const ESCAPE_XOR: u8 = 0x20;

/// Number of hex digits trailing the `#`
pub const CHECKSUM_LEN: usize = 2;

/// Largest payload advertised to the client in `qSupported`
pub const MAX_PACKET_SIZE: usize = 0x3fff;

// =============================================================================
// Checksum / Framing
// =============================================================================

/// Sum of payload bytes modulo 256
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Wrap a payload into a framed packet
///
/// Format: `$` + payload + `#` + checksum (2 lowercase hex digits)
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(payload.len() + 2 + CHECKSUM_LEN);
    packet.push(PACKET_START);
    packet.extend_from_slice(payload);
    packet.push(PACKET_END);
    packet.extend_from_slice(format!("{:02x}", checksum(payload)).as_bytes());
    packet
}

/// Escape a binary payload so it can travel inside a packet
pub fn escape_binary(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len());
    for &byte in payload {
        if needs_escape(byte) {
            out.push(ESCAPE);
            out.push(byte ^ ESCAPE_XOR);
        } else {
            out.push(byte);
        }
    }
    out
}

#[inline]
fn needs_escape(byte: u8) -> bool {
    matches!(byte, PACKET_START | PACKET_END | ESCAPE)
}

// =============================================================================
// Hex helpers
// =============================================================================

/// Encode bytes as two lowercase hex digits each
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string; either case is accepted
///
/// Odd lengths and non-hex characters are errors.
pub fn hex_decode(hex_str: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(hex_str)?)
}

/// Decode the two checksum digits that follow `#`
pub(crate) fn decode_checksum(digits: &[u8]) -> Result<u8> {
    let mut value = [0u8; 1];
    hex::decode_to_slice(digits, &mut value).map_err(|_| {
        MockError::InvalidPacket(format!(
            "bad checksum hex: {:?}",
            String::from_utf8_lossy(digits)
        ))
    })?;
    Ok(value[0])
}
