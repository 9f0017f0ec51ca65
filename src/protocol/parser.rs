//! Streaming packet parser
//!
//! Turns an append-only byte stream into protocol events. Socket reads can
//! split a packet anywhere, so the parser keeps everything it has not yet
//! consumed and remembers how far it already scanned for the `#` terminator.
//!
//! ## State machine
//! ```text
//!            '+'                       '#' found, 2 digits present
//!   ┌─────────────── Start ──'$'──► Scanning ─────────────────────► Emit
//!   │  (emit Ack)      │               │                             │
//!   └──────────────────┘               │ buffer exhausted            │
//!                      ▲               ▼                             │
//!                      │         Incomplete (cursor parked)          │
//!                      └─────────────────────────────────────────────┘
//!                              consumed bytes drained, cursor = 0
//! ```

use bytes::{Buf, Bytes, BytesMut};

use super::codec::{checksum, decode_checksum, ACK, CHECKSUM_LEN, PACKET_END, PACKET_START};
use crate::error::{MockError, Result};

/// Initial receive buffer capacity
const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// A validated inbound packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    payload: Bytes,
    checksum: u8,
}

impl Packet {
    /// Build a packet for a payload, computing its checksum
    pub fn new(payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let checksum = checksum(&payload);
        Self { payload, checksum }
    }

    /// Raw payload bytes (between `$` and `#`)
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Payload as text; invalid UTF-8 is replaced
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// One protocol event extracted from the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A bare `+`
    Ack,

    /// A complete, checksum-verified packet
    Packet(Packet),
}

/// Resumable parser over an accumulating receive buffer
#[derive(Debug)]
pub struct PacketParser {
    /// Bytes received but not yet consumed
    buffer: BytesMut,

    /// Scan position within the current candidate packet.
    /// Bytes in `1..offset` are known not to contain `#`.
    offset: usize,
}

impl PacketParser {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            offset: 0,
        }
    }

    /// Append freshly received bytes
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Extract the next event, if a complete one is buffered
    ///
    /// Returns `Ok(None)` when more data is needed. Call again after every
    /// `Some` since one read may carry several packets.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let mut i = self.offset;
        if i == 0 {
            match self.buffer[0] {
                ACK => {
                    self.buffer.advance(1);
                    return Ok(Some(Event::Ack));
                }
                PACKET_START => i = 1,
                other => {
                    return Err(MockError::InvalidPacket(format!(
                        "unexpected leading byte 0x{:02x}",
                        other
                    )))
                }
            }
        }

        // Resume the terminator search where the last call stopped
        let len = self.buffer.len();
        while i < len && self.buffer[i] != PACKET_END {
            i += 1;
        }

        if i + 1 + CHECKSUM_LEN > len {
            self.offset = i;
            return Ok(None);
        }

        let expected = decode_checksum(&self.buffer[i + 1..i + 1 + CHECKSUM_LEN])?;

        let actual = checksum(&self.buffer[1..i]);
        if expected != actual {
            return Err(MockError::InvalidPacket(format!(
                "checksum {:02x} does not match content {:02x}",
                expected, actual
            )));
        }

        let raw = self.buffer.split_to(i + 1 + CHECKSUM_LEN).freeze();
        self.offset = 0;

        Ok(Some(Event::Packet(Packet {
            payload: raw.slice(1..i),
            checksum: actual,
        })))
    }

    /// Number of bytes buffered but not yet consumed
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Current scan cursor
    pub fn scan_offset(&self) -> usize {
        self.offset
    }

    /// Drop all buffered data
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.offset = 0;
    }
}

impl Default for PacketParser {
    fn default() -> Self {
        Self::new()
    }
}
