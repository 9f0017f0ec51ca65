//! Protocol Module
//!
//! The subset of the GDB Remote Serial Protocol spoken by the mock server.
//!
//! ### Packet Format
//! ```text
//! ┌─────┬─────────────────────┬─────┬──────────────┐
//! │  $  │       Payload       │  #  │ Checksum (2) │
//! └─────┴─────────────────────┴─────┴──────────────┘
//! ```
//!
//! ### Acknowledgment
//! A single `+` byte, sent until both sides agree on `QStartNoAckMode`.
//!
//! ### Commands
//! - `g` / `G<hex>`               - read / write all registers
//! - `p<reg>` / `P<reg>=<hex>`    - read / write one register
//! - `m<addr>,<len>`              - read memory
//! - `M<addr>,<len>:<hex>`        - write memory
//! - `qSymbol`, `qSupported`, `qfThreadInfo`, `qC`, `?`, `H<op><tid>`
//! - `qXfer:<obj>:read:<annex>:<off>,<len>` - paged object transfer

mod codec;
mod command;
mod parser;

pub use codec::{
    checksum, escape_binary, frame, hex_decode, hex_encode, ACK, ESCAPE, MAX_PACKET_SIZE,
    PACKET_END, PACKET_START,
};
pub use command::{parse_hex_u64, Command, MAX_READ_LENGTH};
pub use parser::{Event, Packet, PacketParser};
