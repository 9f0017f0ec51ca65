//! Command definitions
//!
//! Decodes raw command strings from the client into typed commands.
//! Checks run most-specific first and the first match wins.

use super::codec::MAX_PACKET_SIZE;
use crate::error::{MockError, Result};

/// Number of `:`-separated fields after `qXfer:`
const XFER_FIELD_COUNT: usize = 4;

/// Longest `m` read whose hex reply still fits in one packet
pub const MAX_READ_LENGTH: usize = MAX_PACKET_SIZE / 2;

/// A decoded client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `g`
    ReadRegisters,

    /// `G<hex>`
    WriteRegisters { data: &'a str },

    /// `p<reg>`
    ReadRegister { register: u64 },

    /// `P<reg>=<hex>`
    WriteRegister { register: u64, value: &'a str },

    /// `m<addr>,<len>`; `length` is at most `MAX_READ_LENGTH`
    ReadMemory { addr: u64, length: usize },

    /// `M<addr>,<len>:<hex>`
    WriteMemory { addr: u64, length: u64, data: &'a str },

    /// `qSymbol:<args>`
    Symbol { args: &'a str },

    /// `qSupported:<feature>;<feature>...`
    Supported { features: Vec<&'a str> },

    /// `qfThreadInfo`
    ThreadInfoFirst,

    /// `qC`
    CurrentThread,

    /// `?`
    HaltReason,

    /// `H<op><thread-id>`; the id may be `-1` (all threads)
    SelectThread { op: char, thread_id: i64 },

    /// `qXfer:<object>:<mode>:<annex>:<offset>,<length>`
    Xfer {
        object: &'a str,
        mode: &'a str,
        annex: &'a str,
        offset: u64,
        length: u64,
    },

    /// Anything not recognized above
    Other(&'a str),
}

impl<'a> Command<'a> {
    /// Decode a command string
    ///
    /// Fails with `MockError::Decode` when a recognized command carries a
    /// malformed numeric field.
    pub fn parse(packet: &'a str) -> Result<Self> {
        if packet == "g" {
            return Ok(Command::ReadRegisters);
        }
        if let Some(data) = packet.strip_prefix('G') {
            return Ok(Command::WriteRegisters { data });
        }
        if let Some(reg) = packet.strip_prefix('p') {
            return Ok(Command::ReadRegister {
                register: parse_hex_u64(reg, "register number")?,
            });
        }
        if let Some(rest) = packet.strip_prefix('P') {
            return decode_write_register(rest);
        }
        if let Some(rest) = packet.strip_prefix('m') {
            return decode_read_memory(rest);
        }
        if let Some(rest) = packet.strip_prefix('M') {
            return decode_write_memory(rest);
        }
        if let Some(rest) = packet.strip_prefix("qSymbol") {
            return Ok(Command::Symbol {
                args: rest.get(1..).unwrap_or(""),
            });
        }
        if let Some(rest) = packet.strip_prefix("qSupported") {
            let features = rest
                .get(1..)
                .unwrap_or("")
                .split(';')
                .filter(|f| !f.is_empty())
                .collect();
            return Ok(Command::Supported { features });
        }
        if packet == "qfThreadInfo" {
            return Ok(Command::ThreadInfoFirst);
        }
        if packet == "qC" {
            return Ok(Command::CurrentThread);
        }
        if packet == "?" {
            return Ok(Command::HaltReason);
        }
        if let Some(rest) = packet.strip_prefix('H') {
            return decode_select_thread(rest);
        }
        if let Some(rest) = packet.strip_prefix("qXfer:") {
            return decode_xfer(rest);
        }
        Ok(Command::Other(packet))
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::ReadRegisters => "read_registers",
            Command::WriteRegisters { .. } => "write_registers",
            Command::ReadRegister { .. } => "read_register",
            Command::WriteRegister { .. } => "write_register",
            Command::ReadMemory { .. } => "read_memory",
            Command::WriteMemory { .. } => "write_memory",
            Command::Symbol { .. } => "qSymbol",
            Command::Supported { .. } => "qSupported",
            Command::ThreadInfoFirst => "qfThreadInfo",
            Command::CurrentThread => "qC",
            Command::HaltReason => "halt_reason",
            Command::SelectThread { .. } => "select_thread",
            Command::Xfer { .. } => "qXfer",
            Command::Other(_) => "other",
        }
    }
}

// =============================================================================
// Field decoders
// =============================================================================

/// Parse an unsigned hex field
pub fn parse_hex_u64(field: &str, what: &str) -> Result<u64> {
    u64::from_str_radix(field, 16)
        .map_err(|_| MockError::Decode(format!("{} is not valid hex: {:?}", what, field)))
}

/// Parse a signed hex field (thread ids may be negative)
fn parse_hex_i64(field: &str, what: &str) -> Result<i64> {
    i64::from_str_radix(field, 16)
        .map_err(|_| MockError::Decode(format!("{} is not valid hex: {:?}", what, field)))
}

/// Parse `<addr>,<length>`
fn parse_addr_length(field: &str) -> Result<(u64, u64)> {
    let mut parts = field.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(addr), Some(length), None) => Ok((
            parse_hex_u64(addr, "address")?,
            parse_hex_u64(length, "length")?,
        )),
        _ => Err(MockError::Decode(format!(
            "expected <addr>,<length>, got {:?}",
            field
        ))),
    }
}

fn decode_read_memory(rest: &str) -> Result<Command<'_>> {
    let (addr, length) = parse_addr_length(rest)?;
    match usize::try_from(length) {
        Ok(length) if length <= MAX_READ_LENGTH => Ok(Command::ReadMemory { addr, length }),
        _ => Err(MockError::Decode(format!(
            "read length {:#x} exceeds the {:#x}-byte limit",
            length, MAX_READ_LENGTH
        ))),
    }
}

fn decode_write_register(rest: &str) -> Result<Command<'_>> {
    match rest.split_once('=') {
        Some((reg, value)) if !value.contains('=') => Ok(Command::WriteRegister {
            register: parse_hex_u64(reg, "register number")?,
            value,
        }),
        _ => Err(MockError::Decode(format!(
            "expected <reg>=<value>, got {:?}",
            rest
        ))),
    }
}

fn decode_write_memory(rest: &str) -> Result<Command<'_>> {
    match rest.split_once(':') {
        Some((location, data)) if !data.contains(':') => {
            let (addr, length) = parse_addr_length(location)?;
            Ok(Command::WriteMemory { addr, length, data })
        }
        _ => Err(MockError::Decode(format!(
            "expected <addr>,<length>:<data>, got {:?}",
            rest
        ))),
    }
}

fn decode_select_thread(rest: &str) -> Result<Command<'_>> {
    let mut chars = rest.chars();
    let op = chars
        .next()
        .ok_or_else(|| MockError::Decode("H packet is missing its operation".to_string()))?;
    let thread_id = parse_hex_i64(chars.as_str(), "thread id")?;
    Ok(Command::SelectThread { op, thread_id })
}

fn decode_xfer(rest: &str) -> Result<Command<'_>> {
    let fields: Vec<&str> = rest.split(':').collect();
    if fields.len() != XFER_FIELD_COUNT {
        return Err(MockError::Decode(format!(
            "qXfer expects {} fields, got {}",
            XFER_FIELD_COUNT,
            fields.len()
        )));
    }
    let (offset, length) = parse_addr_length(fields[3])?;
    Ok(Command::Xfer {
        object: fields[0],
        mode: fields[1],
        annex: fields[2],
        offset,
        length,
    })
}
