//! Responder
//!
//! Routes decoded commands to a `Handler` and records every command it sees.

use tracing::trace;

use super::{DefaultHandler, Handler, PacketLog, XferChunk};
use crate::error::Result;
use crate::protocol::{escape_binary, Command};

/// Maps client commands to unframed reply payloads
pub struct Responder {
    /// Simulated target behavior
    handler: Box<dyn Handler>,

    /// Every command received, in order
    log: PacketLog,
}

impl Responder {
    /// Create a responder around a handler
    pub fn new<H: Handler + 'static>(handler: H) -> Self {
        Self {
            handler: Box::new(handler),
            log: PacketLog::new(),
        }
    }

    /// Handle one command, returning the unframed reply
    ///
    /// The command is logged before it is decoded, so malformed commands
    /// show up in the log too. Decode failures are returned to the caller.
    pub fn respond(&mut self, packet: &str) -> Result<Vec<u8>> {
        self.log.push(packet);

        let command = Command::parse(packet)?;
        trace!(command = command.name(), "dispatching {:?}", packet);

        let handler = self.handler.as_mut();
        let reply = match command {
            Command::ReadRegisters => handler.read_registers(),
            Command::WriteRegisters { data } => handler.write_registers(data),
            Command::ReadRegister { register } => handler.read_register(register),
            Command::WriteRegister { register, value } => handler.write_register(register, value),
            Command::ReadMemory { addr, length } => handler.read_memory(addr, length),
            Command::WriteMemory { addr, data, .. } => handler.write_memory(addr, data),
            Command::Symbol { args } => handler.q_symbol(args),
            Command::Supported { features } => handler.q_supported(&features),
            Command::ThreadInfoFirst => handler.qf_thread_info(),
            Command::CurrentThread => handler.q_c(),
            Command::HaltReason => handler.halt_reason(),
            Command::SelectThread { op, thread_id } => handler.select_thread(op, thread_id),
            Command::Xfer {
                object,
                annex,
                offset,
                length,
                ..
            } => {
                return Ok(handler
                    .qxfer_read(object, annex, offset, length)
                    .map(|chunk| xfer_reply(&chunk))
                    .unwrap_or_default())
            }
            Command::Other(packet) => handler.other(packet),
        };

        Ok(reply.into_bytes())
    }

    /// Handle on the packet log
    pub fn packet_log(&self) -> PacketLog {
        self.log.clone()
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(DefaultHandler)
    }
}

/// `m<data>` while more remains, `l<data>` for the last chunk
fn xfer_reply(chunk: &XferChunk) -> Vec<u8> {
    let mut reply = Vec::with_capacity(chunk.data.len() + 1);
    reply.push(if chunk.has_more { b'm' } else { b'l' });
    reply.extend_from_slice(&escape_binary(&chunk.data));
    reply
}
