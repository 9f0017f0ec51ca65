//! Command handlers
//!
//! One overridable method per command family. Every method has a default
//! reply, so a scenario only implements the handful it cares about.

use crate::protocol::MAX_PACKET_SIZE;

/// Registers reported by the default `g` reply
pub const DEFAULT_REGISTER_COUNT: usize = 40;

/// One chunk of a paged `qXfer` read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XferChunk {
    /// Raw object bytes (escaped by the responder)
    pub data: Vec<u8>,

    /// More data remains after this chunk
    pub has_more: bool,
}

impl XferChunk {
    /// A chunk with more data to follow
    pub fn more(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            has_more: true,
        }
    }

    /// The final chunk of an object
    pub fn last(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            has_more: false,
        }
    }
}

/// Simulated target behavior
///
/// Replies are unframed payloads. An empty string tells the client the
/// command is unsupported.
pub trait Handler: Send {
    /// Width of the register file, in 32-bit registers
    fn register_count(&self) -> usize {
        DEFAULT_REGISTER_COUNT
    }

    /// `g`
    fn read_registers(&mut self) -> String {
        "00000000".repeat(self.register_count())
    }

    /// `G`
    fn write_registers(&mut self, _registers_hex: &str) -> String {
        "OK".to_string()
    }

    /// `p`
    fn read_register(&mut self, _register: u64) -> String {
        "00000000".to_string()
    }

    /// `P`
    fn write_register(&mut self, _register: u64, _value_hex: &str) -> String {
        "OK".to_string()
    }

    /// `m`; `length` never exceeds [`MAX_READ_LENGTH`](crate::protocol::MAX_READ_LENGTH)
    fn read_memory(&mut self, _addr: u64, length: usize) -> String {
        "00".repeat(length)
    }

    /// `M`
    fn write_memory(&mut self, _addr: u64, _data_hex: &str) -> String {
        "OK".to_string()
    }

    /// `qSymbol`
    fn q_symbol(&mut self, _symbol_args: &str) -> String {
        "OK".to_string()
    }

    /// `qSupported`
    fn q_supported(&mut self, _client_features: &[&str]) -> String {
        format!("PacketSize={:x};QStartNoAckMode+", MAX_PACKET_SIZE)
    }

    /// `qfThreadInfo`
    fn qf_thread_info(&mut self) -> String {
        "l".to_string()
    }

    /// `qC`
    fn q_c(&mut self) -> String {
        "QC0".to_string()
    }

    /// `?`
    fn halt_reason(&mut self) -> String {
        // SIGINT
        "S02".to_string()
    }

    /// `H`
    fn select_thread(&mut self, _op: char, _thread_id: i64) -> String {
        "OK".to_string()
    }

    /// `qXfer` reads. `None` means there is no such object.
    fn qxfer_read(
        &mut self,
        _object: &str,
        _annex: &str,
        _offset: u64,
        _length: u64,
    ) -> Option<XferChunk> {
        None
    }

    /// Everything else
    fn other(&mut self, _packet: &str) -> String {
        String::new()
    }
}

/// Handler that answers every command with its default reply
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHandler;

impl Handler for DefaultHandler {}
