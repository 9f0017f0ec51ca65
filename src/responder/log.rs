//! Packet log
//!
//! Ordered, append-only record of every command the responder received.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

/// Shared handle on the packet log
///
/// Clones see the same log, so test code can keep one while the
/// responder moves into the connection thread.
#[derive(Debug, Clone, Default)]
pub struct PacketLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl PacketLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a received command
    pub fn push(&self, packet: impl Into<String>) {
        self.entries.lock().push(packet.into());
    }

    /// Snapshot of all entries in arrival order
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// The last `n` entries (fewer if the log is shorter)
    pub fn last(&self, n: usize) -> Vec<String> {
        let entries = self.entries.lock();
        let start = entries.len().saturating_sub(n);
        entries[start..].to_vec()
    }

    /// First expected packet that does not appear in order
    ///
    /// The expected packets need not be consecutive in the log, only
    /// ordered the same way.
    pub fn first_missing<'a>(&self, expected: &[&'a str]) -> Option<&'a str> {
        let entries = self.entries.lock();
        let mut log = entries.iter();
        expected
            .iter()
            .find(|want| !log.any(|got| got == *want))
            .copied()
    }

    /// Whether every expected packet appears, in order
    pub fn contains_in_order(&self, expected: &[&str]) -> bool {
        self.first_missing(expected).is_none()
    }

    /// Write the log, one packet per line
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        for entry in self.entries.lock().iter() {
            writeln!(writer, "{}", entry)?;
        }
        writer.flush()?;
        Ok(())
    }
}
