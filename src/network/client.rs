//! RSP Client
//!
//! Minimal client side of the protocol, for driving the mock server from
//! tests and the CLI.

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::trace;

use crate::error::{MockError, Result};
use crate::protocol::{frame, Event, Packet, PacketParser, ACK};

/// Bytes requested per read
const READ_CHUNK_SIZE: usize = 4096;

/// Blocking RSP client
pub struct Client {
    stream: TcpStream,
    parser: PacketParser,

    /// Replies are acknowledged with `+` until no-ack mode is negotiated
    ack_mode: bool,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            parser: PacketParser::new(),
            ack_mode: true,
        })
    }

    /// Bound how long reads may block
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    /// Send a bare `+`
    pub fn send_ack(&mut self) -> Result<()> {
        self.send_raw(&[ACK])
    }

    /// Frame and send a payload
    pub fn send_packet(&mut self, payload: &[u8]) -> Result<()> {
        trace!("-> {:?}", String::from_utf8_lossy(payload));
        self.send_raw(&frame(payload))
    }

    /// Send bytes as-is
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Block until the next ack or packet arrives
    ///
    /// A closed connection is reported as `UnexpectedEof`.
    pub fn read_event(&mut self) -> Result<Event> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(event) = self.parser.next_event()? {
                return Ok(event);
            }
            let n = match self.stream.read(&mut chunk) {
                Ok(n) => n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                return Err(MockError::Io(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "server closed the connection",
                )));
            }
            self.parser.feed(&chunk[..n]);
        }
    }

    /// Block until the next packet, skipping acks
    pub fn read_packet(&mut self) -> Result<Packet> {
        loop {
            if let Event::Packet(packet) = self.read_event()? {
                return Ok(packet);
            }
        }
    }

    /// Send a command and return the server's reply payload
    pub fn request(&mut self, payload: &str) -> Result<String> {
        self.send_packet(payload.as_bytes())?;
        let reply = self.read_packet()?;
        if self.ack_mode {
            self.send_ack()?;
        }
        let reply = reply.to_text();
        trace!("<- {:?}", reply);
        Ok(reply)
    }

    /// Negotiate no-ack mode; returns the server's reply
    pub fn start_no_ack_mode(&mut self) -> Result<String> {
        let reply = self.request("QStartNoAckMode")?;
        if reply == "OK" {
            self.ack_mode = false;
        }
        Ok(reply)
    }

    /// Whether replies are still acknowledged
    pub fn ack_mode(&self) -> bool {
        self.ack_mode
    }
}
