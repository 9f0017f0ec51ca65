//! Connection Handler
//!
//! Runs the receive loop for the single client connection and applies the
//! acknowledgment handshake around the responder's replies.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{MockError, Result};
use crate::protocol::{frame, Event, PacketParser, ACK};
use crate::responder::Responder;

/// Command the connection answers itself instead of the responder
const START_NO_ACK_MODE: &str = "QStartNoAckMode";

/// Acknowledgment state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handshake {
    /// Replies are still preceded by a `+`
    pub send_acks: bool,

    /// A `+` was sent and the client's `+` for our reply is still due
    pub expecting_ack: bool,
}

impl Default for Handshake {
    fn default() -> Self {
        Self {
            send_acks: true,
            expecting_ack: false,
        }
    }
}

/// Handles the single client connection
pub struct Connection {
    /// Client socket
    stream: TcpStream,

    /// Receive buffer and packet parser
    parser: PacketParser,

    /// Command handling
    responder: Responder,

    /// Ack/no-ack state
    handshake: Handshake,

    /// Bytes requested per read
    chunk_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// The stream is switched to blocking reads with no timeout.
    pub fn new(stream: TcpStream, responder: Responder, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nonblocking(false)?;
        stream.set_read_timeout(None)?;
        if config.nodelay {
            stream.set_nodelay(true)?;
        }

        Ok(Self {
            stream,
            parser: PacketParser::new(),
            responder,
            handshake: Handshake::default(),
            chunk_size: config.recv_chunk_size,
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// A closed or failed socket ends the loop normally. A protocol
    /// violation closes the socket without a reply and is returned.
    pub fn handle(&mut self) -> Result<()> {
        debug!("Connection established from {}", self.peer_addr);

        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            let n = match self.stream.read(&mut chunk) {
                Ok(0) => {
                    debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(n) => n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("Read from {} ended: {}", self.peer_addr, e);
                    return Ok(());
                }
            };

            self.parser.feed(&chunk[..n]);

            if let Err(e) = self.process_buffered() {
                if let MockError::Io(ref io_err) = e {
                    debug!("Client {} went away mid-reply: {}", self.peer_addr, io_err);
                    return Ok(());
                }
                warn!("Closing connection to {}: {}", self.peer_addr, e);
                let _ = self.stream.shutdown(Shutdown::Both);
                return Err(e);
            }
        }
    }

    /// Handle every complete event currently buffered
    fn process_buffered(&mut self) -> Result<()> {
        while let Some(event) = self.parser.next_event()? {
            self.handle_event(event)?;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let packet = match event {
            Event::Ack => {
                if self.handshake.expecting_ack {
                    self.handshake.expecting_ack = false;
                } else {
                    // Unsolicited ack (the client's opening `+`) is answered in kind
                    self.send_raw(&[ACK])?;
                }
                return Ok(());
            }
            Event::Packet(packet) => packet.to_text(),
        };

        trace!("<- {}: {:?}", self.peer_addr, packet);

        if self.handshake.send_acks {
            self.send_raw(&[ACK])?;
            self.handshake.expecting_ack = true;
        }

        let reply = if packet == START_NO_ACK_MODE {
            debug!("Client {} switched to no-ack mode", self.peer_addr);
            self.handshake.send_acks = false;
            b"OK".to_vec()
        } else {
            self.responder.respond(&packet)?
        };

        trace!("-> {}: {:?}", self.peer_addr, String::from_utf8_lossy(&reply));
        self.send_raw(&frame(&reply))
    }

    fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        Ok(())
    }

    /// Current handshake state
    pub fn handshake(&self) -> Handshake {
        self.handshake
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
