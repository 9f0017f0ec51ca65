//! Configuration for gdbmock
//!
//! Centralized configuration with sensible defaults.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::error::{MockError, Result};

/// Main configuration for a mock server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address. Port 0 asks the OS for an ephemeral port.
    pub listen_addr: String,

    /// How long to wait for the single client to connect (milliseconds).
    /// 0 waits until the server is stopped.
    pub accept_timeout_ms: u64,

    /// Disable Nagle's algorithm on the accepted connection
    pub nodelay: bool,

    // -------------------------------------------------------------------------
    // Receive Configuration
    // -------------------------------------------------------------------------
    /// Max bytes taken from the socket per read
    pub recv_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:0".to_string(),
            accept_timeout_ms: 2000,
            nodelay: true,
            recv_chunk_size: 4096,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve `listen_addr` to a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .to_socket_addrs()
            .map_err(|e| MockError::Config(format!("bad listen address {}: {}", self.listen_addr, e)))?
            .next()
            .ok_or_else(|| MockError::Config(format!("listen address {} did not resolve", self.listen_addr)))
    }

    /// Accept timeout, or `None` when the server should wait indefinitely
    pub fn accept_timeout(&self) -> Option<Duration> {
        match self.accept_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Listen on loopback at a caller-chosen port
    pub fn port(mut self, port: u16) -> Self {
        self.config.listen_addr = format!("127.0.0.1:{}", port);
        self
    }

    /// Set the accept timeout (in milliseconds, 0 = no timeout)
    pub fn accept_timeout_ms(mut self, ms: u64) -> Self {
        self.config.accept_timeout_ms = ms;
        self
    }

    /// Set TCP_NODELAY on the accepted connection
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.config.nodelay = enabled;
        self
    }

    /// Set the receive chunk size (in bytes)
    pub fn recv_chunk_size(mut self, size: usize) -> Self {
        self.config.recv_chunk_size = size.max(1);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
