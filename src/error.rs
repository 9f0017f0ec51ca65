//! Error types for gdbmock
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using MockError
pub type Result<T> = std::result::Result<T, MockError>;

/// Unified error type for gdbmock operations
#[derive(Debug, Error)]
pub enum MockError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Framing is corrupt: bad leading byte, bad checksum digits or mismatch.
    /// Fatal to the connection.
    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    /// A command matched a known form but one of its fields is malformed.
    #[error("Malformed command: {0}")]
    Decode(String),

    #[error("Hex format error: {0}")]
    Hex(#[from] hex::FromHexError),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MockError {
    /// Whether this error means the peer broke the protocol
    /// (as opposed to the transport failing underneath it)
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            MockError::InvalidPacket(_) | MockError::Decode(_) | MockError::Hex(_)
        )
    }
}
