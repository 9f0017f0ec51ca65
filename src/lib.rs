//! # gdbmock
//!
//! A mock GDB Remote Serial Protocol server for exercising a debugger
//! client's wire-level behavior without a real target:
//! - Packet framing and checksum validation
//! - Streaming parser that tolerates partial socket reads
//! - Ack / no-ack handshake
//! - Overridable per-command replies with an inspectable packet log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (one client, one thread)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Packet Parser                              │
//! │              (Ack | Packet | incomplete)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Handshake  │          │  Responder  │
//!   │ (ack state) │          │ (+ log)     │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │   Handler   │
//!                           │ (overrides) │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod responder;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MockError, Result};
pub use config::Config;
pub use network::{Client, Server, ServerState};
pub use responder::{Handler, PacketLog, Responder};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of gdbmock
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
