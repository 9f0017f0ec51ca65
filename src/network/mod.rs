//! Network Module
//!
//! TCP server, per-connection handling and a small test client.
//!
//! ## Architecture
//! - One connection thread per server: accept, then receive loop
//! - Exactly one client per server instance
//! - Commands answered in arrival order through the Responder

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::{Connection, Handshake};
pub use server::{Server, ServerState};
