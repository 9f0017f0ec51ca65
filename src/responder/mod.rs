//! Responder Module
//!
//! The pluggable command-to-reply side of the mock target.
//!
//! ## Responsibilities
//! - Decode each command and route it to a handler method
//! - Provide default replies for every supported command family
//! - Keep an ordered log of every command received
//!
//! ## Customizing
//! Implement `Handler` and override only the methods a scenario needs:
//!
//! ```
//! use gdbmock::responder::{Handler, Responder};
//!
//! struct Stopped;
//!
//! impl Handler for Stopped {
//!     fn halt_reason(&mut self) -> String {
//!         "T05".to_string()
//!     }
//! }
//!
//! let mut responder = Responder::new(Stopped);
//! assert_eq!(responder.respond("?").unwrap(), b"T05");
//! assert_eq!(responder.respond("qC").unwrap(), b"QC0");
//! ```

mod dispatch;
mod handler;
mod log;

pub use dispatch::Responder;
pub use handler::{DefaultHandler, Handler, XferChunk, DEFAULT_REGISTER_COUNT};
pub use log::PacketLog;
