//! Datagram transport abstraction for supplicant control interfaces.
//!
//! Provides the capability traits the rest of wpactrl is written against:
//! - [`Datagram`]: a full-duplex datagram channel (send, receive, close)
//! - [`DatagramListener`]: a listening endpoint that knows who sent each
//!   datagram and can open a channel back to that sender
//!
//! Two implementations ship here: Unix datagram sockets (the control socket
//! exposed by the daemon) and an in-memory pair for deterministic tests.
//! This is the lowest layer of wpactrl.

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use memory::MemoryDatagram;
pub use traits::{Datagram, DatagramListener};

#[cfg(unix)]
pub use uds::{UnixDatagramConn, UnixDatagramListener};
