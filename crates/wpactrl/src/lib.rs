//! Client for the wpa_supplicant control interface.
//!
//! The daemon's control socket mixes replies to commands with unsolicited
//! events on one datagram channel. wpactrl splits them apart so callers can
//! issue commands synchronously while consuming events as a stream.
//!
//! # Crate Structure
//!
//! - [`transport`]: datagram transports (Unix sockets, in-memory pairs)
//! - [`message`]: reply/event decoding and priority markers
//! - [`ctrl`]: the command/event demultiplexer
//! - [`supplicant`]: typed events and network management (behind `supplicant` feature)
//! - [`mock`]: a simulated daemon for tests (behind `mock` feature)

/// Re-export transport types.
pub mod transport {
    pub use wpactrl_transport::*;
}

/// Re-export message types.
pub mod message {
    pub use wpactrl_message::*;
}

/// Re-export demultiplexer types.
pub mod ctrl {
    pub use wpactrl_ctrl::*;
}

/// Re-export supplicant types (requires `supplicant` feature).
#[cfg(feature = "supplicant")]
pub mod supplicant {
    pub use wpactrl_supplicant::*;
}

/// Re-export the simulated daemon (requires `mock` feature).
#[cfg(feature = "mock")]
pub mod mock {
    pub use wpactrl_mock::*;
}
