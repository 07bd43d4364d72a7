//! Simulated supplicant daemon for exercising wpactrl clients.
//!
//! [`MockSupplicant`] serves the control protocol over any
//! [`DatagramListener`](wpactrl_transport::DatagramListener). It keeps just
//! enough network state to answer the network-management commands and can be
//! scripted to return canned replies or emit events, which is what
//! higher-level tests need. No radio behaviour is simulated.

pub mod daemon;
pub mod error;
pub mod network;

pub use daemon::{spawn_memory, Mismatch, MockSupplicant};
pub use error::{MockError, Result};
pub use network::MockNetwork;
