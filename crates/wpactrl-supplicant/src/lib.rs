//! Typed wpa_supplicant events and network management.
//!
//! [`SupplicantCtrl`] wraps any [`Ctrl`](wpactrl_ctrl::Ctrl), turns its raw
//! unsolicited stream into [`SupplicantEvent`]s and adds the network
//! configuration commands (`ADD_NETWORK`, `SET_NETWORK`, `LIST_NETWORKS`, ...).

pub mod error;
pub mod event;
pub mod network;
pub mod reason;
pub mod status;
pub mod supplicant;

pub use error::{Result, SupplicantError};
pub use event::{EventKind, SupplicantEvent};
pub use network::{parse_network_list, Network};
pub use reason::{reason_label, DisconnectReason};
pub use status::Status;
pub use supplicant::SupplicantCtrl;
