//! Command/event demultiplexer for supplicant control interfaces.
//!
//! A control socket carries both replies to the caller's commands and
//! unsolicited events the daemon emits whenever it likes. [`WpaCtrl`] runs
//! one background reader per connection that splits the two apart: replies
//! go to whichever [`command`](Ctrl::command) call is waiting, events go to
//! the [`unsolicited`](Ctrl::unsolicited) stream.

pub mod config;
pub mod ctrl;
pub mod error;

#[cfg(unix)]
pub mod connector;

pub use config::CtrlConfig;
pub use ctrl::{Ctrl, WpaCtrl, ATTACH, DETACH, FAIL, OK};
pub use error::{CtrlError, Result};

#[cfg(unix)]
pub use connector::{connect, connect_interface};
