//! Reply/event classification for supplicant control datagrams.
//!
//! The control protocol carries no length or sequence header. Each datagram
//! is one message, and the only thing that tells an event from a command
//! reply is a leading priority marker:
//! - `<N>` followed by the payload: an unsolicited event
//! - anything else: the reply to the outstanding command

pub mod codec;
pub mod error;
pub mod priority;
pub mod reader;

pub use codec::{decode_message, Event, Message, MARKER_LEN};
pub use error::{MessageError, Result};
pub use priority::Priority;
pub use reader::{DatagramReader, DEFAULT_MAX_DATAGRAM};
