use crate::error::{MessageError, Result};
use crate::priority::Priority;

/// Event marker: `<` + priority byte + `>` = 3 bytes.
pub const MARKER_LEN: usize = 3;

const MARKER_OPEN: u8 = b'<';
const MARKER_CLOSE: u8 = b'>';

/// An unsolicited event with its marker stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Priority taken from the marker.
    pub priority: Priority,
    /// Payload after the marker, whitespace-trimmed.
    pub text: String,
}

/// One classified control datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Reply to the outstanding command, whitespace-trimmed.
    Reply(String),
    /// Unsolicited event.
    Event(Event),
}

/// Classify a single datagram as a reply or an event.
///
/// Wire format of an event:
/// ```text
/// ┌─────┬──────────┬─────┬──────────────────────────────┐
/// │ '<' │ priority │ '>' │ payload                      │
/// │     │ (1 byte) │     │ e.g. CTRL-EVENT-CONNECTED .. │
/// └─────┴──────────┴─────┴──────────────────────────────┘
/// ```
/// Anything not starting with `<` is a reply. A datagram that starts with
/// `<` but is too short or lacks the closing `>` is rejected with
/// [`MessageError::InvalidMarker`].
pub fn decode_message(datagram: &[u8]) -> Result<Message> {
    if datagram.first() != Some(&MARKER_OPEN) {
        return Ok(Message::Reply(trimmed_text(datagram)));
    }

    if datagram.len() < MARKER_LEN || datagram[2] != MARKER_CLOSE {
        return Err(MessageError::InvalidMarker {
            raw: String::from_utf8_lossy(datagram).into_owned(),
        });
    }

    Ok(Message::Event(Event {
        priority: Priority::from_marker(datagram[1]),
        text: trimmed_text(&datagram[MARKER_LEN..]),
    }))
}

fn trimmed_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
