//! Event priority levels.
//!
//! The daemon tags every event with its log level, `0` (most verbose) to `4`.

use std::fmt;

/// Priority carried in an event marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    MsgDump,
    Debug,
    Info,
    Warning,
    Error,
    /// A marker byte outside the known levels, kept as received.
    Other(u8),
}

impl Priority {
    /// Decode the byte between the angle brackets.
    pub fn from_marker(byte: u8) -> Self {
        match byte {
            b'0' => Self::MsgDump,
            b'1' => Self::Debug,
            b'2' => Self::Info,
            b'3' => Self::Warning,
            b'4' => Self::Error,
            other => Self::Other(other),
        }
    }

    /// Human-readable level name.
    pub fn name(self) -> &'static str {
        match self {
            Self::MsgDump => "msgdump",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Other(_) => "other",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(byte) => write!(f, "other({})", char::from(*byte)),
            level => f.write_str(level.name()),
        }
    }
}
