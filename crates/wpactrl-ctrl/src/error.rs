use std::time::Duration;

use wpactrl_transport::TransportError;

/// Errors that can occur while talking to the daemon.
#[derive(Debug, thiserror::Error)]
pub enum CtrlError {
    /// Writing the command failed.
    #[error("command error: {0}")]
    Transport(#[from] TransportError),

    /// The transport accepted only part of the command.
    #[error("command error: short write ({sent} of {len} bytes)")]
    ShortWrite { sent: usize, len: usize },

    /// No reply arrived within the configured command timeout.
    #[error("cmd timeout after {0:?}")]
    Timeout(Duration),

    /// The reader stopped before a reply arrived.
    #[error("connection closed")]
    Closed,

    /// The daemon answered with something other than the expected reply.
    /// Displays as the reply text, verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The background reader could not be started.
    #[error("failed to start reader thread: {0}")]
    Spawn(std::io::Error),
}

impl CtrlError {
    /// True when the command timed out. Timeouts are safe to retry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// The daemon's reply, when the error is a protocol rejection.
    pub fn reply(&self) -> Option<&str> {
        match self {
            Self::Rejected(reply) => Some(reply),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CtrlError>;
