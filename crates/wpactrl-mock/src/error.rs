/// Errors raised by the simulated daemon's scripting interface.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// An event was requested before any client sent `ATTACH`.
    #[error("no client attached for unsolicited messages")]
    NotAttached,

    /// The referenced network does not exist.
    #[error("unknown network {0}")]
    UnknownNetwork(u32),

    /// The event channel accepted only part of the message.
    #[error("incomplete send ({sent} of {len} bytes)")]
    ShortWrite { sent: usize, len: usize },

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] wpactrl_transport::TransportError),

    /// The daemon thread could not be started.
    #[error("failed to start daemon thread: {0}")]
    Spawn(std::io::Error),
}

pub type Result<T> = std::result::Result<T, MockError>;
