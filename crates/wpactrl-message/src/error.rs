use wpactrl_transport::TransportError;

/// Errors that can occur while reading or classifying control datagrams.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The datagram starts with `<` but the priority marker is incomplete.
    #[error("invalid priority marker in {raw:?}")]
    InvalidMarker { raw: String },

    /// A transport error occurred while receiving.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, MessageError>;
