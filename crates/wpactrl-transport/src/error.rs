use std::path::PathBuf;

/// Errors raised by datagram transports.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not bind a socket at `path`. For clients this is the private
    /// reply socket, not the daemon's.
    #[error("cannot bind socket {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The daemon's control socket could not be reached.
    #[error("cannot reach control socket {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unix socket addresses are limited to `max` bytes.
    #[error("socket path {path} is {len} bytes, limit is {max}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// A datagram arrived from an unbound socket, so there is nowhere to
    /// send the reply.
    #[error("sender has no reply address")]
    UnnamedPeer,

    /// This end, or its in-memory peer, has been closed.
    #[error("transport closed")]
    Shutdown,
}

pub type Result<T> = std::result::Result<T, TransportError>;
