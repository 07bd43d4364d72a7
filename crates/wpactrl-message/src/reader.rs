use std::sync::Arc;

use tracing::trace;
use wpactrl_transport::Datagram;

use crate::codec::{decode_message, Message};
use crate::error::Result;

/// Default receive buffer size. Longer datagrams are truncated.
pub const DEFAULT_MAX_DATAGRAM: usize = 4096;

/// Reads and classifies one datagram at a time from a shared transport.
///
/// A receive always yields one whole message, so there is no buffering
/// across calls; the buffer only bounds the largest datagram accepted.
pub struct DatagramReader<T> {
    inner: Arc<T>,
    buf: Vec<u8>,
}

impl<T: Datagram> DatagramReader<T> {
    /// Create a reader with the default buffer size.
    pub fn new(inner: Arc<T>) -> Self {
        Self::with_capacity(inner, DEFAULT_MAX_DATAGRAM)
    }

    /// Create a reader that accepts datagrams up to `max_datagram` bytes.
    pub fn with_capacity(inner: Arc<T>, max_datagram: usize) -> Self {
        Self {
            inner,
            buf: vec![0u8; max_datagram.max(1)],
        }
    }

    /// Receive the next datagram and classify it (blocking).
    ///
    /// An empty datagram is an empty reply. A shut-down socket also reports
    /// zero bytes, so callers that close the transport must check their own
    /// stop signal before trusting the result.
    pub fn read_message(&mut self) -> Result<Message> {
        let n = self.inner.recv(&mut self.buf)?;
        trace!(len = n, "datagram received");
        decode_message(&self.buf[..n])
    }

    /// Largest datagram accepted without truncation.
    pub fn max_datagram(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }
}
