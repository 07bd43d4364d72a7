//! In-memory datagram transport.
//!
//! Emulates a connected pair of Unix datagram sockets closely enough to drive
//! the control client and the simulated daemon without touching the
//! filesystem. Only the basic 1:1 pattern is supported: the listening half
//! answers every sender over itself.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::{Datagram, DatagramListener};

/// Datagrams queued per direction before `send` blocks.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// One half of an in-memory datagram pair. Clones share the same endpoint.
#[derive(Clone)]
pub struct MemoryDatagram {
    inner: Arc<Inner>,
}

struct Inner {
    inbound: Receiver<Bytes>,
    outbound: Mutex<Option<Sender<Bytes>>>,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    shutdown_rx: Receiver<()>,
}

/// Create two connected halves with the default queue capacity.
pub fn pair() -> (MemoryDatagram, MemoryDatagram) {
    pair_with_capacity(DEFAULT_QUEUE_CAPACITY)
}

/// Create two connected halves, each direction holding up to `capacity`
/// datagrams.
pub fn pair_with_capacity(capacity: usize) -> (MemoryDatagram, MemoryDatagram) {
    let (left_tx, right_rx) = bounded(capacity);
    let (right_tx, left_rx) = bounded(capacity);
    (
        MemoryDatagram::new(left_rx, left_tx),
        MemoryDatagram::new(right_rx, right_tx),
    )
}

impl MemoryDatagram {
    fn new(inbound: Receiver<Bytes>, outbound: Sender<Bytes>) -> Self {
        let (shutdown_tx, shutdown_rx) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                inbound,
                outbound: Mutex::new(Some(outbound)),
                shutdown_tx: Mutex::new(Some(shutdown_tx)),
                shutdown_rx,
            }),
        }
    }

    /// Whether [`close`](Datagram::close) has been called on this endpoint.
    pub fn is_closed(&self) -> bool {
        self.inner
            .shutdown_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Datagram for MemoryDatagram {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        let outbound = self
            .inner
            .outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(TransportError::Shutdown)?;

        outbound.send(Bytes::copy_from_slice(buf)).map_err(|_| {
            TransportError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "peer endpoint dropped",
            ))
        })?;
        trace!(len = buf.len(), "memory datagram sent");
        Ok(buf.len())
    }

    fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        if self.is_closed() {
            return Err(TransportError::Shutdown);
        }

        select! {
            recv(self.inner.inbound) -> msg => {
                let msg = msg.map_err(|_| {
                    TransportError::Io(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "peer endpoint closed",
                    ))
                })?;
                let n = msg.len().min(buf.len());
                buf[..n].copy_from_slice(&msg[..n]);
                Ok(n)
            }
            recv(self.inner.shutdown_rx) -> _ => Err(TransportError::Shutdown),
        }
    }

    fn close(&self) -> Result<()> {
        self.inner
            .outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.inner
            .shutdown_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

impl DatagramListener for MemoryDatagram {
    type Addr = ();
    type Reply = MemoryDatagram;

    fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, Self::Addr)> {
        let n = self.recv(buf)?;
        Ok((n, ()))
    }

    fn reply_channel(&self, _addr: &Self::Addr) -> Result<Self::Reply> {
        Ok(self.clone())
    }
}

impl std::fmt::Debug for MemoryDatagram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDatagram")
            .field("queued", &self.inner.inbound.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn pair_roundtrip() {
        let (client, server) = pair();
        client.send(b"PING").unwrap();

        let mut buf = [0u8; 64];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"PING");

        server.send(b"PONG").unwrap();
        let n = client.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"PONG");
    }

    #[test]
    fn datagram_boundaries_preserved() {
        let (client, server) = pair();
        client.send(b"one").unwrap();
        client.send(b"two").unwrap();

        let mut buf = [0u8; 64];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"one");
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"two");
    }

    #[test]
    fn oversized_datagram_truncated() {
        let (client, server) = pair();
        client.send(b"0123456789").unwrap();

        let mut buf = [0u8; 4];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(n, 4);
        assert_eq!(&buf, b"0123");
    }

    #[test]
    fn close_wakes_blocked_receiver() {
        let (client, _server) = pair();
        let reader = client.clone();
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 16];
            reader.recv(&mut buf)
        });

        thread::sleep(Duration::from_millis(20));
        client.close().unwrap();

        let result = handle.join().expect("reader thread should finish");
        assert!(matches!(result, Err(TransportError::Shutdown)));
    }

    #[test]
    fn peer_close_disconnects_inbound() {
        let (client, server) = pair();
        server.close().unwrap();

        let mut buf = [0u8; 16];
        let err = client.recv(&mut buf).unwrap_err();
        assert!(matches!(err, TransportError::Io(e) if e.kind() == io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn send_after_close_fails() {
        let (client, _server) = pair();
        client.close().unwrap();
        assert!(client.is_closed());
        assert!(matches!(client.send(b"x"), Err(TransportError::Shutdown)));
    }

    #[test]
    fn listener_replies_on_same_endpoint() {
        let (client, server) = pair();
        client.send(b"ATTACH").unwrap();

        let mut buf = [0u8; 16];
        let (n, addr) = server.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ATTACH");

        let reply = server.reply_channel(&addr).unwrap();
        reply.send(b"OK").unwrap();
        let n = client.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"OK");
    }
}
