use crate::error::Result;

/// A full-duplex datagram channel.
///
/// Every call moves exactly one datagram. All methods take `&self` so that a
/// background reader can block in [`recv`](Datagram::recv) while other
/// threads send or close the channel.
pub trait Datagram: Send + Sync + 'static {
    /// Send one datagram, returning the number of bytes written.
    fn send(&self, buf: &[u8]) -> Result<usize>;

    /// Receive one datagram into `buf`.
    ///
    /// Datagrams longer than `buf` are truncated.
    fn recv(&self, buf: &mut [u8]) -> Result<usize>;

    /// Close the channel. A thread blocked in `recv` must return.
    fn close(&self) -> Result<()>;
}

/// The listening side of a datagram channel.
///
/// A listener serves many senders, so it reports who sent each datagram and
/// can open a reply channel back to them.
pub trait DatagramListener: Datagram {
    /// Address of a sender.
    type Addr: Send + 'static;

    /// Channel used to answer a sender.
    type Reply: Datagram;

    /// Receive one datagram together with its sender.
    fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, Self::Addr)>;

    /// Open a channel for replying to `addr`.
    fn reply_channel(&self, addr: &Self::Addr) -> Result<Self::Reply>;
}
