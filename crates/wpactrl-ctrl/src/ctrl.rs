use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{
    bounded, select, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError,
};
use tracing::{debug, trace, warn};
use wpactrl_message::{DatagramReader, Message, MessageError};
use wpactrl_transport::Datagram;

use crate::config::CtrlConfig;
use crate::error::{CtrlError, Result};

/// Reply meaning success with no payload.
pub const OK: &str = "OK";
/// Reply meaning failure with no payload.
pub const FAIL: &str = "FAIL";
/// Register this connection for unsolicited events.
pub const ATTACH: &str = "ATTACH";
/// Unregister this connection from unsolicited events.
pub const DETACH: &str = "DETACH";

/// Command interface to a supplicant control socket.
///
/// Only [`command`](Ctrl::command) and [`unsolicited`](Ctrl::unsolicited)
/// need implementing; the reply-checking helpers are derived from them.
pub trait Ctrl: Send {
    /// Send `cmd` and wait for its reply.
    fn command(&self, cmd: &str) -> Result<String>;

    /// Stream of unsolicited event payloads, priority marker stripped.
    ///
    /// The stream ends once the connection's reader stops. Clones of the
    /// receiver compete for the same events.
    fn unsolicited(&self) -> Receiver<String>;

    /// Close the connection.
    fn close(self)
    where
        Self: Sized;

    /// Run a command whose normal reply is exactly `OK`.
    ///
    /// Any other reply, `FAIL` included, becomes [`CtrlError::Rejected`]
    /// carrying the reply text.
    fn ok_command(&self, cmd: &str) -> Result<()> {
        let reply = self.command(cmd)?;
        if reply != OK {
            return Err(CtrlError::Rejected(reply));
        }
        Ok(())
    }

    /// Run a command that answers `FAIL` when it does not work.
    ///
    /// Every other reply, `OK` included, is returned unchanged since many
    /// commands answer with data.
    fn fail_command(&self, cmd: &str) -> Result<String> {
        let reply = self.command(cmd)?;
        if reply == FAIL {
            return Err(CtrlError::Rejected(reply));
        }
        Ok(reply)
    }

    /// Ask the daemon to deliver unsolicited events to this connection.
    fn attach(&self) -> Result<()> {
        self.ok_command(ATTACH)
    }

    /// Stop unsolicited event delivery to this connection.
    fn detach(&self) -> Result<()> {
        self.ok_command(DETACH)
    }
}

/// Demultiplexes one control connection into command replies and events.
///
/// A background reader owns the receive side of the transport. Replies go
/// into a single-slot queue read by the waiting [`command`](Ctrl::command);
/// events go into a bounded FIFO exposed by [`unsolicited`](Ctrl::unsolicited).
///
/// The protocol carries no correlation id, so only one command may be in
/// flight at a time. This is not enforced: concurrent commands from several
/// threads will receive each other's replies. A reply that arrives while no
/// command is waiting occupies the slot and is handed to the next command;
/// a further unmatched reply is dropped.
pub struct WpaCtrl<T: Datagram> {
    conn: Arc<T>,
    replies: Receiver<String>,
    events: Receiver<String>,
    stop: Option<Sender<()>>,
    reader: Option<JoinHandle<()>>,
    config: CtrlConfig,
}

impl<T: Datagram> WpaCtrl<T> {
    /// Start demultiplexing `conn` with the given command timeout.
    pub fn new(conn: T, command_timeout: Duration) -> Result<Self> {
        Self::with_config(
            conn,
            CtrlConfig::default().with_command_timeout(command_timeout),
        )
    }

    /// Start demultiplexing `conn` with explicit configuration.
    pub fn with_config(conn: T, config: CtrlConfig) -> Result<Self> {
        let conn = Arc::new(conn);
        let (reply_tx, replies) = bounded(1);
        let (event_tx, events) = bounded(config.event_capacity);
        let (stop, stop_rx) = bounded(0);

        let reader = DatagramReader::with_capacity(Arc::clone(&conn), config.max_datagram_size);
        let handle = thread::Builder::new()
            .name("wpactrl-reader".to_string())
            .spawn(move || receive_loop(reader, reply_tx, event_tx, stop_rx))
            .map_err(CtrlError::Spawn)?;

        debug!(
            timeout = ?config.command_timeout,
            event_capacity = config.event_capacity,
            "control reader started"
        );

        Ok(Self {
            conn,
            replies,
            events,
            stop: Some(stop),
            reader: Some(handle),
            config,
        })
    }

    /// Configuration this connection was created with.
    pub fn config(&self) -> &CtrlConfig {
        &self.config
    }

    /// Whether the background reader is still running.
    pub fn is_reading(&self) -> bool {
        self.reader
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.conn
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.reader.take() else {
            return;
        };

        // Dropping the sender is the cancellation signal.
        drop(self.stop.take());
        if let Err(err) = self.conn.close() {
            debug!(error = %err, "transport close failed");
        }
        if handle.join().is_err() {
            warn!("control reader panicked");
        }
        debug!("control reader stopped");
    }
}

impl<T: Datagram> Ctrl for WpaCtrl<T> {
    fn command(&self, cmd: &str) -> Result<String> {
        // Only the verb is logged; arguments may carry credentials.
        trace!(cmd = command_verb(cmd), "wpa command");

        let sent = self.conn.send(cmd.as_bytes())?;
        if sent != cmd.len() {
            return Err(CtrlError::ShortWrite {
                sent,
                len: cmd.len(),
            });
        }

        match self.replies.recv_timeout(self.config.command_timeout) {
            Ok(reply) => Ok(reply),
            Err(RecvTimeoutError::Timeout) => Err(CtrlError::Timeout(self.config.command_timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(CtrlError::Closed),
        }
    }

    fn unsolicited(&self) -> Receiver<String> {
        self.events.clone()
    }

    /// Detach (best effort), stop the reader and close the transport.
    ///
    /// Consumes the handle, so a connection cannot be closed twice.
    fn close(mut self) {
        if let Err(err) = self.detach() {
            debug!(error = %err, "detach during close failed");
        }
        self.shutdown();
    }
}

impl<T: Datagram> Drop for WpaCtrl<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<T: Datagram> std::fmt::Debug for WpaCtrl<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WpaCtrl")
            .field("config", &self.config)
            .field("pending_events", &self.events.len())
            .field("reading", &self.is_reading())
            .finish()
    }
}

fn command_verb(cmd: &str) -> &str {
    cmd.split_whitespace().next().unwrap_or("")
}

fn is_cancelled(stop: &Receiver<()>) -> bool {
    matches!(stop.try_recv(), Err(TryRecvError::Disconnected))
}

/// Route every inbound datagram to the reply slot or the event queue.
///
/// Both queues close when this returns, since it owns their senders.
fn receive_loop<T: Datagram>(
    mut reader: DatagramReader<T>,
    replies: Sender<String>,
    events: Sender<String>,
    stop: Receiver<()>,
) {
    loop {
        let result = reader.read_message();

        if is_cancelled(&stop) {
            debug!("control reader cancelled");
            return;
        }

        match result {
            Ok(Message::Event(event)) => {
                trace!(priority = %event.priority, msg = %event.text, "unsolicited message");
                select! {
                    send(events, event.text) -> sent => {
                        if sent.is_err() {
                            debug!("event queue dropped");
                            return;
                        }
                    }
                    recv(stop) -> _ => {
                        debug!("control reader cancelled");
                        return;
                    }
                }
            }
            Ok(Message::Reply(reply)) => match replies.try_send(reply) {
                Ok(()) => {}
                Err(TrySendError::Full(reply)) => {
                    warn!(event = "unexpected-reply", msg = %reply, "dropping reply");
                }
                Err(TrySendError::Disconnected(_)) => {
                    debug!("reply queue dropped");
                    return;
                }
            },
            Err(MessageError::InvalidMarker { raw }) => {
                warn!(event = "invalid-marker", msg = %raw, "dropping event");
            }
            Err(err) => {
                debug!(error = %err, "control reader stopped");
                return;
            }
        }
    }
}
