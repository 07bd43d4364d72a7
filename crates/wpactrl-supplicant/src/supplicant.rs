use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, select, Receiver, Sender};
use tracing::{debug, trace};
use wpactrl_ctrl::Ctrl;

use crate::error::{Result, SupplicantError};
use crate::event::SupplicantEvent;

/// A control connection whose unsolicited messages arrive as typed events.
///
/// Events are handed over one at a time: the classifier waits until the
/// previous event has been taken before reading the next raw message, so a
/// consumer that stops reading eventually backs up the connection's event
/// queue.
pub struct SupplicantCtrl<C: Ctrl> {
    ctrl: C,
    events: Receiver<SupplicantEvent>,
    stop: Sender<()>,
    classifier: JoinHandle<()>,
}

impl<C: Ctrl> SupplicantCtrl<C> {
    /// Wrap `ctrl` and start classifying its unsolicited stream.
    pub fn new(ctrl: C) -> Result<Self> {
        let raw = ctrl.unsolicited();
        let (event_tx, events) = bounded(0);
        let (stop, stop_rx) = bounded(0);

        let classifier = thread::Builder::new()
            .name("wpactrl-classifier".to_string())
            .spawn(move || classify_loop(raw, event_tx, stop_rx))
            .map_err(SupplicantError::Spawn)?;
        debug!("event classifier started");

        Ok(Self {
            ctrl,
            events,
            stop,
            classifier,
        })
    }

    /// Typed events, in the order they were received.
    ///
    /// The stream ends after [`close`](Self::close) or once the wrapped
    /// connection stops reading.
    pub fn events(&self) -> &Receiver<SupplicantEvent> {
        &self.events
    }

    /// The wrapped connection, for raw commands.
    pub fn ctrl(&self) -> &C {
        &self.ctrl
    }

    /// Stop the classifier, close the connection and wait for the
    /// classifier thread to exit.
    pub fn close(self) {
        let Self {
            ctrl,
            events,
            stop,
            classifier,
        } = self;
        drop(stop);
        drop(events);
        ctrl.close();
        if classifier.join().is_err() {
            debug!("event classifier panicked");
        }
    }
}

fn classify_loop(
    raw: Receiver<String>,
    events: Sender<SupplicantEvent>,
    stop: Receiver<()>,
) {
    loop {
        let msg = select! {
            recv(raw) -> msg => match msg {
                Ok(msg) => msg,
                Err(_) => break,
            },
            recv(stop) -> _ => break,
        };

        let event = SupplicantEvent::classify(msg);
        trace!(kind = %event.kind(), "classified event");
        select! {
            send(events, event) -> sent => if sent.is_err() {
                break;
            },
            recv(stop) -> _ => break,
        }
    }
    debug!("event classifier exited");
}

impl<C: Ctrl + std::fmt::Debug> std::fmt::Debug for SupplicantCtrl<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupplicantCtrl")
            .field("ctrl", &self.ctrl)
            .field("classifying", &!self.classifier.is_finished())
            .finish()
    }
}
