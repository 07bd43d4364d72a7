use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use tracing::{debug, trace, warn};
use wpactrl_transport::memory::{pair, MemoryDatagram};
use wpactrl_transport::{Datagram, DatagramListener};

use crate::error::{MockError, Result};
use crate::network::{MockNetwork, NetworkTable};

/// Commands longer than this are truncated, like the real daemon's buffer.
const MAX_COMMAND_SIZE: usize = 4096;

const BSSID: &str = "00:1a:dd:18:a4:25";

/// A scripted reply whose command did not match what the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: String,
    pub received: String,
}

type EnabledCallback<L> = Arc<dyn Fn(&MockSupplicant<L>, u32) + Send + Sync>;

/// Work to do once the reply has been sent.
enum FollowUp {
    None,
    NetworkEnabled(u32),
    Scan,
}

struct State<L: DatagramListener> {
    networks: NetworkTable,
    expectations: VecDeque<(String, String)>,
    unsolicited: Option<Arc<L::Reply>>,
    mismatches: Vec<Mismatch>,
    commands: Vec<String>,
    on_network_enabled: Option<EnabledCallback<L>>,
}

struct Shared<L: DatagramListener> {
    listener: L,
    closed: AtomicBool,
    state: Mutex<State<L>>,
}

/// Roughly emulates the daemon's state handling without any hardware.
///
/// Cloning yields another handle to the same daemon. The daemon thread runs
/// until the listener is closed or its peer goes away.
pub struct MockSupplicant<L: DatagramListener> {
    shared: Arc<Shared<L>>,
}

impl<L: DatagramListener> Clone for MockSupplicant<L> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Start a daemon on one half of an in-memory pair and return the other
/// half for the client.
pub fn spawn_memory() -> Result<(MockSupplicant<MemoryDatagram>, MemoryDatagram)> {
    let (client, server) = pair();
    let mock = MockSupplicant::spawn(server)?;
    Ok((mock, client))
}

impl<L: DatagramListener> MockSupplicant<L> {
    /// Serve the control protocol on `listener` from a background thread.
    pub fn spawn(listener: L) -> Result<Self> {
        let mock = Self {
            shared: Arc::new(Shared {
                listener,
                closed: AtomicBool::new(false),
                state: Mutex::new(State {
                    networks: NetworkTable::default(),
                    expectations: VecDeque::new(),
                    unsolicited: None,
                    mismatches: Vec::new(),
                    commands: Vec::new(),
                    on_network_enabled: None,
                }),
            }),
        };

        let daemon = mock.clone();
        thread::Builder::new()
            .name("wpactrl-mock".to_string())
            .spawn(move || daemon.serve())
            .map_err(MockError::Spawn)?;
        Ok(mock)
    }

    /// Answer the next command with `reply` instead of processing it.
    ///
    /// Expectations are consumed in the order they were queued. A command
    /// that does not match is recorded (see [`mismatches`](Self::mismatches))
    /// and answered with `FAIL`.
    pub fn expect(&self, cmd: &str, reply: &str) {
        self.lock()
            .expectations
            .push_back((cmd.to_string(), reply.to_string()));
    }

    /// Send a raw datagram to the attached client.
    ///
    /// The send happens outside the state lock, so a client that is slow to
    /// drain its events never stalls command handling.
    pub fn send_unsolicited(&self, msg: &str) -> Result<()> {
        let conn = self
            .lock()
            .unsolicited
            .clone()
            .ok_or(MockError::NotAttached)?;
        let sent = conn.send(msg.as_bytes())?;
        if sent != msg.len() {
            return Err(MockError::ShortWrite {
                sent,
                len: msg.len(),
            });
        }
        trace!(msg, "mock sent unsolicited message");
        Ok(())
    }

    /// Emit the event the daemon sends once network `id` is associated.
    pub fn announce_connected(&self, id: u32) -> Result<()> {
        self.require_network(id)?;
        self.send_unsolicited(&format!(
            "<2>CTRL-EVENT-CONNECTED - Connection to {BSSID} completed [id={id} id_str=]"
        ))
    }

    /// Emit the event the daemon sends when network `id` is lost.
    pub fn announce_disconnected(&self, id: u32) -> Result<()> {
        self.require_network(id)?;
        self.send_unsolicited(&format!(
            "<2>CTRL-EVENT-DISCONNECTED bssid={BSSID} reason=3 locally_generated=1"
        ))
    }

    /// Run `callback` after every successful `ENABLE_NETWORK` reply.
    pub fn on_network_enabled<F>(&self, callback: F)
    where
        F: Fn(&MockSupplicant<L>, u32) + Send + Sync + 'static,
    {
        let callback: EnabledCallback<L> = Arc::new(callback);
        self.lock().on_network_enabled = Some(callback);
    }

    /// Expectations that did not match the command received.
    pub fn mismatches(&self) -> Vec<Mismatch> {
        self.lock().mismatches.clone()
    }

    /// Every command received so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    /// Snapshot of the configured networks.
    pub fn networks(&self) -> Vec<MockNetwork> {
        self.lock().networks.snapshot()
    }

    /// Whether a client is registered for unsolicited messages.
    pub fn is_attached(&self) -> bool {
        self.lock().unsolicited.is_some()
    }

    /// Close the listener, stopping the daemon thread.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        if let Err(err) = self.shared.listener.close() {
            debug!(error = %err, "mock listener close failed");
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<L>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn require_network(&self, id: u32) -> Result<()> {
        if self.lock().networks.get(id).is_none() {
            return Err(MockError::UnknownNetwork(id));
        }
        Ok(())
    }

    fn serve(&self) {
        let mut buf = vec![0u8; MAX_COMMAND_SIZE];
        loop {
            let (n, addr) = match self.shared.listener.recv_from(&mut buf) {
                // A closed socket reports 0 bytes; otherwise it is an empty command.
                Ok((0, _)) if self.shared.closed.load(Ordering::SeqCst) => {
                    debug!("mock daemon listener shut down");
                    return;
                }
                Ok(received) => received,
                Err(err) => {
                    debug!(error = %err, "mock daemon stopped");
                    return;
                }
            };
            let cmd = String::from_utf8_lossy(&buf[..n]).into_owned();

            let reply_conn = match self.shared.listener.reply_channel(&addr) {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(error = %err, "couldn't get reply channel");
                    continue;
                }
            };

            let (reply, follow_up) = self.handle(&cmd, &addr);
            if let Err(err) = reply_conn.send(reply.as_bytes()) {
                warn!(error = %err, "mock reply failed");
                continue;
            }

            match follow_up {
                FollowUp::None => {}
                FollowUp::NetworkEnabled(id) => {
                    let callback = self.lock().on_network_enabled.clone();
                    if let Some(callback) = callback {
                        callback(self, id);
                    }
                }
                FollowUp::Scan => self.emit_scan_events(),
            }
        }
    }

    fn handle(&self, cmd: &str, addr: &L::Addr) -> (String, FollowUp) {
        let mut state = self.lock();
        state.commands.push(cmd.to_string());

        // An expectation mocks the reply, so the command is not processed.
        if let Some((expected, reply)) = state.expectations.pop_front() {
            if cmd != expected {
                warn!(expected = %expected, received = %cmd, "unexpected command");
                state.mismatches.push(Mismatch {
                    expected,
                    received: cmd.to_string(),
                });
                return ("FAIL".to_string(), FollowUp::None);
            }
            return (reply, FollowUp::None);
        }

        self.process(&mut state, cmd, addr)
    }

    fn process(&self, state: &mut State<L>, cmd: &str, addr: &L::Addr) -> (String, FollowUp) {
        let fields: Vec<&str> = cmd.splitn(4, ' ').collect();
        let reply = |text: &str| (text.to_string(), FollowUp::None);

        match fields[0] {
            "PING" => reply("PONG"),
            "ATTACH" => match self.shared.listener.reply_channel(addr) {
                Ok(conn) => {
                    state.unsolicited = Some(Arc::new(conn));
                    reply("OK")
                }
                Err(err) => {
                    warn!(error = %err, "attach failed");
                    reply("FAIL")
                }
            },
            "DETACH" => {
                state.unsolicited = None;
                reply("OK")
            }
            "LIST_NETWORKS" => (state.networks.render_list(), FollowUp::None),
            "ADD_NETWORK" => (state.networks.add().to_string(), FollowUp::None),
            "REMOVE_NETWORK" => match fields.get(1) {
                Some(&"all") => {
                    state.networks.clear();
                    reply("OK")
                }
                Some(id) => match id.parse() {
                    Ok(id) if state.networks.remove(id) => reply("OK"),
                    _ => reply("FAIL"),
                },
                None => reply("FAIL"),
            },
            "ENABLE_NETWORK" => match network_arg(state, &fields) {
                Some(net) => {
                    net.flags = "CURRENT".to_string();
                    let id = net.id;
                    (String::from("OK"), FollowUp::NetworkEnabled(id))
                }
                None => reply("FAIL"),
            },
            "DISABLE_NETWORK" => match network_arg(state, &fields) {
                Some(net) => {
                    net.flags = "DISABLED".to_string();
                    reply("OK")
                }
                None => reply("FAIL"),
            },
            "SELECT_NETWORK" => {
                let Some(id) = network_arg(state, &fields).map(|net| net.id) else {
                    return reply("FAIL");
                };
                for net in state.networks.iter_mut() {
                    net.flags = if net.id == id { "CURRENT" } else { "DISABLED" }.to_string();
                }
                reply("OK")
            }
            "SET_NETWORK" => {
                if fields.len() < 4 {
                    return reply("FAIL");
                }
                let value = fields[3].trim_matches('"').to_string();
                let key = fields[2];
                match network_arg(state, &fields) {
                    Some(net) if key == "ssid" => {
                        net.ssid = value;
                        reply("OK")
                    }
                    Some(net) if key == "psk" => {
                        net.psk = value;
                        reply("OK")
                    }
                    _ => reply("FAIL"),
                }
            }
            "SCAN" => (String::from("OK"), FollowUp::Scan),
            "STATUS" => (render_status(&state.networks), FollowUp::None),
            _ => reply("UNKNOWN COMMAND"),
        }
    }

    fn emit_scan_events(&self) {
        let events = [
            "<2>CTRL-EVENT-SCAN-STARTED ".to_string(),
            format!("<2>CTRL-EVENT-BSS-ADDED 0 {BSSID}"),
            "<2>CTRL-EVENT-SCAN-RESULTS ".to_string(),
        ];
        for event in &events {
            match self.send_unsolicited(event) {
                Ok(()) | Err(MockError::NotAttached) => {}
                Err(err) => warn!(error = %err, "scan event failed"),
            }
        }
    }
}

fn network_arg<'a, L: DatagramListener>(
    state: &'a mut State<L>,
    fields: &[&str],
) -> Option<&'a mut MockNetwork> {
    let id = fields.get(1)?.parse().ok()?;
    state.networks.get_mut(id)
}

fn render_status(networks: &NetworkTable) -> String {
    match networks.current() {
        Some(net) => format!(
            "bssid={BSSID}\nssid={}\nid={}\nmode=station\nkey_mgmt=WPA2-PSK\nwpa_state=COMPLETED",
            net.ssid, net.id
        ),
        None => "wpa_state=DISCONNECTED".to_string(),
    }
}

impl<L: DatagramListener> std::fmt::Debug for MockSupplicant<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MockSupplicant")
            .field("networks", &state.networks)
            .field("attached", &state.unsolicited.is_some())
            .field("pending_expectations", &state.expectations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use wpactrl_transport::memory::pair_with_capacity;

    use super::*;

    fn roundtrip(client: &MemoryDatagram, cmd: &str) -> String {
        client.send(cmd.as_bytes()).unwrap();
        let mut buf = [0u8; 4096];
        let n = client.recv(&mut buf).unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    #[test]
    fn ping_pong() {
        let (_mock, client) = spawn_memory().unwrap();
        assert_eq!(roundtrip(&client, "PING"), "PONG");
    }

    #[test]
    fn unknown_command() {
        let (_mock, client) = spawn_memory().unwrap();
        assert_eq!(roundtrip(&client, "BOGUS 1 2"), "UNKNOWN COMMAND");
    }

    #[test]
    fn network_lifecycle() {
        let (mock, client) = spawn_memory().unwrap();
        assert_eq!(roundtrip(&client, "ADD_NETWORK"), "0");
        assert_eq!(roundtrip(&client, "SET_NETWORK 0 ssid \"my home net\""), "OK");
        assert_eq!(roundtrip(&client, "SET_NETWORK 0 psk \"foopsk\""), "OK");
        assert_eq!(roundtrip(&client, "SET_NETWORK 0 bssid \"x\""), "FAIL");
        assert_eq!(roundtrip(&client, "ENABLE_NETWORK 0"), "OK");

        let nets = mock.networks();
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].ssid, "my home net");
        assert_eq!(nets[0].psk, "foopsk");
        assert_eq!(nets[0].flags, "CURRENT");

        assert_eq!(
            roundtrip(&client, "LIST_NETWORKS"),
            "network id / ssid / bssid / flags\n0\tmy home net\tany\t[CURRENT]"
        );
        assert!(roundtrip(&client, "STATUS").contains("wpa_state=COMPLETED"));

        assert_eq!(roundtrip(&client, "REMOVE_NETWORK 0"), "OK");
        assert_eq!(roundtrip(&client, "REMOVE_NETWORK 0"), "FAIL");
        assert_eq!(roundtrip(&client, "STATUS"), "wpa_state=DISCONNECTED");
    }

    #[test]
    fn bad_network_arguments_fail() {
        let (_mock, client) = spawn_memory().unwrap();
        assert_eq!(roundtrip(&client, "ENABLE_NETWORK"), "FAIL");
        assert_eq!(roundtrip(&client, "ENABLE_NETWORK 4"), "FAIL");
        assert_eq!(roundtrip(&client, "DISABLE_NETWORK x"), "FAIL");
        assert_eq!(roundtrip(&client, "SET_NETWORK 0 ssid"), "FAIL");
        assert_eq!(roundtrip(&client, "REMOVE_NETWORK"), "FAIL");
    }

    #[test]
    fn select_network_disables_others() {
        let (mock, client) = spawn_memory().unwrap();
        roundtrip(&client, "ADD_NETWORK");
        roundtrip(&client, "ADD_NETWORK");
        assert_eq!(roundtrip(&client, "SELECT_NETWORK 1"), "OK");

        let flags: Vec<String> = mock.networks().into_iter().map(|n| n.flags).collect();
        assert_eq!(flags, vec!["DISABLED", "CURRENT"]);
    }

    #[test]
    fn expectation_overrides_reply() {
        let (mock, client) = spawn_memory().unwrap();
        mock.expect("TEST_CMD", "canned");
        assert_eq!(roundtrip(&client, "TEST_CMD"), "canned");
        assert_eq!(roundtrip(&client, "PING"), "PONG");
        assert!(mock.mismatches().is_empty());
    }

    #[test]
    fn expectation_mismatch_recorded() {
        let (mock, client) = spawn_memory().unwrap();
        mock.expect("TEST_CMD", "OK");
        assert_eq!(roundtrip(&client, "OTHER_CMD"), "FAIL");
        assert_eq!(
            mock.mismatches(),
            vec![Mismatch {
                expected: "TEST_CMD".to_string(),
                received: "OTHER_CMD".to_string(),
            }]
        );
    }

    #[test]
    fn unsolicited_requires_attach() {
        let (mock, client) = spawn_memory().unwrap();
        assert!(matches!(
            mock.send_unsolicited("<2>X"),
            Err(MockError::NotAttached)
        ));

        assert_eq!(roundtrip(&client, "ATTACH"), "OK");
        mock.send_unsolicited("<2>X").unwrap();
        let mut buf = [0u8; 16];
        let n = client.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<2>X");

        assert_eq!(roundtrip(&client, "DETACH"), "OK");
        assert!(!mock.is_attached());
    }

    #[test]
    fn announce_requires_known_network() {
        let (mock, client) = spawn_memory().unwrap();
        roundtrip(&client, "ATTACH");
        assert!(matches!(
            mock.announce_connected(3),
            Err(MockError::UnknownNetwork(3))
        ));

        roundtrip(&client, "ADD_NETWORK");
        mock.announce_disconnected(0).unwrap();
        let mut buf = [0u8; 256];
        let n = client.recv(&mut buf).unwrap();
        let msg = String::from_utf8_lossy(&buf[..n]);
        assert!(msg.starts_with("<2>CTRL-EVENT-DISCONNECTED"));
        assert!(msg.contains("reason=3"));
    }

    #[test]
    fn scan_emits_events_after_reply() {
        let (_mock, client) = spawn_memory().unwrap();
        roundtrip(&client, "ATTACH");
        assert_eq!(roundtrip(&client, "SCAN"), "OK");

        let mut buf = [0u8; 256];
        let mut seen = Vec::new();
        for _ in 0..3 {
            let n = client.recv(&mut buf).unwrap();
            seen.push(String::from_utf8_lossy(&buf[..n]).trim().to_string());
        }
        assert_eq!(seen[0], "<2>CTRL-EVENT-SCAN-STARTED");
        assert!(seen[1].starts_with("<2>CTRL-EVENT-BSS-ADDED"));
        assert_eq!(seen[2], "<2>CTRL-EVENT-SCAN-RESULTS");
    }

    #[test]
    fn network_enabled_callback_runs_after_reply() {
        let (mock, client) = spawn_memory().unwrap();
        let (tx, rx) = mpsc::channel();
        mock.on_network_enabled(move |mock, id| {
            mock.announce_connected(id).unwrap();
            tx.send(id).unwrap();
        });

        roundtrip(&client, "ATTACH");
        roundtrip(&client, "ADD_NETWORK");
        assert_eq!(roundtrip(&client, "ENABLE_NETWORK 0"), "OK");
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), 0);

        let mut buf = [0u8; 256];
        let n = client.recv(&mut buf).unwrap();
        assert!(String::from_utf8_lossy(&buf[..n]).contains("CTRL-EVENT-CONNECTED"));
    }

    #[test]
    fn empty_command_is_answered() {
        let (mock, client) = spawn_memory().unwrap();
        assert_eq!(roundtrip(&client, ""), "UNKNOWN COMMAND");
        assert_eq!(roundtrip(&client, "PING"), "PONG");
        assert_eq!(mock.commands(), vec!["", "PING"]);
    }

    #[test]
    fn blocked_event_send_leaves_state_available() {
        let (client, server) = pair_with_capacity(1);
        let mock = MockSupplicant::spawn(server).unwrap();
        assert_eq!(roundtrip(&client, "ATTACH"), "OK");

        // Fill the client's queue so the next event send blocks.
        mock.send_unsolicited("<2>first").unwrap();
        let sender = {
            let mock = mock.clone();
            std::thread::spawn(move || mock.send_unsolicited("<2>second"))
        };
        std::thread::sleep(Duration::from_millis(50));

        let (tx, rx) = mpsc::channel();
        {
            let mock = mock.clone();
            std::thread::spawn(move || {
                mock.expect("PING", "PONG");
                tx.send(mock.is_attached()).unwrap();
            });
        }
        assert!(rx.recv_timeout(Duration::from_secs(1)).unwrap());

        let mut buf = [0u8; 64];
        let n = client.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<2>first");
        sender.join().unwrap().unwrap();
        let n = client.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<2>second");
    }

    #[test]
    fn close_disconnects_client() {
        let (mock, client) = spawn_memory().unwrap();
        assert_eq!(roundtrip(&client, "PING"), "PONG");
        mock.close();

        let mut buf = [0u8; 16];
        assert!(client.recv(&mut buf).is_err());
    }

    #[test]
    fn commands_logged_in_order() {
        let (mock, client) = spawn_memory().unwrap();
        roundtrip(&client, "PING");
        roundtrip(&client, "ADD_NETWORK");
        assert_eq!(mock.commands(), vec!["PING", "ADD_NETWORK"]);
    }
}
