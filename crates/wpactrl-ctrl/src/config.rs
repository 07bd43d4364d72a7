use std::time::Duration;

use wpactrl_message::DEFAULT_MAX_DATAGRAM;

/// Per-connection behaviour of a [`WpaCtrl`](crate::WpaCtrl).
#[derive(Debug, Clone)]
pub struct CtrlConfig {
    /// How long `command` waits for a reply.
    pub command_timeout: Duration,
    /// Events buffered before the reader waits for a consumer.
    pub event_capacity: usize,
    /// Receive buffer size; longer datagrams are truncated.
    pub max_datagram_size: usize,
}

impl CtrlConfig {
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_EVENT_CAPACITY: usize = 100;

    /// Override the command timeout.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Override the event queue capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Override the receive buffer size.
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size;
        self
    }
}

impl Default for CtrlConfig {
    fn default() -> Self {
        Self {
            command_timeout: Self::DEFAULT_COMMAND_TIMEOUT,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
            max_datagram_size: DEFAULT_MAX_DATAGRAM,
        }
    }
}
