use std::fmt;
use std::io;

use wpactrl_ctrl::CtrlError;
use wpactrl_mock::MockError;
use wpactrl_supplicant::SupplicantError;
use wpactrl_transport::TransportError;

pub const SUCCESS: i32 = 0;
/// Command failed or the daemon rejected it.
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::NotConnected => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Io(source) => io_error(context, source),
        TransportError::PathTooLong { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn ctrl_error(context: &str, err: CtrlError) -> CliError {
    match err {
        CtrlError::Transport(err) => transport_error(context, err),
        CtrlError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        CtrlError::Rejected(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        CtrlError::Closed | CtrlError::ShortWrite { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        CtrlError::Spawn(source) => CliError::new(INTERNAL, format!("{context}: {source}")),
    }
}

pub fn supplicant_error(context: &str, err: SupplicantError) -> CliError {
    match err {
        SupplicantError::Ctrl(err) => ctrl_error(context, err),
        SupplicantError::MalformedNetwork { .. } | SupplicantError::MalformedStatus { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        SupplicantError::Spawn(source) => CliError::new(INTERNAL, format!("{context}: {source}")),
    }
}

pub fn mock_error(context: &str, err: MockError) -> CliError {
    match err {
        MockError::Transport(err) => transport_error(context, err),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
