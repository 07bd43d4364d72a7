use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use wpactrl_ctrl::{connect, CtrlConfig, WpaCtrl};
use wpactrl_supplicant::SupplicantCtrl;
use wpactrl_transport::UnixDatagramConn;

use crate::exit::{ctrl_error, supplicant_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod events;
pub mod mock;
pub mod network;
pub mod raw;
pub mod scan;
pub mod status;
pub mod version;

/// Default directory holding one control socket per interface.
pub const DEFAULT_CTRL_DIR: &str = "/var/run/wpa_supplicant";

/// How often blocking loops check for Ctrl-C.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub type Client = SupplicantCtrl<WpaCtrl<UnixDatagramConn>>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a raw control command and print the reply.
    Cmd(CmdArgs),
    /// Show the current connection status.
    Status,
    /// List configured networks.
    ListNetworks,
    /// Create a network, optionally configuring and enabling it.
    AddNetwork(AddNetworkArgs),
    /// Remove a network.
    RemoveNetwork(NetworkIdArgs),
    /// Enable a network.
    EnableNetwork(NetworkIdArgs),
    /// Disable a network.
    DisableNetwork(NetworkIdArgs),
    /// Enable one network and disable all others.
    SelectNetwork(NetworkIdArgs),
    /// Request a scan.
    Scan(ScanArgs),
    /// Attach and print events as they arrive.
    Events(EventsArgs),
    /// Run a simulated daemon on a Unix datagram socket.
    Mock(MockArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, target: &TargetArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Cmd(args) => raw::run(args, target, format),
        Command::Status => status::run(target, format),
        Command::ListNetworks => network::list(target, format),
        Command::AddNetwork(args) => network::add(args, target, format),
        Command::RemoveNetwork(args) => network::remove(args, target, format),
        Command::EnableNetwork(args) => network::enable(args, target, format),
        Command::DisableNetwork(args) => network::disable(args, target, format),
        Command::SelectNetwork(args) => network::select(args, target, format),
        Command::Scan(args) => scan::run(args, target, format),
        Command::Events(args) => events::run(args, target, format),
        Command::Mock(args) => mock::run(args),
        Command::Version(args) => version::run(args),
    }
}

/// Which control socket to talk to.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Full path of the control socket. Takes precedence over --ctrl-dir.
    #[arg(long, value_name = "PATH", env = "WPACTRL_CTRL_PATH", global = true)]
    pub ctrl_path: Option<PathBuf>,

    /// Directory holding per-interface control sockets.
    #[arg(
        long,
        value_name = "DIR",
        env = "WPACTRL_CTRL_DIR",
        default_value = DEFAULT_CTRL_DIR,
        global = true
    )]
    pub ctrl_dir: PathBuf,

    /// Wireless interface name.
    #[arg(
        long,
        short = 'i',
        value_name = "IFACE",
        env = "WPACTRL_INTERFACE",
        default_value = "wlan0",
        global = true
    )]
    pub interface: String,

    /// Reply timeout per command (e.g. 1s, 500ms).
    #[arg(long, value_name = "DURATION", default_value = "1s", global = true)]
    pub timeout: String,
}

impl TargetArgs {
    pub fn socket_path(&self) -> PathBuf {
        match &self.ctrl_path {
            Some(path) => path.clone(),
            None => self.ctrl_dir.join(&self.interface),
        }
    }

    pub fn connect(&self) -> CliResult<Client> {
        let timeout = parse_duration(&self.timeout)?;
        let path = self.socket_path();
        let config = CtrlConfig::default().with_command_timeout(timeout);
        let ctrl = connect(&path, config).map_err(|err| {
            ctrl_error(&format!("connect to {} failed", path.display()), err)
        })?;
        SupplicantCtrl::new(ctrl).map_err(|err| supplicant_error("startup failed", err))
    }
}

/// Connect, run `f`, then close the connection whatever `f` returned.
pub(crate) fn with_client<T>(
    target: &TargetArgs,
    f: impl FnOnce(&Client) -> CliResult<T>,
) -> CliResult<T> {
    let client = target.connect()?;
    let result = f(&client);
    client.close();
    result
}

#[derive(Args, Debug)]
pub struct CmdArgs {
    /// Command and arguments, joined with single spaces.
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub words: Vec<String>,
}

#[derive(Args, Debug)]
pub struct AddNetworkArgs {
    /// Network name.
    #[arg(long)]
    pub ssid: Option<String>,
    /// Pre-shared key or passphrase.
    #[arg(long, requires = "ssid")]
    pub psk: Option<String>,
    /// Enable the network once configured.
    #[arg(long)]
    pub enable: bool,
}

#[derive(Args, Debug)]
pub struct NetworkIdArgs {
    /// Network id as shown by list-networks.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Attach and print scan events until results are available.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for results when --wait is set (e.g. 10s).
    #[arg(long, default_value = "10s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Exit after printing N events.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct MockArgs {
    /// Socket path to bind.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}

/// Clear `running` on Ctrl-C.
pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert_eq!(parse_duration("0s").unwrap_err().code, USAGE);
        assert_eq!(parse_duration("bad").unwrap_err().code, USAGE);
        assert_eq!(parse_duration("").unwrap_err().code, USAGE);
    }
}
