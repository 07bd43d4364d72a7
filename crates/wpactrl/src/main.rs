mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, TargetArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "wpactrl",
    version,
    about = "wpa_supplicant control interface client"
)]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.target, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn parses_raw_command_words() {
        let cli = Cli::try_parse_from(["wpactrl", "cmd", "SET_NETWORK", "0", "ssid", "\"x\""])
            .expect("cmd args should parse");

        match cli.command {
            Command::Cmd(args) => assert_eq!(args.words, ["SET_NETWORK", "0", "ssid", "\"x\""]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn interface_selects_socket_under_ctrl_dir() {
        let cli = Cli::try_parse_from([
            "wpactrl",
            "--ctrl-dir",
            "/run/wpa",
            "-i",
            "wlp2s0",
            "status",
        ])
        .expect("status args should parse");

        assert!(matches!(cli.command, Command::Status));
        assert_eq!(cli.target.socket_path(), PathBuf::from("/run/wpa/wlp2s0"));
    }

    #[test]
    fn ctrl_path_overrides_interface() {
        let cli = Cli::try_parse_from([
            "wpactrl",
            "list-networks",
            "--ctrl-path",
            "/tmp/wpa.sock",
            "-i",
            "wlan1",
        ])
        .expect("global flags after subcommand should parse");

        assert_eq!(cli.target.socket_path(), PathBuf::from("/tmp/wpa.sock"));
    }

    #[test]
    fn rejects_psk_without_ssid() {
        let err = Cli::try_parse_from(["wpactrl", "add-network", "--psk", "secret"])
            .expect_err("psk requires ssid");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn cmd_requires_words() {
        let err = Cli::try_parse_from(["wpactrl", "cmd"]).expect_err("cmd needs a command");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
