use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use wpactrl_supplicant::{Network, Status, SupplicantEvent};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    command: &'a str,
    reply: &'a str,
}

#[derive(Serialize)]
struct AckOutput<'a> {
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    ok: bool,
}

#[derive(Serialize)]
struct EventOutput<'a> {
    #[serde(flatten)]
    event: &'a SupplicantEvent,
    timestamp: String,
}

/// Print the daemon's reply to a raw command. Only the verb is echoed back.
pub fn print_reply(verb: &str, reply: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ReplyOutput {
            command: verb,
            reply,
        }),
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => println!("{reply}"),
    }
}

/// Confirm a command whose only result is success, plus the network id
/// when there is one.
pub fn print_ack(action: &str, id: Option<&str>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&AckOutput {
            action,
            id,
            ok: true,
        }),
        OutputFormat::Pretty => match id {
            Some(id) => println!("{action}: ok (id={id})"),
            None => println!("{action}: ok"),
        },
        OutputFormat::Table | OutputFormat::Raw => println!("{}", id.unwrap_or("OK")),
    }
}

pub fn print_networks(networks: &[Network], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&networks),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ID", "SSID"]);
            for net in networks {
                table.add_row(vec![net.id.as_str(), net.ssid.as_str()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for net in networks {
                println!("id={} ssid={}", net.id, net.ssid);
            }
        }
        OutputFormat::Raw => {
            for net in networks {
                println!("{}\t{}", net.id, net.ssid);
            }
        }
    }
}

pub fn print_status(status: &Status, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(status),
        OutputFormat::Table => {
            let mut table = new_table(vec!["KEY", "VALUE"]);
            for (key, value) in status.iter() {
                table.add_row(vec![key, value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for (key, value) in status.iter() {
                println!("{key}={value}");
            }
        }
    }
}

pub fn print_event(event: &SupplicantEvent, format: OutputFormat) {
    let reason = event.reason().map(ToString::to_string).unwrap_or_default();
    match format {
        OutputFormat::Json => print_json(&EventOutput {
            event,
            timestamp: now_unix_seconds(),
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["KIND", "REASON", "MESSAGE"]);
            table.add_row(vec![event.kind().name(), reason.as_str(), event.raw()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if reason.is_empty() {
                println!("[{}] {}", event.kind(), event.raw());
            } else {
                println!("[{}] reason={} {}", event.kind(), reason, event.raw());
            }
        }
        OutputFormat::Raw => print_raw(format!("{}\n", event.raw()).as_bytes()),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
