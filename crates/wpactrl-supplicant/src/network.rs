use serde::Serialize;
use tracing::debug;
use wpactrl_ctrl::Ctrl;

use crate::error::{Result, SupplicantError};
use crate::status::Status;
use crate::supplicant::SupplicantCtrl;

/// A configured network as reported by `LIST_NETWORKS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Network {
    pub id: String,
    pub ssid: String,
}

/// Parse a `LIST_NETWORKS` reply.
///
/// The first line is a column header and is skipped. Each remaining line
/// must carry at least an id and an ssid separated by a tab.
pub fn parse_network_list(reply: &str) -> Result<Vec<Network>> {
    reply
        .lines()
        .enumerate()
        .skip(1)
        .map(|(idx, line)| {
            let mut fields = line.split('\t');
            match (fields.next(), fields.next()) {
                (Some(id), Some(ssid)) => Ok(Network {
                    id: id.to_string(),
                    ssid: ssid.to_string(),
                }),
                _ => Err(SupplicantError::MalformedNetwork {
                    line: idx + 1,
                    content: line.to_string(),
                }),
            }
        })
        .collect()
}

impl<C: Ctrl> SupplicantCtrl<C> {
    /// Create an empty network and return its id.
    pub fn add_network(&self) -> Result<String> {
        let id = self.ctrl().fail_command("ADD_NETWORK")?;
        debug!(id = %id, "network added");
        Ok(id)
    }

    /// Set a network variable. The value is always sent quoted.
    pub fn set_network(&self, id: &str, key: &str, value: &str) -> Result<()> {
        self.ctrl()
            .ok_command(&format!("SET_NETWORK {id} {key} \"{value}\""))?;
        Ok(())
    }

    pub fn set_ssid(&self, id: &str, ssid: &str) -> Result<()> {
        self.set_network(id, "ssid", ssid)
    }

    pub fn set_psk(&self, id: &str, psk: &str) -> Result<()> {
        self.set_network(id, "psk", psk)
    }

    pub fn enable_network(&self, id: &str) -> Result<()> {
        self.ctrl().ok_command(&format!("ENABLE_NETWORK {id}"))?;
        Ok(())
    }

    pub fn disable_network(&self, id: &str) -> Result<()> {
        self.ctrl().ok_command(&format!("DISABLE_NETWORK {id}"))?;
        Ok(())
    }

    /// Enable `id` and disable every other network.
    pub fn select_network(&self, id: &str) -> Result<()> {
        self.ctrl().ok_command(&format!("SELECT_NETWORK {id}"))?;
        Ok(())
    }

    pub fn remove_network(&self, id: &str) -> Result<()> {
        self.ctrl().ok_command(&format!("REMOVE_NETWORK {id}"))?;
        debug!(id, "network removed");
        Ok(())
    }

    /// Configured networks, in the daemon's order.
    pub fn list_networks(&self) -> Result<Vec<Network>> {
        let reply = self.ctrl().fail_command("LIST_NETWORKS")?;
        parse_network_list(&reply)
    }

    /// Request a scan. Results arrive as events.
    pub fn scan(&self) -> Result<()> {
        self.ctrl().ok_command("SCAN")?;
        Ok(())
    }

    pub fn status(&self) -> Result<Status> {
        let reply = self.ctrl().fail_command("STATUS")?;
        Status::parse(&reply)
    }
}
