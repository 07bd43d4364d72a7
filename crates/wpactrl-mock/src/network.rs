use std::collections::BTreeMap;

/// Header line the daemon puts above the `LIST_NETWORKS` rows.
pub const LIST_NETWORKS_HEADER: &str = "network id / ssid / bssid / flags";

/// A network configured on the simulated daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockNetwork {
    pub id: u32,
    pub ssid: String,
    pub psk: String,
    pub flags: String,
}

/// Networks kept in id order. New ids follow the highest live id.
#[derive(Debug, Default)]
pub(crate) struct NetworkTable {
    networks: BTreeMap<u32, MockNetwork>,
}

impl NetworkTable {
    pub(crate) fn add(&mut self) -> u32 {
        let id = self
            .networks
            .keys()
            .next_back()
            .map_or(0, |last| last + 1);
        self.networks.insert(
            id,
            MockNetwork {
                id,
                ..MockNetwork::default()
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: u32) -> bool {
        self.networks.remove(&id).is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.networks.clear();
    }

    pub(crate) fn get(&self, id: u32) -> Option<&MockNetwork> {
        self.networks.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: u32) -> Option<&mut MockNetwork> {
        self.networks.get_mut(&id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut MockNetwork> {
        self.networks.values_mut()
    }

    pub(crate) fn current(&self) -> Option<&MockNetwork> {
        self.networks.values().find(|net| net.flags == "CURRENT")
    }

    pub(crate) fn snapshot(&self) -> Vec<MockNetwork> {
        self.networks.values().cloned().collect()
    }

    /// Reply to `LIST_NETWORKS`: header, then `id\tssid\tbssid\tflags` rows.
    pub(crate) fn render_list(&self) -> String {
        let mut lines = vec![LIST_NETWORKS_HEADER.to_string()];
        for net in self.networks.values() {
            let flags = if net.flags.is_empty() {
                String::new()
            } else {
                format!("[{}]", net.flags)
            };
            lines.push(format!("{}\t{}\tany\t{}", net.id, net.ssid, flags));
        }
        lines.join("\n")
    }
}
