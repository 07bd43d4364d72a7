use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Result, SupplicantError};

/// Parsed `STATUS` reply: `key=value` pairs in the order received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    fields: Vec<(String, String)>,
}

impl Status {
    /// Parse a `STATUS` reply. Blank lines are skipped; any other line
    /// without `=` is an error.
    pub fn parse(reply: &str) -> Result<Self> {
        let mut fields = Vec::new();
        for (idx, line) in reply.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| SupplicantError::MalformedStatus {
                    line: idx + 1,
                    content: line.to_string(),
                })?;
            fields.push((key.to_string(), value.to_string()));
        }
        Ok(Self { fields })
    }

    /// Value for `key`, first occurrence.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Connection state, e.g. `COMPLETED` or `DISCONNECTED`.
    pub fn wpa_state(&self) -> Option<&str> {
        self.get("wpa_state")
    }

    pub fn ssid(&self) -> Option<&str> {
        self.get("ssid")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
