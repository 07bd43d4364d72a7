//! Disconnect reason codes (IEEE Std 802.11-2016, 9.4.1.7, Table 9-45).

use std::fmt;

use serde::Serialize;

const REASON_CODES: &[(&str, &str)] = &[
    ("2", "invalid-auth"),
    ("3", "sta-left-ess"),
    ("4", "inactivity"),
    ("5", "ap-overloaded"),
    ("6", "class-2-nonauth"),
    ("7", "class-3-nonassoc"),
    ("8", "sta-left-bss"),
    ("9", "not-authenticated-responder"),
    ("10", "bad-power-cap"),
    ("11", "bad-channels"),
    ("14", "mic-failure"),
    ("15", "four-way-handshake-timeout"),
    ("16", "group-key-handshake-timeout"),
    ("17", "four-way-handshake-mismatch"),
    ("18", "invalid-group-cipher"),
    ("19", "invalid-pairwise-cipher"),
    ("20", "invalid-akmp"),
    ("21", "unsupported-rsn"),
    ("22", "invalid-rsn"),
    ("23", "8021x-auth-failed"),
    ("24", "cipher-rejected-due-to-policy"),
    ("32", "qos"),
    ("33", "qos-bandwidth"),
    ("34", "noisy-channel-cant-ack"),
    ("35", "outside-txop-limits"),
    ("36", "peer-leaving-bss"),
    ("37", "peer-rejects-mechanism"),
    ("38", "peer-mechanism-needs-setup"),
    ("39", "peer-timeout"),
    ("45", "peer-cipher-suite-not-supported"),
];

const REASON_TOKEN: &str = "reason=";

/// Short label for a reason code, if it is one of the common ones.
pub fn reason_label(code: &str) -> Option<&'static str> {
    REASON_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
}

/// Why the station was disconnected. Displays as `<code>:<label>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisconnectReason {
    code: String,
    label: &'static str,
}

impl DisconnectReason {
    /// Extract the reason from a `CTRL-EVENT-DISCONNECTED` message.
    ///
    /// Uses the first `reason=` followed by at least one digit. A missing or
    /// non-numeric reason is code `0`.
    pub fn parse(msg: &str) -> Self {
        Self::from_code(reason_code(msg).unwrap_or("0"))
    }

    /// Build a reason from a bare code. Unknown codes get an empty label.
    pub fn from_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            label: reason_label(code).unwrap_or(""),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Label from the reason table, empty when the code is not listed.
    pub fn label(&self) -> &str {
        self.label
    }

    pub fn is_known(&self) -> bool {
        !self.label.is_empty()
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code, self.label)
    }
}

fn reason_code(msg: &str) -> Option<&str> {
    msg.match_indices(REASON_TOKEN).find_map(|(idx, token)| {
        let rest = &msg[idx + token.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_reason() {
        let reason = DisconnectReason::parse(
            "CTRL-EVENT-DISCONNECTED bssid=00:1a:dd:18:f2:45 reason=2",
        );
        assert_eq!(reason.to_string(), "2:invalid-auth");
        assert!(reason.is_known());
    }

    #[test]
    fn missing_reason() {
        let reason = DisconnectReason::parse("CTRL-EVENT-DISCONNECTED bssid=00:1a:dd:18:f2:45");
        assert_eq!(reason.to_string(), "0:");
        assert_eq!(reason.code(), "0");
    }

    #[test]
    fn unknown_reason_code() {
        let reason = DisconnectReason::parse(
            "CTRL-EVENT-DISCONNECTED bssid=00:1a:dd:18:f2:45 reason=1235",
        );
        assert_eq!(reason.to_string(), "1235:");
        assert!(!reason.is_known());
    }

    #[test]
    fn non_numeric_reason() {
        let reason = DisconnectReason::parse(
            "CTRL-EVENT-DISCONNECTED bssid=00:1a:dd:18:f2:45 reason=asdf4",
        );
        assert_eq!(reason.to_string(), "0:");
    }

    #[test]
    fn reason_followed_by_other_fields() {
        let reason = DisconnectReason::parse(
            "CTRL-EVENT-DISCONNECTED bssid=00:1a:dd:18:a4:25 reason=3 locally_generated=1",
        );
        assert_eq!(reason.to_string(), "3:sta-left-ess");
        assert_eq!(reason.label(), "sta-left-ess");
    }

    #[test]
    fn first_numeric_reason_wins() {
        let reason = DisconnectReason::parse("CTRL-EVENT-DISCONNECTED reason=x reason=15");
        assert_eq!(reason.to_string(), "15:four-way-handshake-timeout");
    }

    #[test]
    fn table_lookup() {
        assert_eq!(reason_label("45"), Some("peer-cipher-suite-not-supported"));
        assert_eq!(reason_label("1"), None);
        assert_eq!(reason_label(""), None);
    }
}
