use std::fmt;

use serde::Serialize;

use crate::reason::DisconnectReason;

/// Which kind of unsolicited message an event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Connected,
    Disconnected,
    NetworkNotFound,
    ScanFailed,
    ScanStarted,
    ScanResults,
    BssAdded,
    Generic,
}

// No prefix is a prefix of another, so order only matters for speed.
const PREFIXES: [(&str, EventKind); 7] = [
    ("CTRL-EVENT-CONNECTED", EventKind::Connected),
    ("CTRL-EVENT-DISCONNECTED", EventKind::Disconnected),
    ("CTRL-EVENT-NETWORK-NOT-FOUND", EventKind::NetworkNotFound),
    ("CTRL-EVENT-SCAN-FAILED", EventKind::ScanFailed),
    ("CTRL-EVENT-SCAN-STARTED", EventKind::ScanStarted),
    ("CTRL-EVENT-SCAN-RESULTS", EventKind::ScanResults),
    ("CTRL-EVENT-BSS-ADDED", EventKind::BssAdded),
];

impl EventKind {
    /// Classify a message by its leading event name.
    pub fn from_message(msg: &str) -> Self {
        PREFIXES
            .iter()
            .find(|(prefix, _)| msg.starts_with(prefix))
            .map_or(Self::Generic, |(_, kind)| *kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::NetworkNotFound => "network-not-found",
            Self::ScanFailed => "scan-failed",
            Self::ScanStarted => "scan-started",
            Self::ScanResults => "scan-results",
            Self::BssAdded => "bss-added",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unsolicited supplicant message, classified.
///
/// Every variant keeps the message text (priority marker stripped) in
/// `raw`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SupplicantEvent {
    /// Association and authentication completed.
    Connected { raw: String },
    /// The link went down; `reason` is decoded from `reason=<code>`.
    Disconnected {
        raw: String,
        reason: DisconnectReason,
    },
    /// No configured network was found by the last scan.
    NetworkNotFound { raw: String },
    ScanFailed { raw: String },
    ScanStarted { raw: String },
    ScanResults { raw: String },
    BssAdded { raw: String },
    /// Anything not covered above.
    Generic { raw: String },
}

impl SupplicantEvent {
    pub fn classify(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match EventKind::from_message(&raw) {
            EventKind::Connected => Self::Connected { raw },
            EventKind::Disconnected => {
                let reason = DisconnectReason::parse(&raw);
                Self::Disconnected { raw, reason }
            }
            EventKind::NetworkNotFound => Self::NetworkNotFound { raw },
            EventKind::ScanFailed => Self::ScanFailed { raw },
            EventKind::ScanStarted => Self::ScanStarted { raw },
            EventKind::ScanResults => Self::ScanResults { raw },
            EventKind::BssAdded => Self::BssAdded { raw },
            EventKind::Generic => Self::Generic { raw },
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connected { .. } => EventKind::Connected,
            Self::Disconnected { .. } => EventKind::Disconnected,
            Self::NetworkNotFound { .. } => EventKind::NetworkNotFound,
            Self::ScanFailed { .. } => EventKind::ScanFailed,
            Self::ScanStarted { .. } => EventKind::ScanStarted,
            Self::ScanResults { .. } => EventKind::ScanResults,
            Self::BssAdded { .. } => EventKind::BssAdded,
            Self::Generic { .. } => EventKind::Generic,
        }
    }

    /// The message text this event was classified from.
    pub fn raw(&self) -> &str {
        match self {
            Self::Connected { raw }
            | Self::Disconnected { raw, .. }
            | Self::NetworkNotFound { raw }
            | Self::ScanFailed { raw }
            | Self::ScanStarted { raw }
            | Self::ScanResults { raw }
            | Self::BssAdded { raw }
            | Self::Generic { raw } => raw,
        }
    }

    /// Decoded reason for a disconnect event.
    pub fn reason(&self) -> Option<&DisconnectReason> {
        match self {
            Self::Disconnected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for SupplicantEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_each_prefix() {
        let cases = [
            (
                "CTRL-EVENT-CONNECTED - Connection to 00:1a:dd:18:a4:25 completed [id=0 id_str=]",
                EventKind::Connected,
            ),
            (
                "CTRL-EVENT-DISCONNECTED bssid=00:1a:dd:18:a4:25 reason=3",
                EventKind::Disconnected,
            ),
            ("CTRL-EVENT-NETWORK-NOT-FOUND", EventKind::NetworkNotFound),
            ("CTRL-EVENT-SCAN-FAILED ret=-16", EventKind::ScanFailed),
            ("CTRL-EVENT-SCAN-STARTED", EventKind::ScanStarted),
            ("CTRL-EVENT-SCAN-RESULTS", EventKind::ScanResults),
            ("CTRL-EVENT-BSS-ADDED 0 00:1a:dd:18:a4:25", EventKind::BssAdded),
        ];
        for (msg, kind) in cases {
            let event = SupplicantEvent::classify(msg);
            assert_eq!(event.kind(), kind, "{msg}");
            assert_eq!(event.raw(), msg);
        }
    }

    #[test]
    fn unknown_messages_are_generic() {
        for msg in [
            "Trying to associate with 00:1a:dd:18:a4:25",
            "CTRL-EVENT-BSS-REMOVED 0 00:1a:dd:18:a4:25",
            "",
            " CTRL-EVENT-CONNECTED",
        ] {
            let event = SupplicantEvent::classify(msg);
            assert_eq!(event, SupplicantEvent::Generic { raw: msg.to_string() });
        }
    }

    #[test]
    fn disconnect_carries_reason() {
        let event = SupplicantEvent::classify(
            "CTRL-EVENT-DISCONNECTED bssid=00:1a:dd:18:f2:45 reason=2",
        );
        let reason = event.reason().expect("disconnect reason");
        assert_eq!(reason.to_string(), "2:invalid-auth");
        assert!(SupplicantEvent::classify("CTRL-EVENT-SCAN-STARTED")
            .reason()
            .is_none());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let event = SupplicantEvent::classify("CTRL-EVENT-DISCONNECTED reason=3");
        let json = serde_json::to_value(&event).expect("serialize event");
        assert_eq!(json["kind"], "disconnected");
        assert_eq!(json["raw"], "CTRL-EVENT-DISCONNECTED reason=3");
        assert_eq!(json["reason"]["code"], "3");
        assert_eq!(json["reason"]["label"], "sta-left-ess");

        let json = serde_json::to_value(SupplicantEvent::classify("hello")).expect("serialize");
        assert_eq!(json["kind"], "generic");
    }

    #[test]
    fn kind_names_match_serde() {
        for (_, kind) in PREFIXES {
            let json = serde_json::to_value(kind).expect("serialize kind");
            assert_eq!(json, kind.name());
        }
    }
}
