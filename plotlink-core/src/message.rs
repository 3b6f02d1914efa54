//! Classification of framed device → host lines.

use std::fmt;

/// The sole acknowledgment token.
pub const ACK_TOKEN: &str = "OK";

/// Lines starting with this character are firmware diagnostics.
pub const DIAGNOSTIC_PREFIX: char = '#';

/// A framed line from the device, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceMessage {
    /// `#...`: firmware log output, kept verbatim (prefix included).
    Diagnostic(String),
    /// `OK`: the previous command completed.
    Ack,
    /// A blank line.
    Empty,
    /// Anything else.
    Unrecognized(String),
}

impl DeviceMessage {
    /// Classify a line. Checked in order: diagnostic, ack, empty, other.
    pub fn classify(line: &str) -> Self {
        if line.starts_with(DIAGNOSTIC_PREFIX) {
            DeviceMessage::Diagnostic(line.to_owned())
        } else if line == ACK_TOKEN {
            DeviceMessage::Ack
        } else if line.is_empty() {
            DeviceMessage::Empty
        } else {
            DeviceMessage::Unrecognized(line.to_owned())
        }
    }

    pub fn is_ack(&self) -> bool {
        matches!(self, DeviceMessage::Ack)
    }
}

impl From<String> for DeviceMessage {
    fn from(line: String) -> Self {
        match DeviceMessage::classify(&line) {
            DeviceMessage::Diagnostic(_) => DeviceMessage::Diagnostic(line),
            DeviceMessage::Unrecognized(_) => DeviceMessage::Unrecognized(line),
            other => other,
        }
    }
}

impl fmt::Display for DeviceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceMessage::Diagnostic(text) | DeviceMessage::Unrecognized(text) => {
                write!(f, "{text}")
            }
            DeviceMessage::Ack => write!(f, "{ACK_TOKEN}"),
            DeviceMessage::Empty => Ok(()),
        }
    }
}
